//! Shared test utilities

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use mushroom_bot::channels::{FileResolver, MessageSender, OutgoingMessage};
use mushroom_bot::google::{CredentialsProvider, IntentDetector, LabelDetector, Translator};
use mushroom_bot::{ApiServerBuilder, Error, Result, UpdateProcessor};
use secrecy::SecretString;

/// Records every message sent, optionally failing after `fail_after` sends
#[derive(Default)]
pub struct RecordingSender {
    pub sent: Mutex<Vec<OutgoingMessage>>,
    pub fail_after: Option<usize>,
}

impl RecordingSender {
    pub fn failing_after(count: usize) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_after: Some(count),
        }
    }

    pub fn sent(&self) -> Vec<OutgoingMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send(&self, message: OutgoingMessage) -> Result<()> {
        let mut sent = self.sent.lock().unwrap();
        if self.fail_after.is_some_and(|limit| sent.len() >= limit) {
            return Err(Error::Telegram("Bad Request: chat not found".to_string()));
        }
        sent.push(message);
        Ok(())
    }
}

/// Resolves file IDs to a fixed host and records the lookups
#[derive(Default)]
pub struct StaticFiles {
    pub requested: Mutex<Vec<String>>,
}

#[async_trait]
impl FileResolver for StaticFiles {
    async fn file_url(&self, file_id: &str) -> Result<String> {
        self.requested.lock().unwrap().push(file_id.to_string());
        Ok(format!("https://files.test/{file_id}.jpg"))
    }
}

/// Fixed project and token; `None` project simulates missing credentials
pub struct StaticCredentials {
    pub project: Option<String>,
}

impl StaticCredentials {
    pub fn demo() -> Self {
        Self {
            project: Some("demo".to_string()),
        }
    }

    pub fn missing() -> Self {
        Self { project: None }
    }
}

#[async_trait]
impl CredentialsProvider for StaticCredentials {
    async fn project_id(&self) -> Result<String> {
        self.project
            .clone()
            .ok_or_else(|| Error::Credentials("no project configured".to_string()))
    }

    async fn access_token(&self) -> Result<String> {
        Ok("ya29.test".to_string())
    }

    async fn invalidate(&self) {}
}

/// A recorded `detect_intent` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentCall {
    pub project_id: String,
    pub session_id: String,
    pub text: String,
    pub language_code: String,
}

/// Answers every query with the same replies
#[derive(Default)]
pub struct ScriptedIntents {
    pub replies: Vec<String>,
    pub calls: Mutex<Vec<IntentCall>>,
}

impl ScriptedIntents {
    pub fn replying(replies: &[&str]) -> Self {
        Self {
            replies: replies.iter().map(ToString::to_string).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<IntentCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl IntentDetector for ScriptedIntents {
    async fn detect_intent(
        &self,
        project_id: &str,
        session_id: &str,
        text: &str,
        language_code: &str,
    ) -> Result<Vec<String>> {
        self.calls.lock().unwrap().push(IntentCall {
            project_id: project_id.to_string(),
            session_id: session_id.to_string(),
            text: text.to_string(),
            language_code: language_code.to_string(),
        });
        Ok(self.replies.clone())
    }
}

/// Returns the same labels for every image and records the URLs
#[derive(Default)]
pub struct ScriptedLabels {
    pub labels: Vec<String>,
    pub urls: Mutex<Vec<(String, u32)>>,
}

impl ScriptedLabels {
    pub fn detecting(labels: &[&str]) -> Self {
        Self {
            labels: labels.iter().map(ToString::to_string).collect(),
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn urls(&self) -> Vec<(String, u32)> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LabelDetector for ScriptedLabels {
    async fn detect_labels(&self, image_url: &str, max_results: u32) -> Result<Vec<String>> {
        self.urls
            .lock()
            .unwrap()
            .push((image_url.to_string(), max_results));
        Ok(self.labels.clone())
    }
}

/// Uppercases text, or fails when `fail` is set
#[derive(Default)]
pub struct UppercaseTranslator {
    pub fail: bool,
}

#[async_trait]
impl Translator for UppercaseTranslator {
    async fn translate(&self, text: &str, _source: &str, _target: &str) -> Result<String> {
        if self.fail {
            return Err(Error::Translation("quota exceeded".to_string()));
        }
        Ok(text.to_uppercase())
    }
}

/// Collaborators wired into a test router
pub struct TestBot {
    pub sender: Arc<RecordingSender>,
    pub files: Arc<StaticFiles>,
    pub credentials: Arc<StaticCredentials>,
    pub intents: Arc<ScriptedIntents>,
    pub labels: Arc<ScriptedLabels>,
    pub translator: Option<Arc<UppercaseTranslator>>,
    pub webhook_secret: Option<String>,
}

impl Default for TestBot {
    fn default() -> Self {
        Self {
            sender: Arc::new(RecordingSender::default()),
            files: Arc::new(StaticFiles::default()),
            credentials: Arc::new(StaticCredentials::demo()),
            intents: Arc::new(ScriptedIntents::default()),
            labels: Arc::new(ScriptedLabels::default()),
            translator: None,
            webhook_secret: None,
        }
    }
}

impl TestBot {
    /// Build the full API router around the collaborators
    pub fn router(&self) -> axum::Router {
        let mut processor = UpdateProcessor::new(
            self.sender.clone(),
            self.files.clone(),
            self.credentials.clone(),
            self.intents.clone(),
            self.labels.clone(),
        );
        if let Some(translator) = &self.translator {
            processor = processor.translator(translator.clone());
        }

        ApiServerBuilder::new(Arc::new(processor), 0)
            .webhook_secret(self.webhook_secret.clone().map(SecretString::from))
            .build()
            .router()
    }
}

/// Build a webhook POST request
pub fn webhook_request(uri: &str, body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.into()))
        .unwrap()
}

/// A text message update
pub fn text_update(chat_id: i64, message_id: i64, text: &str) -> String {
    serde_json::json!({
        "update_id": 1,
        "message": {
            "message_id": message_id,
            "chat": { "id": chat_id, "type": "private" },
            "date": 1_700_000_000,
            "text": text,
        }
    })
    .to_string()
}

/// A photo message update with three sizes, the largest being `big`
pub fn photo_update(chat_id: i64, message_id: i64) -> String {
    serde_json::json!({
        "update_id": 2,
        "message": {
            "message_id": message_id,
            "chat": { "id": chat_id, "type": "private" },
            "date": 1_700_000_000,
            "photo": [
                { "file_id": "small", "file_unique_id": "s", "width": 90, "height": 67 },
                { "file_id": "big", "file_unique_id": "b", "width": 1280, "height": 960 },
                { "file_id": "medium", "file_unique_id": "m", "width": 320, "height": 240 },
            ]
        }
    })
    .to_string()
}
