//! Dialogflow ES intent detection

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::CredentialsProvider;
use crate::{Error, Result};

const DIALOGFLOW_API_URL: &str = "https://dialogflow.googleapis.com/v2";

/// Conversational intent detection
#[async_trait]
pub trait IntentDetector: Send + Sync {
    /// Detect the intent of `text` and return the agent's text replies
    ///
    /// # Errors
    ///
    /// Returns error if the project or session is empty, or the call fails
    async fn detect_intent(
        &self,
        project_id: &str,
        session_id: &str,
        text: &str,
        language_code: &str,
    ) -> Result<Vec<String>>;
}

/// `detectIntent` request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DetectIntentRequest<'a> {
    query_input: QueryInput<'a>,
}

#[derive(Debug, Serialize)]
struct QueryInput<'a> {
    text: TextInput<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TextInput<'a> {
    text: &'a str,
    language_code: &'a str,
}

/// `detectIntent` response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectIntentResponse {
    #[serde(default)]
    query_result: Option<QueryResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResult {
    #[serde(default)]
    fulfillment_messages: Vec<FulfillmentMessage>,
}

/// One rich response message; only the text payload is used
#[derive(Debug, Deserialize)]
struct FulfillmentMessage {
    #[serde(default)]
    text: Option<FulfillmentText>,
}

#[derive(Debug, Deserialize)]
struct FulfillmentText {
    #[serde(default)]
    text: Vec<String>,
}

impl DetectIntentResponse {
    /// Text replies in the order the agent returned them
    fn into_replies(self) -> Vec<String> {
        self.query_result
            .unwrap_or_default()
            .fulfillment_messages
            .into_iter()
            .filter_map(|m| m.text)
            .flat_map(|t| t.text)
            .collect()
    }
}

/// Dialogflow REST client
pub struct DialogflowClient {
    client: reqwest::Client,
    credentials: Arc<dyn CredentialsProvider>,
    base_url: String,
}

impl DialogflowClient {
    /// Create a new Dialogflow client
    #[must_use]
    pub fn new(credentials: Arc<dyn CredentialsProvider>) -> Self {
        Self::with_base_url(credentials, DIALOGFLOW_API_URL)
    }

    /// Create a client against a non-default endpoint
    #[must_use]
    pub fn with_base_url(
        credentials: Arc<dyn CredentialsProvider>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            credentials,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl IntentDetector for DialogflowClient {
    async fn detect_intent(
        &self,
        project_id: &str,
        session_id: &str,
        text: &str,
        language_code: &str,
    ) -> Result<Vec<String>> {
        if project_id.is_empty() || session_id.is_empty() {
            return Err(Error::Intent(format!(
                "received empty project ({project_id}) or session ({session_id})"
            )));
        }

        let url = format!(
            "{}/projects/{}/agent/sessions/{}:detectIntent",
            self.base_url,
            urlencoding::encode(project_id),
            urlencoding::encode(session_id),
        );

        let token = self.credentials.access_token().await?;
        let request = DetectIntentRequest {
            query_input: QueryInput {
                text: TextInput {
                    text,
                    language_code,
                },
            },
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Intent(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            if status == reqwest::StatusCode::UNAUTHORIZED {
                self.credentials.invalidate().await;
            }
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Intent(format!("API error {status}: {body}")));
        }

        let result: DetectIntentResponse = response
            .json()
            .await
            .map_err(|e| Error::Intent(format!("failed to parse response: {e}")))?;

        let replies = result.into_replies();
        tracing::debug!(session = session_id, replies = replies.len(), "intent detected");

        Ok(replies)
    }
}
