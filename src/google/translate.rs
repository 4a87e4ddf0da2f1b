//! Cloud Translation v3 client

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::CredentialsProvider;
use crate::{Error, Result};

const TRANSLATE_API_URL: &str = "https://translation.googleapis.com/v3";

/// Text translation
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` between the given BCP-47 languages
    ///
    /// # Errors
    ///
    /// Returns error if the translation call fails
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TranslateTextRequest<'a> {
    source_language_code: &'a str,
    target_language_code: &'a str,
    mime_type: &'static str,
    contents: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
struct TranslateTextResponse {
    #[serde(default)]
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

/// Cloud Translation REST client
pub struct TranslateClient {
    client: reqwest::Client,
    credentials: Arc<dyn CredentialsProvider>,
    base_url: String,
}

impl TranslateClient {
    /// Create a new translation client
    #[must_use]
    pub fn new(credentials: Arc<dyn CredentialsProvider>) -> Self {
        Self::with_base_url(credentials, TRANSLATE_API_URL)
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
impl Translator for TranslateClient {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String> {
        let project = self.credentials.project_id().await?;
        let token = self.credentials.access_token().await?;

        let url = format!(
            "{}/projects/{}/locations/global:translateText",
            self.base_url,
            urlencoding::encode(&project)
        );
        let request = TranslateTextRequest {
            source_language_code: source_language,
            target_language_code: target_language,
            mime_type: "text/plain",
            contents: [text],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Translation(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            if status == reqwest::StatusCode::UNAUTHORIZED {
                self.credentials.invalidate().await;
            }
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Translation(format!("API error {status}: {body}")));
        }

        let result: TranslateTextResponse = response
            .json()
            .await
            .map_err(|e| Error::Translation(format!("failed to parse response: {e}")))?;

        Ok(result
            .translations
            .into_iter()
            .map(|t| t.translated_text)
            .collect::<Vec<_>>()
            .join(", "))
    }
}
