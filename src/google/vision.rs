//! Cloud Vision label detection

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::CredentialsProvider;
use crate::{Error, Result};

const VISION_API_URL: &str = "https://vision.googleapis.com/v1";

/// Largest file the Bot API lets bots download
pub const MAX_IMAGE_BYTES: u64 = 20 * 1024 * 1024;

/// Image label detection
#[async_trait]
pub trait LabelDetector: Send + Sync {
    /// Detect up to `max_results` labels for the image at `image_url`,
    /// most confident first
    ///
    /// # Errors
    ///
    /// Returns error if the image cannot be fetched or annotated
    async fn detect_labels(&self, image_url: &str, max_results: u32) -> Result<Vec<String>>;
}

/// `images:annotate` request
#[derive(Debug, Serialize)]
struct AnnotateRequest {
    requests: Vec<AnnotateImageRequest>,
}

#[derive(Debug, Serialize)]
struct AnnotateImageRequest {
    image: Image,
    features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
struct Image {
    content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Feature {
    #[serde(rename = "type")]
    feature_type: &'static str,
    max_results: u32,
}

/// `images:annotate` response
#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    #[serde(default)]
    label_annotations: Vec<EntityAnnotation>,
    error: Option<Status>,
}

#[derive(Debug, Deserialize)]
struct EntityAnnotation {
    description: String,
}

/// Per-image error status
#[derive(Debug, Deserialize)]
struct Status {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

/// Cloud Vision REST client
pub struct VisionClient {
    client: reqwest::Client,
    credentials: Arc<dyn CredentialsProvider>,
    base_url: String,
    max_image_bytes: u64,
}

impl VisionClient {
    /// Create a new vision client
    #[must_use]
    pub fn new(credentials: Arc<dyn CredentialsProvider>) -> Self {
        Self::with_base_url(credentials, VISION_API_URL)
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
            max_image_bytes: MAX_IMAGE_BYTES,
        }
    }

    /// Reject images larger than `bytes`
    #[must_use]
    pub fn max_image_bytes(mut self, bytes: u64) -> Self {
        self.max_image_bytes = bytes;
        self
    }

    /// Download the image bytes
    ///
    /// The URL embeds the bot token, so it is stripped from errors.
    async fn fetch_image(&self, image_url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(image_url)
            .send()
            .await
            .map_err(|e| Error::Vision(format!("image download failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Vision(format!("image download failed: {status}")));
        }

        if let Some(length) = response
            .content_length()
            .filter(|&length| length > self.max_image_bytes)
        {
            return Err(Error::Vision(format!(
                "image too large: {length} bytes (limit {})",
                self.max_image_bytes
            )));
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| Error::Vision(format!("image read error: {}", e.without_url())))?;

        if u64::try_from(data.len()).unwrap_or(u64::MAX) > self.max_image_bytes {
            return Err(Error::Vision(format!(
                "image too large: {} bytes (limit {})",
                data.len(),
                self.max_image_bytes
            )));
        }

        Ok(data.to_vec())
    }
}

#[async_trait]
impl LabelDetector for VisionClient {
    async fn detect_labels(&self, image_url: &str, max_results: u32) -> Result<Vec<String>> {
        let data = self.fetch_image(image_url).await?;
        let token = self.credentials.access_token().await?;

        let request = AnnotateRequest {
            requests: vec![AnnotateImageRequest {
                image: Image {
                    content: base64::engine::general_purpose::STANDARD.encode(&data),
                },
                features: vec![Feature {
                    feature_type: "LABEL_DETECTION",
                    max_results,
                }],
            }],
        };

        let response = self
            .client
            .post(format!("{}/images:annotate", self.base_url))
            .bearer_auth(&token)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Vision(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            if status == reqwest::StatusCode::UNAUTHORIZED {
                self.credentials.invalidate().await;
            }
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Vision(format!("API error {status}: {body}")));
        }

        let result: AnnotateResponse = response
            .json()
            .await
            .map_err(|e| Error::Vision(format!("failed to parse response: {e}")))?;

        let image = result
            .responses
            .into_iter()
            .next()
            .ok_or_else(|| Error::Vision("empty annotate response".to_string()))?;

        if let Some(err) = image.error {
            return Err(Error::Vision(format!(
                "annotate error {}: {}",
                err.code, err.message
            )));
        }

        let labels: Vec<String> = image
            .label_annotations
            .into_iter()
            .take(usize::try_from(max_results).unwrap_or(usize::MAX))
            .map(|a| a.description)
            .collect();

        tracing::debug!(labels = ?labels, "labels detected");
        Ok(labels)
    }
}
