//! Metadata server credentials for Cloud Run and Compute Engine

use async_trait::async_trait;
use tokio::sync::OnceCell;

use super::{CredentialsProvider, TokenCache, TokenResponse};
use crate::{Error, Result};

const METADATA_BASE: &str = "http://metadata.google.internal/computeMetadata/v1";

/// Credentials served by the hosting environment's metadata server
pub struct MetadataCredentials {
    base_url: String,
    project_override: Option<String>,
    client: reqwest::Client,
    project: OnceCell<String>,
    cache: TokenCache,
}

impl MetadataCredentials {
    /// Create credentials using the metadata server
    ///
    /// Honors `GCE_METADATA_HOST` the way Google client libraries do.
    #[must_use]
    pub fn new(project_override: Option<String>) -> Self {
        let base_url = std::env::var("GCE_METADATA_HOST").map_or_else(
            |_| METADATA_BASE.to_string(),
            |host| format!("http://{host}/computeMetadata/v1"),
        );
        Self::with_base_url(base_url, project_override)
    }

    /// Create credentials against an explicit metadata endpoint
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>, project_override: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project_override,
            client: reqwest::Client::new(),
            project: OnceCell::new(),
            cache: TokenCache::default(),
        }
    }

    /// GET a metadata path
    async fn get(&self, path: &str) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(format!("{}/{path}", self.base_url))
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| Error::Credentials(format!("metadata request {path} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Credentials(format!(
                "metadata request {path} failed: {status} - {body}"
            )));
        }

        Ok(response)
    }

    async fn fetch_project_id(&self) -> Result<String> {
        let project = self
            .get("project/project-id")
            .await?
            .text()
            .await
            .map_err(|e| Error::Credentials(format!("metadata project read error: {e}")))?;

        let project = project.trim();
        if project.is_empty() {
            return Err(Error::Credentials(
                "metadata server returned empty project id".to_string(),
            ));
        }
        Ok(project.to_string())
    }
}

#[async_trait]
impl CredentialsProvider for MetadataCredentials {
    async fn project_id(&self) -> Result<String> {
        if let Some(project) = &self.project_override {
            return Ok(project.clone());
        }

        self.project
            .get_or_try_init(|| self.fetch_project_id())
            .await
            .cloned()
    }

    async fn access_token(&self) -> Result<String> {
        if let Some(token) = self.cache.get().await {
            return Ok(token);
        }

        let token: TokenResponse = self
            .get("instance/service-accounts/default/token")
            .await?
            .json()
            .await
            .map_err(|e| Error::Credentials(format!("metadata token parse error: {e}")))?;

        self.cache.store(&token).await;
        tracing::debug!(expires_in = token.expires_in, "metadata token refreshed");

        Ok(token.access_token)
    }

    async fn invalidate(&self) {
        self.cache.clear().await;
    }
}
