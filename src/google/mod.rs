//! Google Cloud collaborators
//!
//! REST clients for Dialogflow (intent detection), Cloud Vision (label
//! detection) and Cloud Translation, plus the credential providers that
//! supply their project ID and OAuth access tokens.

mod dialogflow;
mod metadata;
mod service_account;
mod translate;
mod vision;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;

pub use dialogflow::{DialogflowClient, IntentDetector};
pub use metadata::MetadataCredentials;
pub use service_account::ServiceAccountCredentials;
pub use translate::{TranslateClient, Translator};
pub use vision::{LabelDetector, VisionClient};

use crate::Result;

/// OAuth scope covering every Cloud API the bot calls
pub(crate) const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Refresh tokens this many seconds before they expire
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 300;

/// Source of the Google Cloud project ID and access tokens
#[async_trait]
pub trait CredentialsProvider: Send + Sync {
    /// The project all API calls are billed to
    ///
    /// # Errors
    ///
    /// Returns error if the project cannot be determined
    async fn project_id(&self) -> Result<String>;

    /// A bearer token valid for at least a few more minutes
    ///
    /// # Errors
    ///
    /// Returns error if a token cannot be obtained
    async fn access_token(&self) -> Result<String>;

    /// Drop any cached token so the next call fetches a fresh one
    async fn invalidate(&self);
}

/// Pick a provider the way Google client libraries do
///
/// A service account key file wins when configured; otherwise the metadata
/// server of the hosting environment (Cloud Run, GCE) is used.
#[must_use]
pub fn default_credentials(
    key_file: Option<PathBuf>,
    project_override: Option<String>,
) -> Arc<dyn CredentialsProvider> {
    match key_file {
        Some(path) => {
            tracing::info!(path = %path.display(), "using service account credentials");
            Arc::new(ServiceAccountCredentials::new(path, project_override))
        }
        None => {
            tracing::info!("using metadata server credentials");
            Arc::new(MetadataCredentials::new(project_override))
        }
    }
}

/// OAuth token endpoint response
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}

/// Cached token info
struct CachedToken {
    access_token: String,
    expires_at: i64,
}

/// Process-wide access token cache with expiry
#[derive(Default)]
pub(crate) struct TokenCache {
    token: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    /// Cached token if it is still valid past the refresh margin
    pub async fn get(&self) -> Option<String> {
        let now = chrono::Utc::now().timestamp();
        let guard = self.token.lock().await;
        guard
            .as_ref()
            .filter(|t| t.expires_at > now + TOKEN_EXPIRY_MARGIN_SECS)
            .map(|t| t.access_token.clone())
    }

    /// Store a freshly issued token
    pub async fn store(&self, response: &TokenResponse) {
        let expires_at = chrono::Utc::now().timestamp() + response.expires_in;
        *self.token.lock().await = Some(CachedToken {
            access_token: response.access_token.clone(),
            expires_at,
        });
    }

    /// Forget the cached token
    pub async fn clear(&self) {
        *self.token.lock().await = None;
    }
}
