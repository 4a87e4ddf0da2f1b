//! Service account key file credentials
//!
//! Signs an RS256 JWT with the key from a `GOOGLE_APPLICATION_CREDENTIALS`
//! style JSON file and exchanges it for an access token.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CLOUD_PLATFORM_SCOPE, CredentialsProvider, TokenCache, TokenResponse};
use crate::{Error, Result};

const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Lifetime requested for the signed assertion
const JWT_LIFETIME_SECS: i64 = 3600;

/// Service account JSON structure
#[derive(Debug, Deserialize)]
struct ServiceAccount {
    client_email: String,
    private_key: String,
    project_id: Option<String>,
    token_uri: Option<String>,
}

/// JWT claims for Google OAuth
#[derive(Debug, Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    exp: i64,
    iat: i64,
}

/// Credentials backed by a service account key file
pub struct ServiceAccountCredentials {
    key_path: PathBuf,
    project_override: Option<String>,
    client: reqwest::Client,
    cache: TokenCache,
}

impl ServiceAccountCredentials {
    /// Create credentials reading the key at `key_path`
    ///
    /// The key file is read lazily, so a missing file fails the request
    /// that needs it rather than startup.
    #[must_use]
    pub fn new(key_path: PathBuf, project_override: Option<String>) -> Self {
        Self {
            key_path,
            project_override,
            client: reqwest::Client::new(),
            cache: TokenCache::default(),
        }
    }

    /// Load service account from file
    fn load_service_account(&self) -> Result<ServiceAccount> {
        let content = std::fs::read_to_string(&self.key_path).map_err(|e| {
            Error::Credentials(format!(
                "failed to read service account {}: {e}",
                self.key_path.display()
            ))
        })?;

        serde_json::from_str(&content)
            .map_err(|e| Error::Credentials(format!("failed to parse service account: {e}")))
    }

    /// Create JWT for token request
    fn create_jwt(service_account: &ServiceAccount, token_url: &str) -> Result<String> {
        use jsonwebtoken::{Algorithm, EncodingKey, Header};

        let now = chrono::Utc::now().timestamp();
        let claims = JwtClaims {
            iss: &service_account.client_email,
            scope: CLOUD_PLATFORM_SCOPE,
            aud: token_url,
            exp: now + JWT_LIFETIME_SECS,
            iat: now,
        };

        let key = EncodingKey::from_rsa_pem(service_account.private_key.as_bytes())
            .map_err(|e| Error::Credentials(format!("invalid private key: {e}")))?;

        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| Error::Credentials(format!("JWT encoding failed: {e}")))
    }

    /// Exchange a signed assertion for an access token
    async fn fetch_token(&self) -> Result<TokenResponse> {
        let service_account = self.load_service_account()?;
        let token_url = service_account
            .token_uri
            .clone()
            .unwrap_or_else(|| GOOGLE_TOKEN_URL.to_string());
        let jwt = Self::create_jwt(&service_account, &token_url)?;

        let response = self
            .client
            .post(&token_url)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", &jwt),
            ])
            .send()
            .await
            .map_err(|e| Error::Credentials(format!("token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Credentials(format!(
                "token request failed: {status} - {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Credentials(format!("token parse error: {e}")))
    }
}

#[async_trait]
impl CredentialsProvider for ServiceAccountCredentials {
    async fn project_id(&self) -> Result<String> {
        if let Some(project) = &self.project_override {
            return Ok(project.clone());
        }

        self.load_service_account()?
            .project_id
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                Error::Credentials("service account key has no project_id".to_string())
            })
    }

    async fn access_token(&self) -> Result<String> {
        if let Some(token) = self.cache.get().await {
            return Ok(token);
        }

        let token = self.fetch_token().await?;
        self.cache.store(&token).await;
        tracing::debug!(expires_in = token.expires_in, "service account token refreshed");

        Ok(token.access_token)
    }

    async fn invalidate(&self) {
        self.cache.clear().await;
    }
}
