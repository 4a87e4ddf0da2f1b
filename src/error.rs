//! Error types for the mushroom bot

use thiserror::Error;

/// Result type alias for bot operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while handling a webhook
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Request body is not a well-formed update
    #[error("decode error: {0}")]
    Decode(String),

    /// Update is well-formed but carries nothing to answer
    #[error("validation error: {0}")]
    Validation(String),

    /// Telegram Bot API error
    #[error("telegram error: {0}")]
    Telegram(String),

    /// Google Cloud credential resolution error
    #[error("credentials error: {0}")]
    Credentials(String),

    /// Dialogflow intent detection error
    #[error("intent error: {0}")]
    Intent(String),

    /// Cloud Vision label detection error
    #[error("vision error: {0}")]
    Vision(String),

    /// Cloud Translation error
    #[error("translation error: {0}")]
    Translation(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether the error was caused by the inbound request itself
    ///
    /// Client errors map to `400 Bad Request`; everything else is a
    /// downstream failure and maps to `500 Internal Server Error`.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::Validation(_))
    }
}
