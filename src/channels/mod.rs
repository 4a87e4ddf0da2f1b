//! Messaging channel adapters
//!
//! The bot talks to a single platform, Telegram, through two narrow traits:
//! `MessageSender` for replies and `FileResolver` for turning photo file IDs
//! into fetchable URLs.

mod telegram;

use async_trait::async_trait;

pub use telegram::TelegramChannel;

use crate::Result;

/// A message to send to a chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// Target chat identifier
    pub chat_id: i64,

    /// Message content (plain text)
    pub text: String,

    /// Message to thread the reply under
    pub reply_to: Option<i64>,
}

impl OutgoingMessage {
    /// Create a plain `text` message
    #[must_use]
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            reply_to: None,
        }
    }

    /// Create a threaded `reply` to `message_id`
    #[must_use]
    pub fn reply(chat_id: i64, text: impl Into<String>, message_id: i64) -> Self {
        Self {
            chat_id,
            text: text.into(),
            reply_to: Some(message_id),
        }
    }
}

/// Delivers text replies to a chat
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Send a message
    ///
    /// # Errors
    ///
    /// Returns error carrying the platform's description if delivery fails
    async fn send(&self, message: OutgoingMessage) -> Result<()>;
}

/// Resolves platform file identifiers to downloadable URLs
#[async_trait]
pub trait FileResolver: Send + Sync {
    /// Return a URL the file can be fetched from
    ///
    /// # Errors
    ///
    /// Returns error if the platform does not know the file
    async fn file_url(&self, file_id: &str) -> Result<String>;
}
