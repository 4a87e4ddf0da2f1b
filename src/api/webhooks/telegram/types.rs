//! Telegram webhook types

use serde::{Deserialize, Serialize};

/// Telegram Update object (simplified)
///
/// Only the fields the bot reads are modeled; everything else in the
/// payload is ignored, and missing fields decode to their zero values.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelegramUpdate {
    #[serde(default)]
    pub update_id: i64,
    pub message: Option<TelegramMessage>,
}

/// Telegram Message object (simplified)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelegramMessage {
    #[serde(default)]
    pub message_id: i64,
    #[serde(default)]
    pub chat: TelegramChat,
    pub text: Option<String>,
    /// Photo (array of sizes, use largest)
    pub photo: Option<Vec<TelegramPhotoSize>>,
}

/// Telegram Chat object
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TelegramChat {
    #[serde(default)]
    pub id: i64,
}

/// Telegram photo size
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TelegramPhotoSize {
    pub file_id: String,
    #[serde(default)]
    pub file_unique_id: String,
    #[serde(default)]
    pub width: i32,
    #[serde(default)]
    pub height: i32,
    pub file_size: Option<i64>,
}

impl TelegramMessage {
    /// Non-empty text, if any
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }

    /// Largest photo variant by resolution
    ///
    /// Telegram lists sizes smallest first, so ties go to the later entry.
    #[must_use]
    pub fn largest_photo(&self) -> Option<&TelegramPhotoSize> {
        self.photo
            .as_deref()?
            .iter()
            .max_by_key(|p| i64::from(p.width) * i64::from(p.height))
    }
}

/// What a validated message asks the bot to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Text to run through intent detection
    Text(String),
    /// Largest photo variant to run through label detection
    Photo(TelegramPhotoSize),
}
