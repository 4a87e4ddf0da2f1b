//! Telegram Bot API request/response types

use serde::{Deserialize, Serialize};

/// Telegram Bot API host
pub(crate) const API_BASE: &str = "https://api.telegram.org";

/// Telegram sendMessage request
#[derive(Serialize)]
pub(crate) struct SendMessageRequest<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i64>,
}

/// Telegram setWebhook request
#[derive(Serialize)]
pub(crate) struct SetWebhookRequest<'a> {
    pub url: &'a str,
    pub allowed_updates: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_token: Option<&'a str>,
}

/// Telegram getFile request
#[derive(Serialize)]
pub(crate) struct GetFileRequest<'a> {
    pub file_id: &'a str,
}

/// File metadata from Telegram getFile response
#[derive(Debug, Deserialize)]
pub(crate) struct TelegramFile {
    pub file_path: Option<String>,
}

/// Telegram API response wrapper
#[derive(Debug, Deserialize)]
pub(crate) struct TelegramResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

impl<T> TelegramResponse<T> {
    /// The provider's description, or a placeholder when absent
    pub fn description_or_default(&self) -> &str {
        self.description.as_deref().unwrap_or("no description")
    }
}
