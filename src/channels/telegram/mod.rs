//! Telegram channel adapter
//!
//! Receives updates through the webhook endpoint and uses the Bot API for
//! sending replies and resolving photo files.

mod api;
mod types;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::SecretString;

use super::{FileResolver, MessageSender, OutgoingMessage};
use crate::Result;

/// Telegram Bot API client
pub struct TelegramChannel {
    token: SecretString,
    api_base: String,
    client: Client,
}

impl TelegramChannel {
    /// Create a new Telegram channel adapter
    #[must_use]
    pub fn new(token: SecretString) -> Self {
        Self::with_api_base(token, types::API_BASE)
    }

    /// Create an adapter talking to a non-default Bot API host
    ///
    /// Used for self-hosted Bot API servers and tests.
    #[must_use]
    pub fn with_api_base(token: SecretString, api_base: impl Into<String>) -> Self {
        Self {
            token,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl MessageSender for TelegramChannel {
    async fn send(&self, message: OutgoingMessage) -> Result<()> {
        self.send_message(message.chat_id, &message.text, message.reply_to)
            .await
    }
}

#[async_trait]
impl FileResolver for TelegramChannel {
    async fn file_url(&self, file_id: &str) -> Result<String> {
        self.get_file_url(file_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn channel(server: &mockito::ServerGuard) -> TelegramChannel {
        TelegramChannel::with_api_base(SecretString::from("TEST:TOKEN".to_string()), server.url())
    }

    #[tokio::test]
    async fn send_message_posts_reply_to() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/botTEST:TOKEN/sendMessage")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "chat_id": 42,
                "text": "hello",
                "reply_to_message_id": 7
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok":true,"result":{"message_id":8}}"#)
            .create_async()
            .await;

        channel(&server)
            .send(OutgoingMessage::reply(42, "hello", 7))
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn send_message_omits_reply_to_when_unthreaded() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/botTEST:TOKEN/sendMessage")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "chat_id": 42,
                "text": "hello"
            })))
            .with_status(200)
            .with_body(r#"{"ok":true,"result":{"message_id":8}}"#)
            .create_async()
            .await;

        channel(&server)
            .send(OutgoingMessage::text(42, "hello"))
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn send_message_surfaces_description() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/botTEST:TOKEN/sendMessage")
            .with_status(400)
            .with_body(r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#)
            .create_async()
            .await;

        let err = channel(&server)
            .send(OutgoingMessage::text(1, "x"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Telegram(_)));
        assert!(err.to_string().contains("chat not found"));
    }

    #[tokio::test]
    async fn file_url_uses_returned_path() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/botTEST:TOKEN/getFile")
            .match_body(mockito::Matcher::Json(serde_json::json!({"file_id": "abc"})))
            .with_status(200)
            .with_body(r#"{"ok":true,"result":{"file_id":"abc","file_path":"photos/file_1.jpg"}}"#)
            .create_async()
            .await;

        let url = channel(&server).file_url("abc").await.unwrap();

        assert_eq!(url, format!("{}/file/botTEST:TOKEN/photos/file_1.jpg", server.url()));
    }

    #[tokio::test]
    async fn file_url_fails_without_path() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/botTEST:TOKEN/getFile")
            .with_status(200)
            .with_body(r#"{"ok":true,"result":{"file_id":"abc"}}"#)
            .create_async()
            .await;

        let err = channel(&server).file_url("abc").await.unwrap_err();
        assert!(err.to_string().contains("file_path"));
    }

    #[tokio::test]
    async fn set_webhook_sends_secret_and_allowed_updates() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/botTEST:TOKEN/setWebhook")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "url": "https://bot.example.com/",
                "allowed_updates": ["message"],
                "secret_token": "s3cret"
            })))
            .with_status(200)
            .with_body(r#"{"ok":true,"result":true,"description":"Webhook was set"}"#)
            .create_async()
            .await;

        channel(&server)
            .set_webhook("https://bot.example.com/", Some("s3cret"))
            .await
            .unwrap();

        mock.assert_async().await;
    }
}
