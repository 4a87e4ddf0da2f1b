//! Raw Telegram Bot API calls

use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::types::{
    GetFileRequest, SendMessageRequest, SetWebhookRequest, TelegramFile, TelegramResponse,
};
use crate::{Error, Result};

impl super::TelegramChannel {
    /// Bot API method URL
    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base, self.token.expose_secret())
    }

    /// Call a Bot API method and unwrap the `ok`/`description` envelope
    ///
    /// Telegram reports failures both through the HTTP status and the JSON
    /// envelope; the description is preferred when the body parses.
    async fn call<B, T>(&self, method: &str, body: &B) -> Result<Option<T>>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Telegram(format!("{method} request failed: {}", e.without_url())))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Telegram(format!("{method} response read error: {}", e.without_url())))?;

        let parsed: TelegramResponse<T> = match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(e) if status.is_success() => {
                return Err(Error::Telegram(format!("{method} parse error: {e}")));
            }
            Err(_) => {
                return Err(Error::Telegram(format!("{method}: {status} - {text}")));
            }
        };

        if !parsed.ok {
            return Err(Error::Telegram(format!(
                "{method}: {}",
                parsed.description_or_default()
            )));
        }

        Ok(parsed.result)
    }

    /// Send a plain-text message to a chat
    ///
    /// # Errors
    ///
    /// Returns error with Telegram's description if the message was not sent
    pub async fn send_message(&self, chat_id: i64, text: &str, reply_to: Option<i64>) -> Result<()> {
        let request = SendMessageRequest {
            chat_id,
            text,
            reply_to_message_id: reply_to,
        };

        self.call::<_, serde_json::Value>("sendMessage", &request)
            .await?;

        tracing::debug!(chat_id, reply_to, "Telegram message sent");
        Ok(())
    }

    /// Look up a file and build its download URL
    ///
    /// Calls `getFile` for the file path, then returns
    /// `https://api.telegram.org/file/bot{token}/{file_path}`.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails or no file path is returned
    pub async fn get_file_url(&self, file_id: &str) -> Result<String> {
        let file: TelegramFile = self
            .call("getFile", &GetFileRequest { file_id })
            .await?
            .ok_or_else(|| Error::Telegram("getFile returned no result".to_string()))?;

        let file_path = file
            .file_path
            .ok_or_else(|| Error::Telegram("getFile returned no file_path".to_string()))?;

        Ok(format!(
            "{}/file/bot{}/{file_path}",
            self.api_base,
            self.token.expose_secret()
        ))
    }

    /// Set webhook URL for receiving updates
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails
    pub async fn set_webhook(&self, url: &str, secret_token: Option<&str>) -> Result<()> {
        let request = SetWebhookRequest {
            url,
            allowed_updates: &["message"],
            secret_token,
        };

        self.call::<_, serde_json::Value>("setWebhook", &request)
            .await?;

        tracing::info!(url, "Telegram webhook set");
        Ok(())
    }

    /// Delete the webhook
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails
    pub async fn delete_webhook(&self) -> Result<()> {
        self.call::<_, serde_json::Value>("deleteWebhook", &serde_json::json!({}))
            .await?;

        tracing::info!("Telegram webhook deleted");
        Ok(())
    }
}
