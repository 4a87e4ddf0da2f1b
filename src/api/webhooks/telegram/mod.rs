//! Telegram webhook handler

mod process;
pub mod types;

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;

pub use self::process::{DEFAULT_LANGUAGE, MAX_LABELS, UpdateProcessor};
use self::types::{Content, TelegramMessage, TelegramUpdate};
use crate::api::ApiState;
use crate::{Error, Result};

/// Header Telegram uses to echo the webhook secret
const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Telegram webhook response
#[derive(Serialize)]
pub struct WebhookResponse {
    pub ok: bool,
}

impl WebhookResponse {
    fn reply(status: StatusCode) -> (StatusCode, Json<Self>) {
        (
            status,
            Json(Self {
                ok: status.is_success(),
            }),
        )
    }
}

/// Parse a raw request body into an update
///
/// # Errors
///
/// Returns `Error::Decode` if the body is not a well-formed update
pub fn decode_update(body: &[u8]) -> Result<TelegramUpdate> {
    serde_json::from_slice(body).map_err(|e| Error::Decode(e.to_string()))
}

/// Check that the update carries something to answer
///
/// Text takes precedence when a message has both text and a photo.
///
/// # Errors
///
/// Returns `Error::Validation` if there is no message, or the message has
/// neither text nor a photo
pub fn validate_update(update: &TelegramUpdate) -> Result<(&TelegramMessage, Content)> {
    let message = update
        .message
        .as_ref()
        .ok_or_else(|| Error::Validation("webhook: no message".to_string()))?;

    if let Some(text) = message.text() {
        return Ok((message, Content::Text(text.to_string())));
    }

    message
        .largest_photo()
        .map(|photo| (message, Content::Photo(photo.clone())))
        .ok_or_else(|| Error::Validation("webhook: no text or photo".to_string()))
}

/// Handle an incoming Telegram update
///
/// The update is processed inline; the response status reports the outcome:
/// 400 for undecodable or unanswerable updates, 500 for downstream failures.
pub async fn handle_update(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<WebhookResponse>) {
    // Validate webhook secret token if configured
    if let Some(expected) = state.webhook_secret.as_ref().map(|s| s.expose_secret()) {
        let provided = headers
            .get(SECRET_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok());

        if provided != Some(expected) {
            tracing::warn!("Telegram webhook secret mismatch");
            return WebhookResponse::reply(StatusCode::FORBIDDEN);
        }
    }

    let update = match decode_update(&body) {
        Ok(update) => update,
        Err(e) => {
            tracing::warn!(error = %e, "error parsing webhook");
            return WebhookResponse::reply(StatusCode::BAD_REQUEST);
        }
    };

    let (message, content) = match validate_update(&update) {
        Ok(validated) => validated,
        Err(e) => {
            tracing::warn!(update_id = update.update_id, error = %e, "error validating webhook");
            return WebhookResponse::reply(StatusCode::BAD_REQUEST);
        }
    };

    match state.processor.process(message, content).await {
        Ok(()) => WebhookResponse::reply(StatusCode::OK),
        Err(e) => {
            tracing::error!(
                update_id = update.update_id,
                chat_id = message.chat.id,
                error = %e,
                "error processing webhook"
            );
            let status = if e.is_client_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            WebhookResponse::reply(status)
        }
    }
}
