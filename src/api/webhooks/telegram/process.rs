//! Telegram update processing
//!
//! Text goes to Dialogflow and every reply is sent back in order. Photos go
//! through `getFile` and Cloud Vision, and a single threaded reply says
//! whether mushrooms were seen.

use std::sync::Arc;

use super::types::{Content, TelegramMessage, TelegramPhotoSize};
use crate::channels::{FileResolver, MessageSender, OutgoingMessage};
use crate::google::{CredentialsProvider, IntentDetector, LabelDetector, Translator};
use crate::labels::{self, LabelVerdict};
use crate::Result;

/// Default language for intent detection and label translation
pub const DEFAULT_LANGUAGE: &str = "ru-RU";

/// Language the label detector answers in
const LABEL_SOURCE_LANGUAGE: &str = "en-US";

/// Maximum labels requested from the detector
pub const MAX_LABELS: u32 = 10;

/// Runs one validated update through the matching branch
pub struct UpdateProcessor {
    sender: Arc<dyn MessageSender>,
    files: Arc<dyn FileResolver>,
    credentials: Arc<dyn CredentialsProvider>,
    intents: Arc<dyn IntentDetector>,
    labels: Arc<dyn LabelDetector>,
    translator: Option<Arc<dyn Translator>>,
    language_code: String,
}

impl UpdateProcessor {
    /// Create a processor from its collaborators
    #[must_use]
    pub fn new(
        sender: Arc<dyn MessageSender>,
        files: Arc<dyn FileResolver>,
        credentials: Arc<dyn CredentialsProvider>,
        intents: Arc<dyn IntentDetector>,
        labels: Arc<dyn LabelDetector>,
    ) -> Self {
        Self {
            sender,
            files,
            credentials,
            intents,
            labels,
            translator: None,
            language_code: DEFAULT_LANGUAGE.to_string(),
        }
    }

    /// Translate detected labels before replying
    #[must_use]
    pub fn translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Set the intent detection and translation target language
    #[must_use]
    pub fn language_code(mut self, code: impl Into<String>) -> Self {
        self.language_code = code.into();
        self
    }

    /// Process a validated message
    ///
    /// # Errors
    ///
    /// Returns the first downstream failure; nothing is retried
    pub async fn process(&self, message: &TelegramMessage, content: Content) -> Result<()> {
        match content {
            Content::Text(text) => {
                tracing::info!(chat_id = message.chat.id, "got webhook with text");
                self.process_text(message.chat.id, &text).await
            }
            Content::Photo(photo) => {
                tracing::info!(chat_id = message.chat.id, "got webhook with photo");
                self.process_photo(message.chat.id, message.message_id, &photo)
                    .await
            }
        }
    }

    /// Answer text with the agent's replies
    async fn process_text(&self, chat_id: i64, text: &str) -> Result<()> {
        let project = self.credentials.project_id().await?;
        let session = chat_id.to_string();

        let replies = self
            .intents
            .detect_intent(&project, &session, text, &self.language_code)
            .await?;

        tracing::debug!(chat_id, replies = replies.len(), "sending intent replies");
        for reply in replies {
            self.sender.send(OutgoingMessage::text(chat_id, reply)).await?;
        }

        Ok(())
    }

    /// Answer a photo with what the detector saw
    async fn process_photo(
        &self,
        chat_id: i64,
        message_id: i64,
        photo: &TelegramPhotoSize,
    ) -> Result<()> {
        let url = self.files.file_url(&photo.file_id).await?;
        let detected = self.labels.detect_labels(&url, MAX_LABELS).await?;

        let text = match LabelVerdict::from_labels(&detected) {
            LabelVerdict::NotFound => {
                tracing::debug!(chat_id, labels = ?detected, "no mushrooms detected");
                labels::not_found_reply()
            }
            LabelVerdict::Seen(joined) => {
                let joined = self.translate_labels(joined).await;
                labels::seen_reply(&joined)
            }
        };

        self.sender
            .send(OutgoingMessage::reply(chat_id, text, message_id))
            .await
    }

    /// Translate joined labels, falling back to the original on failure
    async fn translate_labels(&self, joined: String) -> String {
        let Some(translator) = &self.translator else {
            return joined;
        };
        if joined.is_empty() {
            return joined;
        }

        match translator
            .translate(&joined, LABEL_SOURCE_LANGUAGE, &self.language_code)
            .await
        {
            Ok(translated) => translated,
            Err(e) => {
                tracing::warn!(error = %e, "label translation failed, sending untranslated");
                joined
            }
        }
    }
}
