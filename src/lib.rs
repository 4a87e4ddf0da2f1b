//! Mushroom Bot - Telegram webhook bot backed by Google Cloud
//!
//! This library provides the core functionality for the bot:
//! - Telegram webhook intake and Bot API client
//! - Dialogflow intent detection for text messages
//! - Cloud Vision label detection for photos, with mushroom verdicts
//! - Google Cloud credential discovery
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 Telegram Bot API                     │
//! └────────────────────┬────────────────────────────────┘
//!                      │ webhook
//! ┌────────────────────▼────────────────────────────────┐
//! │                  Mushroom Bot                        │
//! │   Webhook  │  Update Processor  │  Label Verdicts    │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                 Google Cloud                         │
//! │   Dialogflow  │  Vision  │  Translation             │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod channels;
pub mod config;
pub mod error;
pub mod google;
pub mod labels;

pub use api::webhooks::telegram::UpdateProcessor;
pub use api::{ApiServer, ApiServerBuilder};
pub use channels::TelegramChannel;
pub use config::Config;
pub use error::{Error, Result};
