//! Configuration management for the mushroom bot
//!
//! Precedence is environment, then the TOML config file, then defaults.

pub mod file;

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use self::file::BotConfigFile;
use crate::api::webhooks::telegram::DEFAULT_LANGUAGE;
use crate::{Error, Result};

/// Port used when neither `PORT` nor the config file set one
pub const DEFAULT_PORT: u16 = 8080;

/// Bot configuration
#[derive(Debug)]
pub struct Config {
    /// Telegram bot token (`BOT_TOKEN` or `TELEGRAM_BOT_TOKEN`)
    pub bot_token: SecretString,

    /// Telegram Bot API host override
    pub telegram_api_base: Option<String>,

    /// Expected webhook secret token (`WEBHOOK_SECRET`)
    pub webhook_secret: Option<SecretString>,

    /// Port to listen on (`PORT`)
    pub port: u16,

    /// Google Cloud configuration
    pub google: GoogleConfig,

    /// Intent detection language (`INTENT_LANGUAGE`)
    pub language_code: String,

    /// Translate detected labels before replying (`TRANSLATE_LABELS`)
    pub translate_labels: bool,
}

/// Google Cloud configuration
#[derive(Debug, Clone, Default)]
pub struct GoogleConfig {
    /// Service account key file (`GOOGLE_APPLICATION_CREDENTIALS`);
    /// the metadata server is used when unset
    pub credentials_file: Option<PathBuf>,

    /// Project override (`GOOGLE_CLOUD_PROJECT`)
    pub project_id: Option<String>,
}

impl Config {
    /// Load configuration from the environment and the config file
    ///
    /// # Errors
    ///
    /// Returns error if no bot token is configured
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let fc = file::load_config_file(config_path);
        Self::from_sources(&fc, |key| std::env::var(key).ok())
    }

    /// Build configuration from a parsed file and an environment lookup
    ///
    /// # Errors
    ///
    /// Returns error if no bot token is configured
    pub fn from_sources(fc: &BotConfigFile, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let env = |key: &str| env(key).filter(|v| !v.is_empty());

        let bot_token = env("BOT_TOKEN")
            .or_else(|| env("TELEGRAM_BOT_TOKEN"))
            .or_else(|| fc.telegram.bot_token.clone())
            .ok_or_else(|| Error::Config("BOT_TOKEN is not set".to_string()))?;

        let port = env("PORT")
            .and_then(|s| s.parse().ok())
            .or(fc.server.port)
            .unwrap_or(DEFAULT_PORT);

        let google = GoogleConfig {
            credentials_file: env("GOOGLE_APPLICATION_CREDENTIALS")
                .map(PathBuf::from)
                .or_else(|| fc.google.credentials_file.clone()),
            project_id: env("GOOGLE_CLOUD_PROJECT").or_else(|| fc.google.project_id.clone()),
        };

        let translate_labels = env("TRANSLATE_LABELS")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .or(fc.bot.translate_labels)
            .unwrap_or(false);

        Ok(Self {
            bot_token: SecretString::from(bot_token),
            telegram_api_base: env("TELEGRAM_API_URL").or_else(|| fc.telegram.api_base.clone()),
            webhook_secret: env("WEBHOOK_SECRET")
                .or_else(|| fc.telegram.webhook_secret.clone())
                .map(SecretString::from),
            port,
            google,
            language_code: env("INTENT_LANGUAGE")
                .or_else(|| fc.bot.language.clone())
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            translate_labels,
        })
    }
}
