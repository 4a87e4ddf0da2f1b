//! TOML configuration file loading
//!
//! Supports `~/.config/mushroom-bot/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct BotConfigFile {
    /// Telegram settings
    #[serde(default)]
    pub telegram: TelegramFileConfig,

    /// Server/runtime configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Google Cloud settings
    #[serde(default)]
    pub google: GoogleFileConfig,

    /// Reply behaviour
    #[serde(default)]
    pub bot: BotFileConfig,
}

/// Telegram configuration
#[derive(Debug, Default, Deserialize)]
pub struct TelegramFileConfig {
    pub bot_token: Option<String>,
    pub webhook_secret: Option<String>,
    /// Bot API host override (self-hosted Bot API server)
    pub api_base: Option<String>,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    pub port: Option<u16>,
}

/// Google Cloud configuration
#[derive(Debug, Default, Deserialize)]
pub struct GoogleFileConfig {
    /// Service account key file
    pub credentials_file: Option<PathBuf>,
    /// Project override
    pub project_id: Option<String>,
}

/// Reply behaviour
#[derive(Debug, Default, Deserialize)]
pub struct BotFileConfig {
    /// Intent detection language (e.g. "ru-RU")
    pub language: Option<String>,
    /// Translate detected labels before replying
    pub translate_labels: Option<bool>,
}

/// Load the config file, returning defaults if missing or invalid
///
/// An explicit `path` is used as given; otherwise the default location is
/// tried.
#[must_use]
pub fn load_config_file(path: Option<&Path>) -> BotConfigFile {
    let Some(path) = path.map(Path::to_path_buf).or_else(config_file_path) else {
        return BotConfigFile::default();
    };

    if !path.exists() {
        return BotConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                BotConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file, using defaults"
            );
            BotConfigFile::default()
        }
    }
}

/// Default config file location
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("mushroom-bot").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    #[test]
    fn parses_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[telegram]
bot_token = "123:abc"

[bot]
translate_labels = true
"#
        )
        .unwrap();

        let config = load_config_file(Some(file.path()));
        assert_eq!(config.telegram.bot_token.as_deref(), Some("123:abc"));
        assert_eq!(config.bot.translate_labels, Some(true));
        assert!(config.server.port.is_none());
        assert!(config.google.credentials_file.is_none());
    }

    #[test]
    fn invalid_file_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[server]\nport = \"not a number\"\n").unwrap();

        let config = load_config_file(Some(file.path()));
        assert!(config.server.port.is_none());
    }

    #[test]
    fn missing_file_is_default() {
        let config = load_config_file(Some(Path::new("/nonexistent/mushroom-bot.toml")));
        assert!(config.telegram.bot_token.is_none());
    }
}
