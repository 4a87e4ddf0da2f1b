use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use secrecy::{ExposeSecret, SecretString};
use tracing_subscriber::EnvFilter;

use mushroom_bot::google::{self, DialogflowClient, TranslateClient, VisionClient};
use mushroom_bot::{ApiServerBuilder, Config, TelegramChannel, UpdateProcessor};

/// Mushroom Bot - Telegram bot that answers chats and spots mushrooms in photos
#[derive(Parser)]
#[command(name = "mushroom-bot", version, about)]
struct Cli {
    /// Port to listen on (overrides PORT and the config file)
    #[arg(long)]
    port: Option<u16>,

    /// Config file path (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the webhook (default)
    Serve,
    /// Register the webhook URL with Telegram
    SetWebhook {
        /// Public HTTPS URL Telegram should post updates to
        url: String,
    },
    /// Remove the registered webhook
    DeleteWebhook,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,mushroom_bot=info",
        1 => "info,mushroom_bot=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    tracing::debug!(?config, "loaded configuration");

    let telegram = Arc::new(telegram_channel(&config));

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, telegram).await,
        Command::SetWebhook { url } => {
            telegram
                .set_webhook(
                    &url,
                    config.webhook_secret.as_ref().map(|s| s.expose_secret()),
                )
                .await?;
            tracing::info!(%url, "webhook registered");
            Ok(())
        }
        Command::DeleteWebhook => {
            telegram.delete_webhook().await?;
            tracing::info!("webhook deleted");
            Ok(())
        }
    }
}

fn telegram_channel(config: &Config) -> TelegramChannel {
    let token = SecretString::from(config.bot_token.expose_secret().to_owned());
    match &config.telegram_api_base {
        Some(base) => TelegramChannel::with_api_base(token, base.clone()),
        None => TelegramChannel::new(token),
    }
}

async fn serve(config: Config, telegram: Arc<TelegramChannel>) -> anyhow::Result<()> {
    tracing::info!(
        port = config.port,
        language = %config.language_code,
        translate_labels = config.translate_labels,
        "starting mushroom bot"
    );

    let credentials = google::default_credentials(
        config.google.credentials_file.clone(),
        config.google.project_id.clone(),
    );

    let mut processor = UpdateProcessor::new(
        telegram.clone(),
        telegram,
        credentials.clone(),
        Arc::new(DialogflowClient::new(credentials.clone())),
        Arc::new(VisionClient::new(credentials.clone())),
    )
    .language_code(config.language_code.clone());

    if config.translate_labels {
        processor = processor.translator(Arc::new(TranslateClient::new(credentials)));
    }

    ApiServerBuilder::new(Arc::new(processor), config.port)
        .webhook_secret(config.webhook_secret)
        .build()
        .run()
        .await?;

    Ok(())
}
