mod bot;
mod commands;
mod config;
mod dictionary;
mod error;
mod format;
mod platform;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::bot::AppState;
use crate::config::Config;
use crate::dictionary::DictionaryClient;
use crate::platform::telegram;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,dictbot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    info!("Configuration loaded successfully");
    info!("  Dictionary: {}", config.dictionary.base_url);
    info!("  Reply mode: {:?}", config.reply.parse_mode);

    let dictionary = DictionaryClient::new(&config.dictionary)?;

    // Fail fast before entering the receive loop
    let bot = telegram::connect(&config.telegram)
        .await
        .context("Failed to identify the bot with Telegram")?;

    let state = Arc::new(AppState::new(dictionary, config.reply.parse_mode));

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Ctrl-C received");
                    cancel.cancel();
                }
                Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
            }
        });
    }

    info!("Bot started, press Ctrl-C to exit.");
    telegram::run(bot, state, config.telegram.resize_keyboard, cancel).await;

    info!("Bot stopped");
    Ok(())
}
