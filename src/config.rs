use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::error::BotError;
use crate::platform::RenderMode;

/// Environment variable that, when set, replaces `telegram.bot_token`.
pub const TOKEN_ENV_VAR: &str = "DICTBOT_TELEGRAM_TOKEN";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,
    #[serde(default = "default_dictionary_config")]
    pub dictionary: DictionaryConfig,
    #[serde(default = "default_reply_config")]
    pub reply: ReplyConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    /// Bot API base URL override (self-hosted Bot API server)
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default = "default_resize_keyboard")]
    pub resize_keyboard: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DictionaryConfig {
    #[serde(default = "default_dictionary_base_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplyConfig {
    /// Render mode for lookup replies
    #[serde(default)]
    pub parse_mode: RenderMode,
}

fn default_resize_keyboard() -> bool {
    true
}

fn default_dictionary_base_url() -> String {
    "https://api.dictionaryapi.dev/api/v2/entries/en".to_string()
}

fn default_user_agent() -> String {
    format!("dictbot/{}", env!("CARGO_PKG_VERSION"))
}

fn default_dictionary_config() -> DictionaryConfig {
    DictionaryConfig {
        base_url: default_dictionary_base_url(),
        user_agent: default_user_agent(),
    }
}

fn default_reply_config() -> ReplyConfig {
    ReplyConfig {
        parse_mode: RenderMode::default(),
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?
            .with_token_override(std::env::var(TOKEN_ENV_VAR).ok());

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Replace the bot token when a non-empty override is given.
    pub fn with_token_override(mut self, token: Option<String>) -> Self {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.telegram.bot_token = token;
        }
        self
    }

    pub fn validate(&self) -> Result<(), BotError> {
        if self.telegram.bot_token.trim().is_empty() {
            return Err(BotError::Config(format!(
                "telegram.bot_token is empty (set it in the config file or via {})",
                TOKEN_ENV_VAR
            )));
        }
        Ok(())
    }
}
