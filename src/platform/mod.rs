pub mod telegram;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::BotError;

/// A text message received from the chat platform
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Platform-specific chat ID
    pub chat_id: i64,
    /// The message text
    pub text: String,
}

/// How the platform should render reply text
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    Plain,
    /// Emphasis markup (Telegram MarkdownV2)
    #[default]
    Markdown,
}

/// An outbound text reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub render: RenderMode,
    /// Rows of suggested commands shown as tappable buttons
    pub keyboard: Option<Vec<Vec<String>>>,
}

impl Reply {
    pub fn new(text: impl Into<String>, render: RenderMode) -> Self {
        Self {
            text: text.into(),
            render,
            keyboard: None,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, RenderMode::Plain)
    }

    pub fn with_keyboard<R, B>(mut self, rows: R) -> Self
    where
        R: IntoIterator<Item = B>,
        B: IntoIterator,
        B::Item: Into<String>,
    {
        self.keyboard = Some(
            rows.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        );
        self
    }
}

/// Outbound side of a chat platform.
#[async_trait]
pub trait ReplySender: Send + Sync {
    async fn send_text(&self, chat_id: i64, reply: &Reply) -> Result<(), BotError>;

    /// Show a "typing" indicator. Callers treat failure as non-fatal.
    async fn send_typing(&self, chat_id: i64) -> Result<(), BotError>;
}
