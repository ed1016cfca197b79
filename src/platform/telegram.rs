use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use teloxide::dispatching::UpdateHandler;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, KeyboardButton, KeyboardMarkup, ParseMode};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::bot::AppState;
use crate::config::TelegramConfig;
use crate::error::BotError;
use crate::platform::{IncomingMessage, RenderMode, Reply, ReplySender};

/// Sends replies through the Bot API
#[derive(Clone)]
pub struct TelegramSender {
    bot: Bot,
    resize_keyboard: bool,
}

impl TelegramSender {
    pub fn new(bot: Bot, resize_keyboard: bool) -> Self {
        Self {
            bot,
            resize_keyboard,
        }
    }
}

fn keyboard_markup(rows: &[Vec<String>], resize: bool) -> KeyboardMarkup {
    let markup = KeyboardMarkup::new(
        rows.iter()
            .map(|row| row.iter().map(|label| KeyboardButton::new(label.as_str()))),
    );
    if resize {
        markup.resize_keyboard()
    } else {
        markup
    }
}

#[async_trait]
impl ReplySender for TelegramSender {
    async fn send_text(&self, chat_id: i64, reply: &Reply) -> Result<(), BotError> {
        let mut request = self.bot.send_message(ChatId(chat_id), reply.text.clone());
        if reply.render == RenderMode::Markdown {
            request = request.parse_mode(ParseMode::MarkdownV2);
        }
        if let Some(rows) = &reply.keyboard {
            request = request.reply_markup(keyboard_markup(rows, self.resize_keyboard));
        }

        request
            .await
            .map_err(|e| BotError::Transport(e.to_string()))?;
        Ok(())
    }

    async fn send_typing(&self, chat_id: i64) -> Result<(), BotError> {
        self.bot
            .send_chat_action(ChatId(chat_id), ChatAction::Typing)
            .await
            .map_err(|e| BotError::Transport(e.to_string()))?;
        Ok(())
    }
}

/// Build the bot and verify the token with `getMe`.
pub async fn connect(config: &TelegramConfig) -> Result<Bot, BotError> {
    let mut bot = Bot::new(&config.bot_token);
    if let Some(api_url) = &config.api_url {
        let url = reqwest::Url::parse(api_url)
            .map_err(|e| BotError::Config(format!("Invalid telegram.api_url {}: {}", api_url, e)))?;
        bot = bot.set_api_url(url);
    }

    let me = bot
        .get_me()
        .await
        .map_err(|e| BotError::Connection(e.to_string()))?;

    info!(
        "Bot id: {}. Bot name: {} (@{})",
        me.id,
        me.first_name,
        me.username()
    );

    Ok(bot)
}

/// Text-bearing message updates go to the lookup pipeline; anything else
/// falls through to the dispatcher's default handler.
fn schema() -> UpdateHandler<teloxide::RequestError> {
    Update::filter_message().endpoint(handle_message)
}

/// Run the receive loop until `cancel` fires.
pub async fn run(
    bot: Bot,
    state: Arc<AppState>,
    resize_keyboard: bool,
    cancel: CancellationToken,
) {
    let sender = Arc::new(TelegramSender::new(bot.clone(), resize_keyboard));

    info!("Starting Telegram receive loop...");

    let mut dispatcher = Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![state, sender])
        .default_handler(|upd| async move {
            debug!("Ignoring non-message update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
        .build();

    let shutdown = dispatcher.shutdown_token();
    let watcher = tokio::spawn(async move {
        cancel.cancelled().await;
        info!("Shutdown requested, stopping receive loop");
        // The token reports idle until dispatching has actually started.
        loop {
            match shutdown.shutdown() {
                Ok(stopped) => {
                    stopped.await;
                    break;
                }
                Err(_) => tokio::time::sleep(Duration::from_millis(50)).await,
            }
        }
    });

    dispatcher.dispatch().await;
    watcher.abort();

    info!("Telegram receive loop stopped");
}

async fn handle_message(
    msg: Message,
    state: Arc<AppState>,
    sender: Arc<TelegramSender>,
) -> ResponseResult<()> {
    let text = match msg.text() {
        Some(t) => t.to_string(),
        None => {
            debug!("Ignoring non-text message in chat {}", msg.chat.id);
            return Ok(());
        }
    };

    let incoming = IncomingMessage {
        chat_id: msg.chat.id.0,
        text,
    };

    state.handle_message(sender.as_ref(), incoming).await;

    Ok(())
}
