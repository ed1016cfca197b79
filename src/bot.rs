use tracing::{debug, error, info};

use crate::commands::{self, Command};
use crate::dictionary::DictionaryClient;
use crate::format;
use crate::platform::{IncomingMessage, RenderMode, Reply, ReplySender};

/// Shared application state
pub struct AppState {
    dictionary: DictionaryClient,
    lookup_mode: RenderMode,
}

impl AppState {
    pub fn new(dictionary: DictionaryClient, lookup_mode: RenderMode) -> Self {
        Self {
            dictionary,
            lookup_mode,
        }
    }

    /// Handle one text message and send exactly one reply. Send failures are
    /// logged, never returned.
    pub async fn handle_message(&self, sender: &dyn ReplySender, incoming: IncomingMessage) {
        let chat_id = incoming.chat_id;
        info!("Message from chat {}: {}", chat_id, incoming.text);

        let reply = self.reply_for(sender, chat_id, Command::parse(&incoming.text)).await;

        if let Err(e) = sender.send_text(chat_id, &reply).await {
            error!("Failed to send reply to chat {}: {}", chat_id, e);
        }
    }

    async fn reply_for(&self, sender: &dyn ReplySender, chat_id: i64, command: Command) -> Reply {
        match command {
            Command::Start => commands::start_reply(),
            Command::Help => commands::help_reply(),
            Command::Lookup(word) => {
                if let Err(e) = sender.send_typing(chat_id).await {
                    debug!("Typing indicator failed for chat {}: {}", chat_id, e);
                }
                let outcome = self.dictionary.lookup(&word).await;
                Reply::new(
                    format::render_outcome(&word, &outcome, self.lookup_mode),
                    self.lookup_mode,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DictionaryConfig;
    use crate::error::BotError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const TWO_MEANINGS: &str = r#"[{
        "word": "hello",
        "phonetics": [{"text": "həˈləʊ"}],
        "meanings": [
            {"partOfSpeech": "exclamation", "definitions": [
                {"definition": "used as a greeting", "example": "hello there"},
                {"definition": "used to express surprise"}
            ]},
            {"partOfSpeech": "noun", "definitions": [{"definition": "an utterance of hello"}]}
        ]
    }]"#;

    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<(i64, Reply)>>,
        typing: Mutex<Vec<i64>>,
        fail: bool,
    }

    impl RecordingSender {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn sent(&self) -> Vec<(i64, Reply)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ReplySender for RecordingSender {
        async fn send_text(&self, chat_id: i64, reply: &Reply) -> Result<(), BotError> {
            self.sent.lock().unwrap().push((chat_id, reply.clone()));
            if self.fail {
                return Err(BotError::Transport("network down".to_string()));
            }
            Ok(())
        }

        async fn send_typing(&self, chat_id: i64) -> Result<(), BotError> {
            self.typing.lock().unwrap().push(chat_id);
            Ok(())
        }
    }

    fn state_for(base_url: &str, mode: RenderMode) -> AppState {
        let dictionary = DictionaryClient::new(&DictionaryConfig {
            base_url: base_url.to_string(),
            user_agent: "dictbot-test".to_string(),
        })
        .unwrap();
        AppState::new(dictionary, mode)
    }

    fn message(text: &str) -> IncomingMessage {
        IncomingMessage {
            chat_id: 7,
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_start_sends_keyboard() {
        let state = state_for("http://127.0.0.1:9/entries/en", RenderMode::Markdown);
        let sender = RecordingSender::default();

        state.handle_message(&sender, message("/start")).await;

        let sent = sender.sent();
        assert_eq!(sent.len(), 1);
        let (chat_id, reply) = &sent[0];
        assert_eq!(*chat_id, 7);
        let buttons: Vec<String> = reply.keyboard.clone().unwrap().into_iter().flatten().collect();
        assert!(buttons.contains(&"/start".to_string()));
        assert!(buttons.contains(&"/help".to_string()));
        assert!(sender.typing.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_help_sends_usage() {
        let state = state_for("http://127.0.0.1:9/entries/en", RenderMode::Markdown);
        let sender = RecordingSender::default();

        state.handle_message(&sender, message("/help")).await;

        let sent = sender.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1, commands::help_reply());
    }

    #[tokio::test]
    async fn test_lookup_replies_with_first_definition_only() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/entries/en/hello")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(TWO_MEANINGS)
            .create_async()
            .await;

        let state = state_for(&format!("{}/api/v2/entries/en", server.url()), RenderMode::Plain);
        let sender = RecordingSender::default();

        state.handle_message(&sender, message("hello")).await;

        mock.assert_async().await;
        let sent = sender.sent();
        assert_eq!(sent.len(), 1);
        let reply = &sent[0].1;
        assert_eq!(reply.render, RenderMode::Plain);
        assert!(reply.keyboard.is_none());
        assert!(reply.text.contains("Definition: used as a greeting"));
        assert!(reply.text.contains("Part of Speech: exclamation"));
        assert!(!reply.text.contains("surprise"));
        assert!(!reply.text.contains("utterance"));
        assert!(!reply.text.contains("noun"));
        assert_eq!(*sender.typing.lock().unwrap(), vec![7]);
    }

    #[tokio::test]
    async fn test_lookup_uses_configured_render_mode() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v2/entries/en/hello")
            .with_status(200)
            .with_body(TWO_MEANINGS)
            .create_async()
            .await;

        let state = state_for(&format!("{}/api/v2/entries/en", server.url()), RenderMode::Markdown);
        let sender = RecordingSender::default();

        state.handle_message(&sender, message("hello")).await;

        let reply = &sender.sent()[0].1;
        assert_eq!(reply.render, RenderMode::Markdown);
        assert!(reply.text.starts_with("🔤 Word: *hello*"));
    }

    #[tokio::test]
    async fn test_not_found_and_service_error_replies() {
        let mut server = mockito::Server::new_async().await;
        let _empty = server
            .mock("GET", "/api/v2/entries/en/nothing")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;
        let _broken = server
            .mock("GET", "/api/v2/entries/en/broken")
            .with_status(500)
            .create_async()
            .await;

        let state = state_for(&format!("{}/api/v2/entries/en", server.url()), RenderMode::Plain);
        let sender = RecordingSender::default();

        state.handle_message(&sender, message("nothing")).await;
        state.handle_message(&sender, message("broken")).await;

        let sent = sender.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].1.text.contains("No definition found"));
        assert!(sent[1].1.text.starts_with("⚠️ An error occurred:"));
        assert_ne!(sent[0].1.text, sent[1].1.text);
    }

    #[tokio::test]
    async fn test_send_failure_is_swallowed() {
        let state = state_for("http://127.0.0.1:9/entries/en", RenderMode::Plain);
        let sender = RecordingSender::failing();

        state.handle_message(&sender, message("/help")).await;
        state.handle_message(&sender, message("/start")).await;

        assert_eq!(sender.sent().len(), 2);
    }
}
