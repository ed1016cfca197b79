use crate::platform::Reply;

const USAGE: &str = "Here's how you can use me:\n\
     - Just type a word and I'll give you its definition, meaning, and phonetics.\n\
     - Use /start to start the bot.\n\
     - Use /help to get this instruction message.";

/// What an incoming message asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    /// Look up the full message text, unmodified
    Lookup(String),
}

impl Command {
    /// Classify message text. Only exact `/start` and `/help` are commands;
    /// everything else is a lookup.
    pub fn parse(text: &str) -> Self {
        match text {
            "/start" => Command::Start,
            "/help" => Command::Help,
            other => Command::Lookup(other.to_string()),
        }
    }
}

/// Welcome message with the quick-reply keyboard.
pub fn start_reply() -> Reply {
    Reply::plain(format!("Welcome to the Dictionary Bot! 📚\n\n{}", USAGE))
        .with_keyboard([["/start"], ["/help"]])
}

pub fn help_reply() -> Reply {
    Reply::plain(USAGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_commands() {
        assert_eq!(Command::parse("/start"), Command::Start);
        assert_eq!(Command::parse("/help"), Command::Help);
    }

    #[test]
    fn test_everything_else_is_a_verbatim_lookup() {
        for text in [
            "hello",
            "Hello",
            "  hello  ",
            " ",
            "/start ",
            "/START",
            "/help me",
            "/define word",
            "ice cream",
            "/start@dictionary_bot",
        ] {
            assert_eq!(Command::parse(text), Command::Lookup(text.to_string()));
        }
    }

    #[test]
    fn test_start_reply_has_command_buttons() {
        let reply = start_reply();
        assert!(reply.text.starts_with("Welcome to the Dictionary Bot!"));
        assert_eq!(
            reply.keyboard,
            Some(vec![vec!["/start".to_string()], vec!["/help".to_string()]])
        );
    }

    #[test]
    fn test_help_reply_has_no_keyboard() {
        let reply = help_reply();
        assert!(reply.text.contains("/start"));
        assert!(reply.text.contains("/help"));
        assert!(reply.keyboard.is_none());
    }
}
