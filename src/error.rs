//! Errors raised by the bot's platform plumbing.
//!
//! Dictionary lookups never fail with an error value; they report through
//! [`crate::dictionary::LookupOutcome`] instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    /// The startup identity check against the Bot API failed.
    #[error("Connection error: {0}")]
    Connection(String),

    /// An outbound request to the chat platform failed.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Config error: {0}")]
    Config(String),
}
