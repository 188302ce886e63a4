//! Interactive chat with the scheduling assistant.
//!
//! Provides the turn handling core ([`ChatClient`]) and a REPL-style
//! terminal front end with slash commands.

mod client;
/// Slash command parsing and autocomplete.
pub mod command;
mod session;
mod ui;

pub use client::{
    APOLOGY, ChatClient, Dispatched, GREETING, SessionState, TurnOutcome, VoiceMode,
};
pub use session::ChatSession;
pub use ui::{TerminalSink, format_message, format_thoughts};
