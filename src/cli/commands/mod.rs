//! Subcommand implementations.

/// One-shot ask command handler.
pub mod ask;

/// Interactive chat command handler.
pub mod chat;

/// Configure command handler.
pub mod configure;
