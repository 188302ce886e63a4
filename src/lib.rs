//! # sched - Smart Scheduling Assistant chat client
//!
//! `sched` is a terminal chat client for a scheduling assistant backend.
//! Typed messages are sent to the assistant's turn endpoint; replies are
//! rendered with an optional, collapsible list of the assistant's
//! "thoughts". A voice mode hands turn-taking to the backend, which pushes
//! transcripts, thoughts and replies over a WebSocket event channel.
//!
//! ## Quick Start
//!
//! ```bash
//! # Interactive chat against a local backend
//! sched
//!
//! # Different backend, replies spoken aloud
//! sched --endpoint https://assistant.example.com --speak
//!
//! # One-shot message, continuing a session
//! sched ask --session web_session_42 "Move my 3pm to Friday"
//! ```
//!
//! ## Configuration
//!
//! Settings are stored in `~/.config/sched/config.toml`:
//!
//! ```toml
//! [sched]
//! endpoint = "http://localhost:8000"
//! socket_url = "ws://localhost:8000/voice"
//! speak = true
//!
//! [speech]
//! tts_command = ["espeak"]
//! stt_command = ["my-stt", "--once"]
//! ```

/// Interactive chat: turn handling, slash commands and terminal rendering.
pub mod chat;

/// Command-line interface definitions and handlers.
pub mod cli;

/// Configuration file management.
pub mod config;

/// File system utilities.
pub mod fs;

/// Input reading for one-shot messages.
pub mod input;

/// Global output configuration (quiet mode, colors).
pub mod output;

/// XDG-style path utilities for configuration.
pub mod paths;

/// Optional speech input and output.
pub mod speech;

/// Conversation transcript model.
pub mod transcript;

/// Turn endpoint and voice event channel.
pub mod transport;

/// Turn correlation.
pub mod turn;

/// Terminal UI components (spinner, colors).
pub mod ui;
