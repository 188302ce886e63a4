//! Chat mode UI components.

use std::collections::BTreeMap;

use super::client::VoiceMode;
use super::command::available_commands;
use crate::config::ResolvedConfig;
use crate::transcript::{Entry, EntryBody, EntryId, Message, Role, TranscriptSink};
use crate::ui::{Spinner, Style};

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn print_header() {
    println!(
        "{} {} - Smart Scheduling Assistant",
        Style::header("sched"),
        Style::version(format!("v{VERSION}"))
    );
    println!();
}

pub fn print_goodbye() {
    println!("{}", Style::success("Goodbye!"));
}

pub fn print_config(config: &ResolvedConfig, session_id: Option<&str>) {
    let enabled = |on: bool| if on { "on" } else { "off" };

    println!("{}", Style::header("Configuration"));
    println!(
        "  {}     {}",
        Style::label("endpoint"),
        Style::value(&config.endpoint)
    );
    println!(
        "  {}   {}",
        Style::label("socket_url"),
        Style::value(&config.socket_url)
    );
    println!(
        "  {}        {}",
        Style::label("speak"),
        Style::value(enabled(config.speak))
    );
    println!(
        "  {}   {}",
        Style::label("speech in"),
        Style::value(enabled(config.stt_command.is_some()))
    );
    println!(
        "  {}      {}",
        Style::label("session"),
        Style::secondary(session_id.unwrap_or("(none yet)"))
    );
    println!();
}

pub fn print_help(mic_enabled: bool) {
    println!("{}", Style::header("Available commands"));
    for (cmd, desc) in available_commands(mic_enabled) {
        println!(
            "  {}  {}",
            Style::command(format!("{cmd:<10}")),
            Style::secondary(desc)
        );
    }
    println!();
}

pub fn print_session(session_id: Option<&str>) {
    match session_id {
        Some(id) => println!("{} {}", Style::label("session"), Style::value(id)),
        None => println!("{}", Style::hint("No session yet. Send a message to start one.")),
    }
}

pub fn print_voice_mode(mode: VoiceMode) {
    match mode {
        VoiceMode::Listening => println!(
            "{} {}",
            Style::warning("🎤 Listening"),
            Style::hint("(press Enter to stop)")
        ),
        VoiceMode::Idle => println!("{}", Style::secondary("🎤 Voice capture stopped")),
    }
}

pub fn print_error(message: &str) {
    eprintln!("{} {message}", Style::error("Error:"));
    eprintln!();
}

/// Renders one message as a terminal block: header line, then the body.
pub fn format_message(message: &Message) -> String {
    let role = message.role();
    let who = match role {
        Role::User => "You",
        Role::Assistant => "Assistant",
    };
    let body = match role {
        Role::User => Style::user(message.content()),
        Role::Assistant => message.content().to_string(),
    };
    format!(
        "{} {} {}\n{body}",
        role.icon(),
        Style::header(who),
        Style::secondary(message.display_time())
    )
}

pub fn format_thoughts(entry: &Entry) -> Option<String> {
    let thoughts = entry.thoughts()?;
    let label = Style::thought(format!("[{}]", thoughts.label()));
    if !thoughts.is_expanded() {
        return Some(format!("{label} {}", Style::hint("/thoughts")));
    }
    let body = thoughts
        .joined()
        .lines()
        .map(|line| format!("  │ {line}"))
        .collect::<Vec<_>>()
        .join("\n");
    Some(format!("{label}\n{}", Style::thought(body)))
}

/// Draws the transcript on the terminal.
///
/// Typing placeholders are spinners that disappear when the placeholder is
/// removed; everything else is printed once, in order.
#[derive(Default)]
pub struct TerminalSink {
    typing: BTreeMap<EntryId, Spinner>,
}

impl TerminalSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn print(&self, block: &str) {
        // Print above the newest spinner so it does not tear.
        match self.typing.last_key_value() {
            Some((_, spinner)) => spinner.println(block),
            None => println!("{block}"),
        }
    }
}

impl TranscriptSink for TerminalSink {
    fn appended(&mut self, entry: &Entry) {
        match entry.body() {
            EntryBody::Typing => {
                self.typing.insert(entry.id(), Spinner::new("Assistant is typing..."));
            }
            EntryBody::Message(message) => {
                self.print(&format!("{}\n", format_message(message)));
            }
        }
    }

    fn removed(&mut self, entry: &Entry) {
        // Dropping the spinner clears it from the terminal.
        self.typing.remove(&entry.id());
    }

    fn thoughts_attached(&mut self, entry: &Entry) {
        if let Some(block) = format_thoughts(entry) {
            self.print(&format!("{block}\n"));
        }
    }

    fn thoughts_toggled(&mut self, entry: &Entry) {
        if let Some(block) = format_thoughts(entry) {
            self.print(&format!("{block}\n"));
        }
    }
}
