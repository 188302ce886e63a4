use inquire::autocompletion::{Autocomplete, Replacement};

// Available slash commands: (command, description)
const SLASH_COMMANDS: &[(&str, &str)] = &[
    ("/config", "Show current configuration"),
    ("/help", "Show available commands"),
    ("/mic", "Speak your next message"),
    ("/quit", "Exit chat"),
    ("/session", "Show the current session id"),
    ("/thoughts", "Show or hide the assistant's thoughts"),
    ("/voice", "Hand the conversation to voice mode"),
];

/// Slash commands offered in the prompt; `/mic` only when speech input exists.
pub fn available_commands(mic_enabled: bool) -> impl Iterator<Item = &'static (&'static str, &'static str)> {
    SLASH_COMMANDS
        .iter()
        .filter(move |(cmd, _)| mic_enabled || *cmd != "/mic")
}

/// Slash command autocompleter
#[derive(Clone, Default)]
pub struct SlashCommandCompleter {
    mic_enabled: bool,
}

impl SlashCommandCompleter {
    pub const fn new(mic_enabled: bool) -> Self {
        Self { mic_enabled }
    }
}

impl Autocomplete for SlashCommandCompleter {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, inquire::CustomUserError> {
        if !input.starts_with('/') {
            return Ok(vec![]);
        }

        let suggestions: Vec<String> = available_commands(self.mic_enabled)
            .filter(|(cmd, _)| cmd.starts_with(input))
            .map(|(cmd, desc)| format!("{cmd}  {desc}"))
            .collect();

        Ok(suggestions)
    }

    fn get_completion(
        &mut self,
        _input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, inquire::CustomUserError> {
        let replacement =
            highlighted_suggestion.map(|s| s.split_whitespace().next().unwrap_or("").to_string());
        Ok(replacement)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Config,
    Help,
    Mic,
    Quit,
    Session,
    /// Toggle the latest disclosure, or the n-th (1-based) one.
    Thoughts(Option<usize>),
    Voice,
    Unknown(String),
}

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Text(String),
    Command(SlashCommand),
    Empty,
}

/// Classifies one prompt line. Text is passed through untrimmed.
pub fn parse_input(input: &str) -> Input {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Input::Empty;
    }

    trimmed
        .strip_prefix('/')
        .map_or_else(|| Input::Text(input.to_string()), parse_slash_command)
}

fn parse_slash_command(cmd: &str) -> Input {
    let parts: Vec<&str> = cmd.split_whitespace().collect();

    let command = match parts.as_slice() {
        ["config"] => SlashCommand::Config,
        ["help" | "?"] => SlashCommand::Help,
        ["mic"] => SlashCommand::Mic,
        ["quit" | "exit" | "q"] => SlashCommand::Quit,
        ["session"] => SlashCommand::Session,
        ["thoughts"] => SlashCommand::Thoughts(None),
        ["thoughts", n] => match n.parse::<usize>() {
            Ok(n) if n > 0 => SlashCommand::Thoughts(Some(n)),
            _ => SlashCommand::Unknown(parts.join(" ")),
        },
        ["voice"] => SlashCommand::Voice,
        _ => SlashCommand::Unknown(parts.join(" ")),
    };
    Input::Command(command)
}
