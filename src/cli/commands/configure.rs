//! Configure command handler for editing default settings.

use anyhow::Result;
use inquire::{Confirm, Text};

use crate::config::{
    ConfigFile, ConfigManager, DEFAULT_ENDPOINT, DEFAULT_SOCKET_URL, SchedConfig, SpeechConfig,
    validate_url,
};
use crate::ui::{Style, handle_prompt_cancellation};

/// Runs the configure command.
///
/// With `show`, prints the current file. Otherwise prompts for each setting
/// and saves the result.
pub fn run_configure(show: bool) -> Result<()> {
    let manager = ConfigManager::new()?;
    let config = manager.load_or_default()?;

    if show {
        print_current_settings(&manager, &config);
        return Ok(());
    }

    let Some(updated) = handle_prompt_cancellation(|| prompt_settings(&config))? else {
        return Ok(());
    };
    manager.save(&updated)?;

    println!();
    println!(
        "{} Configuration saved to {}",
        Style::success("✓"),
        Style::secondary(manager.config_path().display().to_string())
    );
    Ok(())
}

fn print_current_settings(manager: &ConfigManager, config: &ConfigFile) {
    let or_default = |value: Option<&str>, default: &str| {
        value.map_or_else(
            || Style::secondary(format!("{default} (default)")),
            Style::value,
        )
    };
    let flag = |value: Option<bool>, default: bool| {
        value.map_or_else(
            || Style::secondary(format!("{default} (default)")),
            Style::value,
        )
    };
    let argv = |argv: &[String]| {
        if argv.is_empty() {
            Style::secondary("(not set)")
        } else {
            Style::value(argv.join(" "))
        }
    };

    println!(
        "{} {}",
        Style::header("Configuration"),
        Style::secondary(manager.config_path().display().to_string())
    );
    println!(
        "  {}      {}",
        Style::label("endpoint"),
        or_default(config.sched.endpoint.as_deref(), DEFAULT_ENDPOINT)
    );
    println!(
        "  {}    {}",
        Style::label("socket_url"),
        or_default(config.sched.socket_url.as_deref(), DEFAULT_SOCKET_URL)
    );
    println!(
        "  {}         {}",
        Style::label("speak"),
        flag(config.sched.speak, false)
    );
    println!(
        "  {}      {}",
        Style::label("greeting"),
        flag(config.sched.greeting, true)
    );
    println!(
        "  {}   {}",
        Style::label("tts_command"),
        argv(&config.speech.tts_command)
    );
    println!(
        "  {}   {}",
        Style::label("stt_command"),
        argv(&config.speech.stt_command)
    );
    println!();
}

fn prompt_settings(current: &ConfigFile) -> Result<ConfigFile> {
    let endpoint = prompt_url(
        "Turn endpoint:",
        current.sched.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT),
        "endpoint",
        &["http", "https"],
    )?;
    let socket_url = prompt_url(
        "Voice channel URL:",
        current
            .sched
            .socket_url
            .as_deref()
            .unwrap_or(DEFAULT_SOCKET_URL),
        "socket_url",
        &["ws", "wss"],
    )?;

    let tts_command = prompt_command(
        "Text-to-speech command (empty for none):",
        &current.speech.tts_command,
    )?;
    let speak = !tts_command.is_empty()
        && Confirm::new("Speak replies aloud?")
            .with_default(current.sched.speak.unwrap_or(false))
            .prompt()?;
    let stt_command = prompt_command(
        "Speech-to-text command (empty for none):",
        &current.speech.stt_command,
    )?;
    let greeting = Confirm::new("Show a greeting when chat starts?")
        .with_default(current.sched.greeting.unwrap_or(true))
        .prompt()?;

    Ok(ConfigFile {
        sched: SchedConfig {
            endpoint: Some(endpoint),
            socket_url: Some(socket_url),
            speak: Some(speak),
            greeting: Some(greeting),
        },
        speech: SpeechConfig {
            tts_command,
            stt_command,
            stt_timeout_secs: current.speech.stt_timeout_secs,
        },
    })
}

fn prompt_url(message: &str, default: &str, key: &str, schemes: &[&str]) -> Result<String> {
    loop {
        let value = Text::new(message).with_default(default).prompt()?;
        let value = value.trim().to_string();
        match validate_url(&value, key, schemes) {
            Ok(()) => return Ok(value),
            Err(e) => eprintln!("{} {e}", Style::error("Error:")),
        }
    }
}

fn prompt_command(message: &str, current: &[String]) -> Result<Vec<String>> {
    let joined = current.join(" ");
    let value = Text::new(message)
        .with_default(&joined)
        .with_help_message("The command and its arguments, separated by spaces")
        .prompt()?;
    Ok(split_command(&value))
}

fn split_command(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}
