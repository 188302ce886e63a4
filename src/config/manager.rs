use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::fs::atomic_write;
use crate::paths;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000";
pub const DEFAULT_SOCKET_URL: &str = "ws://localhost:8000/voice";
pub const DEFAULT_STT_TIMEOUT_SECS: u64 = 12;

/// Default settings in the `[sched]` section of config.toml.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedConfig {
    /// Base URL of the turn endpoint.
    pub endpoint: Option<String>,
    /// WebSocket URL of the voice event channel.
    pub socket_url: Option<String>,
    /// Speak assistant replies aloud (needs `speech.tts_command`).
    pub speak: Option<bool>,
    /// Show the greeting when chat starts.
    pub greeting: Option<bool>,
}

/// The `[speech]` section: external commands for voice I/O.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Text-to-speech command; the text is appended as the last argument.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tts_command: Vec<String>,
    /// Speech-to-text command printing one transcript on stdout.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stt_command: Vec<String>,
    /// Seconds of silence before a capture gives up.
    pub stt_timeout_secs: Option<u64>,
}

/// The complete configuration file structure.
///
/// Corresponds to `~/.config/sched/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub sched: SchedConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
}

/// Configuration after merging CLI options, the config file and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub endpoint: String,
    pub socket_url: String,
    pub speak: bool,
    pub greeting: bool,
    pub tts_command: Option<Vec<String>>,
    pub stt_command: Option<Vec<String>>,
    pub stt_timeout: Duration,
}

/// CLI overrides that take precedence over config file values.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub endpoint: Option<String>,
    pub socket_url: Option<String>,
    pub speak: Option<bool>,
}

/// Resolves configuration: CLI options, then config file, then built-in defaults.
///
/// # Errors
///
/// Returns an error if a URL is malformed or uses the wrong scheme, or if
/// speaking is requested without a text-to-speech command.
pub fn resolve_config(options: &ResolveOptions, config_file: &ConfigFile) -> Result<ResolvedConfig> {
    let endpoint = options
        .endpoint
        .as_ref()
        .or(config_file.sched.endpoint.as_ref())
        .map_or(DEFAULT_ENDPOINT, String::as_str);
    validate_url(endpoint, "endpoint", &["http", "https"])?;

    let socket_url = options
        .socket_url
        .as_ref()
        .or(config_file.sched.socket_url.as_ref())
        .map_or(DEFAULT_SOCKET_URL, String::as_str);
    validate_url(socket_url, "socket_url", &["ws", "wss"])?;

    let tts_command = non_empty(&config_file.speech.tts_command);
    let stt_command = non_empty(&config_file.speech.stt_command);

    let speak_requested_by_cli = options.speak == Some(true);
    let speak = options
        .speak
        .or(config_file.sched.speak)
        .unwrap_or(false);

    if speak_requested_by_cli && tts_command.is_none() {
        bail!(
            "Cannot speak replies: no text-to-speech command configured\n\n\
             Add one to ~/.config/sched/config.toml:\n  \
             [speech]\n  \
             tts_command = [\"espeak\"]"
        );
    }

    Ok(ResolvedConfig {
        endpoint: endpoint.trim_end_matches('/').to_string(),
        socket_url: socket_url.to_string(),
        speak: speak && tts_command.is_some(),
        greeting: config_file.sched.greeting.unwrap_or(true),
        tts_command,
        stt_command,
        stt_timeout: Duration::from_secs(
            config_file
                .speech
                .stt_timeout_secs
                .unwrap_or(DEFAULT_STT_TIMEOUT_SECS),
        ),
    })
}

/// Checks that `value` parses as a URL with one of `schemes`.
pub fn validate_url(value: &str, key: &str, schemes: &[&str]) -> Result<()> {
    let url = Url::parse(value).with_context(|| format!("Invalid '{key}' URL: {value}"))?;
    if !schemes.contains(&url.scheme()) {
        bail!(
            "Invalid '{key}' URL: {value}\n\nExpected scheme: {}",
            schemes.join(" or ")
        );
    }
    Ok(())
}

fn non_empty(argv: &[String]) -> Option<Vec<String>> {
    (!argv.is_empty()).then(|| argv.to_vec())
}

/// Manages loading and saving the configuration file.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Configuration lives at `$XDG_CONFIG_HOME/sched/config.toml`
    /// or `~/.config/sched/config.toml`.
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_path: paths::config_dir()?.join("config.toml"),
        })
    }

    pub const fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub const fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    pub fn load(&self) -> Result<ConfigFile> {
        let contents = fs::read_to_string(&self.config_path).with_context(|| {
            format!("Failed to read config file: {}", self.config_path.display())
        })?;

        toml::from_str(&contents).with_context(|| {
            format!(
                "Failed to parse config file: {}",
                self.config_path.display()
            )
        })
    }

    /// Loads the file, or the defaults when it does not exist yet.
    ///
    /// A file that exists but does not parse is still an error.
    pub fn load_or_default(&self) -> Result<ConfigFile> {
        if self.config_path.exists() {
            self.load()
        } else {
            Ok(ConfigFile::default())
        }
    }

    pub fn save(&self, config: &ConfigFile) -> Result<()> {
        let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
        atomic_write(&self.config_path, &contents)
    }
}
