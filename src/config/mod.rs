//! Configuration file management.

mod manager;

pub use manager::{
    ConfigFile, ConfigManager, DEFAULT_ENDPOINT, DEFAULT_SOCKET_URL, DEFAULT_STT_TIMEOUT_SECS,
    ResolveOptions, ResolvedConfig, SchedConfig, SpeechConfig, resolve_config, validate_url,
};
