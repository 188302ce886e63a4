use anyhow::Result;

use crate::chat::ChatSession;
use crate::cli::ConnectionArgs;
use crate::config::{ConfigManager, ResolveOptions, ResolvedConfig, resolve_config};

pub struct ChatOptions {
    pub connection: ConnectionArgs,
}

pub async fn run_chat(options: ChatOptions) -> Result<()> {
    let config = load_resolved_config(&options.connection)?;
    let mut session = ChatSession::new(config);
    session.run().await
}

/// Merges CLI overrides with the config file.
pub fn load_resolved_config(connection: &ConnectionArgs) -> Result<ResolvedConfig> {
    let manager = ConfigManager::new()?;
    let file_config = manager.load_or_default()?;

    let options = ResolveOptions {
        endpoint: connection.endpoint.clone(),
        socket_url: connection.socket_url.clone(),
        speak: connection.speak_override(),
    };
    resolve_config(&options, &file_config)
}
