use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sched_cli::cli::commands::{ask, chat, configure};
use sched_cli::cli::{Args, Command};
use sched_cli::output::{self, OutputConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    output::init(OutputConfig::from_flags(args.quiet, args.no_color));
    init_tracing();

    match args.command {
        Some(Command::Chat { connection }) => {
            let options = chat::ChatOptions {
                connection: connection.or(args.connection),
            };
            chat::run_chat(options).await?;
        }
        Some(Command::Ask {
            text,
            session,
            thoughts,
            endpoint,
        }) => {
            let options = ask::AskOptions {
                text,
                session,
                thoughts,
                endpoint: endpoint.or(args.connection.endpoint),
            };
            ask::run_ask(options).await?;
        }
        Some(Command::Configure { show }) => {
            configure::run_configure(show)?;
        }
        None => {
            let options = chat::ChatOptions {
                connection: args.connection,
            };
            chat::run_chat(options).await?;
        }
    }

    Ok(())
}

/// Diagnostic logs go to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!output::is_no_color())
        .with_target(false)
        .init();
}
