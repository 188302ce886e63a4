use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "sched")]
#[command(about = "Chat with your smart scheduling assistant")]
#[command(version)]
pub struct Args {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Suppress status messages and spinners
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Backend connection overrides shared by the chat entry points.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Base URL of the assistant's turn endpoint
    #[arg(short = 'e', long)]
    pub endpoint: Option<String>,

    /// WebSocket URL of the voice event channel
    #[arg(short = 's', long)]
    pub socket_url: Option<String>,

    /// Speak assistant replies aloud
    #[arg(long, overrides_with = "no_speak")]
    pub speak: bool,

    /// Do not speak assistant replies
    #[arg(long, overrides_with = "speak")]
    pub no_speak: bool,
}

impl ConnectionArgs {
    /// `Some` only when one of the speak flags was given.
    pub const fn speak_override(&self) -> Option<bool> {
        match (self.speak, self.no_speak) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    /// Fills in anything not given here from `fallback`.
    #[must_use]
    pub fn or(self, fallback: Self) -> Self {
        let speak_given = self.speak || self.no_speak;
        Self {
            endpoint: self.endpoint.or(fallback.endpoint),
            socket_url: self.socket_url.or(fallback.socket_url),
            speak: if speak_given { self.speak } else { fallback.speak },
            no_speak: if speak_given {
                self.no_speak
            } else {
                fallback.no_speak
            },
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start an interactive chat (the default)
    Chat {
        #[command(flatten)]
        connection: ConnectionArgs,
    },
    /// Send a single message and print the reply
    Ask {
        /// Message to send (reads from stdin if not provided)
        text: Option<String>,

        /// Continue an existing session
        #[arg(long)]
        session: Option<String>,

        /// Also print the assistant's thoughts
        #[arg(long)]
        thoughts: bool,

        /// Base URL of the assistant's turn endpoint
        #[arg(short = 'e', long)]
        endpoint: Option<String>,
    },
    /// Configure sched settings
    Configure {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}
