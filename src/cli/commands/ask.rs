use anyhow::{Result, bail};

use crate::chat::{APOLOGY, ChatClient, TurnOutcome};
use crate::cli::ConnectionArgs;
use crate::input::InputReader;
use crate::status;
use crate::transport::TurnClient;
use crate::ui::{Spinner, Style};

use super::chat::load_resolved_config;

pub struct AskOptions {
    pub text: Option<String>,
    pub session: Option<String>,
    pub thoughts: bool,
    pub endpoint: Option<String>,
}

/// Sends one message over the turn endpoint and prints the reply to stdout.
///
/// The session id goes to stderr so it can be passed back with `--session`.
pub async fn run_ask(options: AskOptions) -> Result<()> {
    let connection = ConnectionArgs {
        endpoint: options.endpoint,
        ..ConnectionArgs::default()
    };
    let config = load_resolved_config(&connection)?;

    let message = InputReader::read_message(options.text)?;
    if message.trim().is_empty() {
        bail!("Error: Message is empty");
    }

    let mut client =
        ChatClient::new(TurnClient::new(&config.endpoint), ()).with_session(options.session);

    let outcome = {
        let _spinner = Spinner::new("Thinking...");
        client.submit(&message).await
    };

    match outcome {
        TurnOutcome::Replied { entry } => {
            let Some(reply) = client.transcript().get(entry) else {
                bail!("Reply disappeared from the transcript");
            };
            if options.thoughts
                && let Some(thoughts) = reply.thoughts()
            {
                for (i, step) in thoughts.steps().iter().enumerate() {
                    eprintln!("{} {step}", Style::thought(format!("Thought {}:", i + 1)));
                }
            }
            if let Some(message) = reply.message() {
                println!("{}", message.content());
            }
            if let Some(id) = client.session_id() {
                status!("{} {}", Style::label("session"), Style::value(id));
            }
            Ok(())
        }
        TurnOutcome::Failed { .. } => bail!(APOLOGY),
        TurnOutcome::Ignored | TurnOutcome::Rejected => bail!("Error: Message was not sent"),
    }
}
