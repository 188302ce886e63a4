use anyhow::Result;
use futures_util::{FutureExt, StreamExt};
use inquire::Text;
use inquire::ui::{Attributes, Color, RenderConfig, StyleSheet, Styled};
use tracing::{info, warn};

use super::client::{ChatClient, Dispatched, TurnOutcome, VoiceMode};
use super::command::{Input, SlashCommand, SlashCommandCompleter, parse_input};
use super::ui::{self, TerminalSink};
use crate::config::ResolvedConfig;
use crate::speech::{self, CommandRecognizer, CommandSpeaker};
use crate::status;
use crate::transport::{self, ClientSignal, EventChannel, EventStream, TurnClient};
use crate::ui::{Spinner, Style};

/// An interactive chat session with the scheduling assistant.
///
/// Typed messages go to the turn endpoint. `/voice` hands the conversation
/// to the backend's voice loop over the event channel until Enter is pressed.
pub struct ChatSession {
    config: ResolvedConfig,
    client: ChatClient<TurnClient, TerminalSink>,
    recognizer: Option<CommandRecognizer>,
    channel: Option<(EventChannel, EventStream)>,
}

impl ChatSession {
    pub fn new(config: ResolvedConfig) -> Self {
        let mut client = ChatClient::new(TurnClient::new(&config.endpoint), TerminalSink::new());
        if config.speak
            && let Some(speaker) = config
                .tts_command
                .as_deref()
                .and_then(CommandSpeaker::from_argv)
        {
            client = client.with_speaker(Box::new(speaker));
        }
        let recognizer = config
            .stt_command
            .as_deref()
            .and_then(|argv| CommandRecognizer::from_argv(argv, config.stt_timeout));

        Self {
            config,
            client,
            recognizer,
            channel: None,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        ui::print_header();
        if self.config.greeting {
            self.client.greet();
        }

        let prompt_style = Styled::new("❯")
            .with_fg(Color::LightBlue)
            .with_attr(Attributes::BOLD);
        let mut render_config = RenderConfig::default()
            .with_prompt_prefix(prompt_style)
            .with_answered_prompt_prefix(prompt_style);
        render_config.option = StyleSheet::new().with_fg(Color::Grey);
        render_config.selected_option = Some(StyleSheet::new().with_fg(Color::DarkMagenta));

        let mic_enabled = self.recognizer.is_some();

        loop {
            self.drain_events().await;

            let input = Text::new("")
                .with_render_config(render_config)
                .with_autocomplete(SlashCommandCompleter::new(mic_enabled))
                .with_help_message("Ask me to schedule something, /help for commands, Ctrl+C to quit")
                .prompt();

            match input {
                Ok(line) => match parse_input(&line) {
                    Input::Empty => {}
                    Input::Command(cmd) => {
                        if !self.handle_command(cmd).await {
                            break;
                        }
                    }
                    Input::Text(text) => self.submit(&text).await,
                },
                Err(
                    inquire::InquireError::OperationCanceled
                    | inquire::InquireError::OperationInterrupted,
                ) => {
                    println!();
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        }

        if let Some((channel, _)) = self.channel.take()
            && let Err(e) = channel.close().await
        {
            warn!(error = %e, "voice channel did not close cleanly");
        }
        ui::print_goodbye();
        Ok(())
    }

    async fn submit(&mut self, text: &str) {
        if self.client.submit(text).await == TurnOutcome::Rejected {
            ui::print_error("Text input is disabled while voice mode is active.");
        }
    }

    async fn handle_command(&mut self, cmd: SlashCommand) -> bool {
        match cmd {
            SlashCommand::Config => ui::print_config(&self.config, self.client.session_id()),
            SlashCommand::Help => ui::print_help(self.recognizer.is_some()),
            SlashCommand::Session => ui::print_session(self.client.session_id()),
            SlashCommand::Thoughts(n) => {
                if self.client.toggle_thoughts(n).is_none() {
                    ui::print_error("No thoughts to show.");
                }
            }
            SlashCommand::Mic if self.recognizer.is_some() => self.push_to_talk().await,
            SlashCommand::Voice => self.run_voice().await,
            SlashCommand::Quit => return false,
            SlashCommand::Mic => ui::print_error("Unknown command: /mic"),
            SlashCommand::Unknown(cmd) => ui::print_error(&format!("Unknown command: /{cmd}")),
        }
        true
    }

    async fn push_to_talk(&mut self) {
        let Some(recognizer) = self.recognizer.as_mut() else {
            return;
        };
        let transcript = {
            let _listening = Spinner::new("Listening...");
            speech::capture(recognizer).await
        };
        if let Some(text) = transcript {
            self.submit(&text).await;
        }
    }

    /// Voice mode: relay channel events until the user presses Enter.
    async fn run_voice(&mut self) {
        if self.channel.is_none() {
            status!("Connecting to {}...", Style::secondary(&self.config.socket_url));
            match transport::connect(&self.config.socket_url).await {
                Ok(channel) => self.channel = Some(channel),
                Err(e) => {
                    ui::print_error(&format!("{e:#}"));
                    return;
                }
            }
        }
        let Some((channel, events)) = self.channel.as_mut() else {
            return;
        };

        let signal = self.client.enter_voice();
        if let Err(e) = channel.send(signal).await {
            ui::print_error(&format!("{e:#}"));
            self.drop_channel();
            return;
        }
        ui::print_voice_mode(VoiceMode::Listening);

        let mut enter = tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            std::io::stdin().read_line(&mut line).map(|_| ())
        });

        let mut channel_open = true;
        loop {
            tokio::select! {
                _ = &mut enter => break,
                event = events.next() => match event {
                    Some(Ok(event)) => {
                        if let Dispatched::VoiceStatus(mode) = self.client.dispatch(event) {
                            ui::print_voice_mode(mode);
                        }
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "voice channel failed");
                        channel_open = false;
                        break;
                    }
                    None => {
                        info!("voice channel ended");
                        channel_open = false;
                        break;
                    }
                },
            }
        }

        if channel_open {
            let signal = self.client.leave_voice();
            if let Err(e) = channel.send(signal).await {
                warn!(error = %e, "failed to send stop signal");
            }
        } else {
            self.drop_channel();
            ui::print_error("Voice channel closed. Press Enter to return to text mode.");
            let _ = enter.await;
        }
        status!("{}", Style::hint("Back to text mode."));
    }

    /// Applies events that arrived while the prompt was showing.
    ///
    /// Outside the voice loop the client stays in text mode: a late
    /// `started` status is answered with a stop signal.
    async fn drain_events(&mut self) {
        let Some((channel, events)) = self.channel.as_mut() else {
            return;
        };
        let mut closed = false;
        while let Some(next) = events.next().now_or_never() {
            match next {
                Some(Ok(event)) => {
                    self.client.dispatch(event);
                }
                Some(Err(e)) => {
                    warn!(error = %e, "voice channel failed");
                    closed = true;
                    break;
                }
                None => {
                    closed = true;
                    break;
                }
            }
        }

        if closed {
            self.drop_channel();
        } else if self.client.voice_mode().is_listening() {
            let signal = self.client.leave_voice();
            if let Err(e) = channel.send(signal).await {
                warn!(error = %e, "failed to send stop signal");
                self.drop_channel();
            }
        }
    }

    /// Forgets the channel and everything that was waiting on it.
    fn drop_channel(&mut self) {
        self.channel = None;
        self.client.reset_voice();
    }
}
