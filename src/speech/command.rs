use anyhow::{Context, Result, bail};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use super::{Recognizer, Speaker};

/// Speaks by running a command with the text as its last argument,
/// e.g. `["espeak"]` or `["say", "-v", "Samantha"]`.
pub struct CommandSpeaker {
    program: String,
    args: Vec<String>,
    current: Option<Child>,
}

impl CommandSpeaker {
    /// `None` when `argv` is empty.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            current: None,
        })
    }
}

impl Speaker for CommandSpeaker {
    fn speak(&mut self, text: &str) {
        self.cancel();

        let spawned = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();

        match spawned {
            Ok(child) => self.current = Some(child),
            Err(e) => warn!(program = %self.program, error = %e, "failed to start speech output"),
        }
    }

    fn cancel(&mut self) {
        if let Some(mut child) = self.current.take()
            && let Err(e) = child.start_kill()
        {
            debug!(error = %e, "previous utterance already finished");
        }
    }
}

impl Drop for CommandSpeaker {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Captures one utterance by running a command that prints the transcript
/// on stdout and exits.
pub struct CommandRecognizer {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandRecognizer {
    /// `None` when `argv` is empty.
    pub fn from_argv(argv: &[String], timeout: Duration) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            timeout,
        })
    }
}

impl Recognizer for CommandRecognizer {
    async fn listen(&mut self) -> Result<Option<String>> {
        let run = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output();

        let Ok(output) = tokio::time::timeout(self.timeout, run).await else {
            debug!(timeout = ?self.timeout, "speech capture timed out");
            return Ok(None);
        };
        let output =
            output.with_context(|| format!("Failed to run speech command: {}", self.program))?;

        if !output.status.success() {
            bail!("Speech command exited with {}", output.status);
        }

        let transcript = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((!transcript.is_empty()).then_some(transcript))
    }
}
