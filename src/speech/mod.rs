//! Optional speech I/O: spoken replies and push-to-talk capture.
//!
//! Both directions are backed by external commands from the config file.
//! When a command is not configured the capability is simply absent and
//! the chat works text-only.

mod command;

pub use command::{CommandRecognizer, CommandSpeaker};

use anyhow::Result;
use std::future::Future;
use tracing::{debug, warn};

/// Text-to-speech output.
pub trait Speaker {
    /// Speaks `text`, cancelling any utterance still playing.
    fn speak(&mut self, text: &str);

    /// Stops the current utterance, if any.
    fn cancel(&mut self);
}

/// Speech-to-text capture of a single utterance.
pub trait Recognizer {
    /// Listens for one utterance.
    ///
    /// `Ok(None)` means nothing was heard before the silence timeout.
    fn listen(&mut self) -> impl Future<Output = Result<Option<String>>>;
}

/// Runs one capture session and returns the transcript to submit, if any.
///
/// Success, silence and failure all end the session the same way; failures
/// are logged and never surfaced to the user.
pub async fn capture<R: Recognizer>(recognizer: &mut R) -> Option<String> {
    match recognizer.listen().await {
        Ok(Some(transcript)) if !transcript.trim().is_empty() => {
            debug!(%transcript, "speech captured");
            Some(transcript.trim().to_string())
        }
        Ok(_) => {
            debug!("no speech captured");
            None
        }
        Err(e) => {
            warn!(error = %e, "speech capture failed");
            None
        }
    }
}
