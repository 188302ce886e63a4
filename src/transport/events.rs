//! Wire protocol of the voice event channel.
//!
//! Every frame is a JSON text message of the form
//! `{"event": "<name>", "data": {...}}`. Client signals carry no data.

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Whether server-side voice capture is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceStatus {
    Started,
    Stopped,
}

/// Events pushed by the backend while voice mode is in use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ChannelEvent {
    /// The user's utterance has been recognized.
    #[serde(rename = "user_transcript")]
    TranscriptReady { transcript: String },
    /// Reasoning steps for the reply being prepared.
    #[serde(rename = "agent_thoughts")]
    ThoughtsReady { thoughts: Vec<String> },
    /// The assistant's reply.
    #[serde(rename = "agent_response")]
    ResponseReady { response: String },
    #[serde(rename = "voice_status")]
    StatusChanged { status: VoiceStatus },
}

/// Signals the client sends upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientSignal {
    StartVoice,
    StopVoice,
}

/// Parses one text frame. Unknown events and malformed JSON yield `None`.
pub fn parse_frame(text: &str) -> Option<ChannelEvent> {
    serde_json::from_str(text).ok()
}

pub fn encode_signal(signal: ClientSignal) -> Result<String> {
    Ok(serde_json::to_string(&signal)?)
}
