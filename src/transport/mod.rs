//! Backend transports: the request/response turn endpoint and the
//! bidirectional voice event channel.

mod events;
mod http;
mod socket;

pub use events::{ChannelEvent, ClientSignal, VoiceStatus, encode_signal, parse_frame};
pub use http::{TurnClient, TurnReply, TurnRequest};
pub use socket::{EventChannel, EventStream, connect, event_stream};

use anyhow::Result;
use std::future::Future;

/// Something that can carry one chat turn to the assistant backend.
pub trait TurnEndpoint {
    /// Sends one turn and waits for the full reply.
    ///
    /// Any transport failure or non-success status is an `Err`.
    fn send_turn(&self, request: &TurnRequest) -> impl Future<Output = Result<TurnReply>>;
}
