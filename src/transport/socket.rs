//! WebSocket connection for the voice event channel.

use anyhow::{Context, Result};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, Stream, StreamExt};
use std::pin::Pin;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

use super::events::{ChannelEvent, ClientSignal, encode_signal, parse_frame};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Incoming side of the channel. Ends when the server closes the socket.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<ChannelEvent>> + Send>>;

/// Outgoing side of the channel.
pub struct EventChannel {
    sink: WsSink,
}

impl EventChannel {
    pub async fn send(&mut self, signal: ClientSignal) -> Result<()> {
        let frame = encode_signal(signal)?;
        debug!(%frame, "sending signal");
        self.sink
            .send(Message::Text(frame.into()))
            .await
            .context("Failed to send on voice channel")
    }

    pub async fn close(mut self) -> Result<()> {
        self.sink
            .close()
            .await
            .context("Failed to close voice channel")
    }
}

/// Opens the event channel at `url` (`ws://` or `wss://`).
pub async fn connect(url: &str) -> Result<(EventChannel, EventStream)> {
    let (ws_stream, _) = connect_async(url)
        .await
        .with_context(|| format!("Failed to connect to voice channel: {url}"))?;
    info!(%url, "voice channel connected");

    let (sink, read) = ws_stream.split();
    Ok((EventChannel { sink }, Box::pin(event_stream(read))))
}

/// Turns raw WebSocket messages into typed events.
///
/// Frames that do not parse are skipped; a transport error is yielded once
/// and ends the stream.
pub fn event_stream<S>(messages: S) -> impl Stream<Item = Result<ChannelEvent>> + Send
where
    S: Stream<Item = Result<Message, tungstenite::Error>> + Send + 'static,
{
    async_stream::stream! {
        let mut messages = std::pin::pin!(messages);

        while let Some(message) = messages.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    if let Some(event) = parse_frame(&text) {
                        yield Ok(event);
                    } else {
                        warn!(frame = %text, "skipping unrecognized voice channel frame");
                    }
                }
                Ok(Message::Close(_)) => {
                    info!("voice channel closed by server");
                    return;
                }
                Ok(_) => {}
                Err(e) => {
                    yield Err(anyhow::anyhow!("Voice channel error: {e}"));
                    return;
                }
            }
        }
    }
}
