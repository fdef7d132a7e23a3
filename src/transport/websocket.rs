//! WebSocket client transport.
//!
//! Each handle owns one spawned socket task. The task connects, reports
//! [`TransportEvent::Opened`], then multiplexes inbound frames and queued
//! outbound frames until either side closes. Whatever ends the task, the last
//! thing it reports is [`TransportEvent::Closed`].
//!
//! # Socket Task
//!
//! ```text
//! connect_async ──fail──────────────► Error, Closed
//!      │        ──Close / drop─────► Closed (handshake abandoned)
//!      │        ──Send(text)───────► queued until open
//!      ▼
//!   Opened ──► loop { inbound Text  → Message
//!                     inbound Close → break
//!                     read error    → Error, break
//!                     Send(text)    → write frame
//!                     Close / drop  → close socket, break }
//!      │
//!      ▼
//!   Closed
//! ```

// ============================================================================
// Imports
// ============================================================================

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, trace, warn};
use url::Url;

use crate::error::{Error, Result};

use super::{EventSender, Transport, TransportEvent, TransportHandle};

// ============================================================================
// Types
// ============================================================================

/// Client socket as returned by `connect_async`.
type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ============================================================================
// SocketCommand
// ============================================================================

/// Internal commands for the socket task.
enum SocketCommand {
    /// Write a text frame.
    Send(String),
    /// Close the socket.
    Close,
}

// ============================================================================
// WebSocketTransport
// ============================================================================

/// Opens WebSocket connections on the current tokio runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebSocketTransport;

impl WebSocketTransport {
    /// Creates a new transport.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Transport for WebSocketTransport {
    fn open(&mut self, url: &Url, events: EventSender) -> Result<Box<dyn TransportHandle>> {
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(Error::transport_open(
                url.as_str(),
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        let runtime = Handle::try_current()
            .map_err(|e| Error::transport_open(url.as_str(), e.to_string()))?;

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let generation = events.generation();

        runtime.spawn(run_socket(url.clone(), command_rx, events));

        debug!(%url, %generation, "WebSocket handle created");

        Ok(Box::new(WebSocketHandle { command_tx }))
    }
}

// ============================================================================
// WebSocketHandle
// ============================================================================

/// Handle to one socket task.
///
/// Dropping the handle closes the socket.
#[derive(Debug)]
pub struct WebSocketHandle {
    /// Channel for sending commands to the socket task.
    command_tx: mpsc::UnboundedSender<SocketCommand>,
}

impl TransportHandle for WebSocketHandle {
    fn send(&mut self, text: &str) -> Result<()> {
        self.command_tx
            .send(SocketCommand::Send(text.to_string()))
            .map_err(|_| Error::ConnectionClosed)
    }

    fn close(&mut self) {
        let _ = self.command_tx.send(SocketCommand::Close);
    }
}

// ============================================================================
// Socket Task
// ============================================================================

/// Connects and pumps frames until the socket ends.
async fn run_socket(
    url: Url,
    mut command_rx: mpsc::UnboundedReceiver<SocketCommand>,
    events: EventSender,
) {
    let generation = events.generation();

    let Some((ws_stream, queued)) = connect(&url, &mut command_rx, &events).await else {
        events.emit(TransportEvent::Closed);
        debug!(%generation, "Socket task terminated before open");
        return;
    };

    debug!(%url, %generation, "WebSocket connected");
    events.emit(TransportEvent::Opened);

    let (mut ws_write, mut ws_read) = ws_stream.split();

    // Frames queued while the handshake was running go out first
    for text in queued {
        if let Err(e) = ws_write.send(Message::Text(text.into())).await {
            warn!(%generation, error = %e, "Failed to send queued frame");
            events.emit(TransportEvent::Error(Error::from(e).to_string()));
            events.emit(TransportEvent::Closed);
            return;
        }
    }

    loop {
        tokio::select! {
            // Incoming frames from the server
            message = ws_read.next() => {
                match message {
                    Some(Ok(Message::Text(text))) => {
                        trace!(%generation, len = text.len(), "Frame received");
                        if !events.emit(TransportEvent::Message(text.as_str().to_owned())) {
                            debug!(%generation, "Event loop gone, dropping socket");
                            break;
                        }
                    }

                    Some(Ok(Message::Close(frame))) => {
                        debug!(%generation, ?frame, "WebSocket closed by remote");
                        break;
                    }

                    Some(Err(e)) => {
                        error!(%generation, error = %e, "WebSocket error");
                        events.emit(TransportEvent::Error(Error::from(e).to_string()));
                        break;
                    }

                    None => {
                        debug!(%generation, "WebSocket stream ended");
                        break;
                    }

                    // Ignore Binary, Ping, Pong
                    _ => {}
                }
            }

            // Commands from the handle
            command = command_rx.recv() => {
                match command {
                    Some(SocketCommand::Send(text)) => {
                        if let Err(e) = ws_write.send(Message::Text(text.into())).await {
                            warn!(%generation, error = %e, "Failed to send frame");
                            events.emit(TransportEvent::Error(Error::from(e).to_string()));
                            break;
                        }
                    }

                    Some(SocketCommand::Close) | None => {
                        debug!(%generation, "Closing WebSocket");
                        let _ = ws_write.close().await;
                        break;
                    }
                }
            }
        }
    }

    events.emit(TransportEvent::Closed);
    debug!(%generation, "Socket task terminated");
}

/// Runs the handshake while watching the command channel.
///
/// Returns `None` if the handshake failed or the handle asked to close before
/// it finished; the partial connection is dropped without an upgrade. Frames
/// sent meanwhile are returned in order.
async fn connect(
    url: &Url,
    command_rx: &mut mpsc::UnboundedReceiver<SocketCommand>,
    events: &EventSender,
) -> Option<(WsStream, Vec<String>)> {
    let generation = events.generation();
    let mut queued = Vec::new();

    let handshake = connect_async(url.as_str());
    tokio::pin!(handshake);

    loop {
        tokio::select! {
            result = &mut handshake => {
                return match result {
                    Ok((stream, _response)) => Some((stream, queued)),
                    Err(e) => {
                        warn!(%url, %generation, error = %e, "WebSocket connect failed");
                        events.emit(TransportEvent::Error(Error::from(e).to_string()));
                        None
                    }
                };
            }

            command = command_rx.recv() => {
                match command {
                    Some(SocketCommand::Send(text)) => {
                        trace!(%generation, "Queueing frame until open");
                        queued.push(text);
                    }

                    Some(SocketCommand::Close) | None => {
                        debug!(%url, %generation, "Close requested while connecting, abandoning handshake");
                        return None;
                    }
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
