//! Transport layer.
//!
//! The connection manager talks to the network through the [`Transport`]
//! capability so the lifecycle logic can be driven without a live socket.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐   open(url, EventSender)   ┌──────────────────┐
//! │  ConnectionManager   │───────────────────────────►│    Transport     │
//! │                      │◄── TransportNotice ────────│  (socket task)   │
//! │  live: Generation N  │    {generation, event}     │                  │
//! └──────────────────────┘                            └──────────────────┘
//! ```
//!
//! # Handle Lifecycle
//!
//! 1. `Transport::open` - create a handle tagged with a fresh [`Generation`]
//! 2. [`TransportEvent::Opened`] - socket is ready for frames
//! 3. [`TransportEvent::Message`] / [`TransportEvent::Error`] - any number
//! 4. [`TransportEvent::Closed`] - always the last notice of a handle
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `websocket` | tokio-tungstenite client transport |

// ============================================================================
// Imports
// ============================================================================

use tokio::sync::mpsc;
use url::Url;

use crate::error::Result;
use crate::identifiers::Generation;

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket client transport.
pub mod websocket;

// ============================================================================
// Re-exports
// ============================================================================

pub use websocket::{WebSocketHandle, WebSocketTransport};

// ============================================================================
// TransportEvent
// ============================================================================

/// Lifecycle signal emitted by a transport handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The connection is established.
    Opened,
    /// The connection is gone. No further notices follow for this handle.
    Closed,
    /// Non-terminal failure report.
    Error(String),
    /// Inbound text frame.
    Message(String),
}

/// A [`TransportEvent`] tagged with the handle that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportNotice {
    /// Handle generation.
    pub generation: Generation,
    /// The event.
    pub event: TransportEvent,
}

// ============================================================================
// EventSender
// ============================================================================

/// Channel end a transport handle reports through.
///
/// Stamps every event with the generation it was created for.
#[derive(Debug, Clone)]
pub struct EventSender {
    /// Generation of the owning handle.
    generation: Generation,
    /// Notice channel into the client event loop.
    tx: mpsc::UnboundedSender<TransportNotice>,
}

impl EventSender {
    /// Creates a sender for `generation`.
    #[inline]
    #[must_use]
    pub fn new(generation: Generation, tx: mpsc::UnboundedSender<TransportNotice>) -> Self {
        Self { generation, tx }
    }

    /// Returns the generation events are stamped with.
    #[inline]
    #[must_use]
    pub const fn generation(&self) -> Generation {
        self.generation
    }

    /// Emits an event. Returns `false` if the event loop is gone.
    pub fn emit(&self, event: TransportEvent) -> bool {
        self.tx
            .send(TransportNotice {
                generation: self.generation,
                event,
            })
            .is_ok()
    }
}

// ============================================================================
// Transport Traits
// ============================================================================

/// Factory for transport handles.
pub trait Transport: Send {
    /// Opens a handle to `url`.
    ///
    /// Completion is reported asynchronously through `events`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TransportOpen`](crate::Error::TransportOpen) when the
    /// handle cannot even be created. No events are emitted in that case.
    fn open(&mut self, url: &Url, events: EventSender) -> Result<Box<dyn TransportHandle>>;
}

/// A live transport handle.
pub trait TransportHandle: Send {
    /// Queues a text frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`](crate::Error::ConnectionClosed) if
    /// the handle has already shut down.
    fn send(&mut self, text: &str) -> Result<()>;

    /// Starts closing the handle. Idempotent.
    fn close(&mut self);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_sender_stamps_generation() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sender = EventSender::new(Generation::new(4), tx);

        assert!(sender.emit(TransportEvent::Opened));
        let notice = rx.try_recv().unwrap();
        assert_eq!(notice.generation, Generation::new(4));
        assert_eq!(notice.event, TransportEvent::Opened);
    }

    #[test]
    fn test_event_sender_reports_dropped_loop() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let sender = EventSender::new(Generation::default(), tx);
        assert!(!sender.emit(TransportEvent::Closed));
    }
}
