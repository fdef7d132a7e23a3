//! Presentation sink boundary.
//!
//! The connection manager never draws anything itself. It hands
//! [`DisplayRecord`]s and [`StatusUpdate`]s, in arrival order, to a
//! [`PresentationSink`].

// ============================================================================
// Imports
// ============================================================================

use tokio::sync::mpsc;
use tracing::trace;

use crate::protocol::DisplayRecord;

use super::state::StatusUpdate;

// ============================================================================
// PresentationSink
// ============================================================================

/// Receives everything the user should see.
pub trait PresentationSink: Send {
    /// Shows one message line.
    fn display(&mut self, record: DisplayRecord);

    /// Reflects a connection state change.
    fn status(&mut self, update: StatusUpdate);
}

// ============================================================================
// ClientEvent
// ============================================================================

/// Item of the event stream returned by
/// [`ClientBuilder::start`](super::ClientBuilder::start).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// A message line.
    Record(DisplayRecord),
    /// A connection state change.
    Status(StatusUpdate),
}

// ============================================================================
// ChannelSink
// ============================================================================

/// Forwards sink calls over an unbounded channel.
///
/// Unbounded so that no record is ever dropped or reordered.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    /// Event stream sender.
    tx: mpsc::UnboundedSender<ClientEvent>,
}

impl ChannelSink {
    /// Creates a sink and the receiving end of its event stream.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ClientEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn forward(&self, event: ClientEvent) {
        if self.tx.send(event).is_err() {
            trace!("Event receiver dropped");
        }
    }
}

impl PresentationSink for ChannelSink {
    fn display(&mut self, record: DisplayRecord) {
        self.forward(ClientEvent::Record(record));
    }

    fn status(&mut self, update: StatusUpdate) {
        self.forward(ClientEvent::Status(update));
    }
}

// ============================================================================
// Tests
// ============================================================================
