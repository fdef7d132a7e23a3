//! Chat Client - Reconnecting WebSocket chat client library.
//!
//! This library connects to a line-oriented chat server over WebSocket,
//! registers a display name, renders inbound messages and keeps the
//! connection alive across drops.
//!
//! # Architecture
//!
//! The client is a single event loop around a connection state machine:
//!
//! - **Transport**: Opens sockets, reports `Opened`/`Message`/`Error`/`Closed`
//! - **Manager**: Owns the live handle, registration and bounded reconnects
//! - **Router**: Turns each inbound frame into one display record
//! - **Sink**: Receives records and status updates in arrival order
//!
//! Key design principles:
//!
//! - Every handle is tagged with a [`Generation`]; notices from old handles
//!   are dropped
//! - At most one reconnect is pending; a newer connect cancels it
//! - Malformed frames are shown verbatim, never dropped
//!
//! # Quick Start
//!
//! ```no_run
//! use chat_client::{ChatClient, ClientEvent, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let (client, mut events) = ChatClient::builder()
//!         .page_url("http://localhost/")
//!         .display_name("Alice")
//!         .start()?;
//!
//!     client.send("hello everyone")?;
//!
//!     while let Some(event) = events.recv().await {
//!         if let ClientEvent::Record(record) = event {
//!             println!("[{}] {}", record.time_label(), record.text);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | [`ChatClient`], [`ClientBuilder`], [`ConnectionManager`] |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Handle generations and retry tickets |
//! | [`protocol`] | Inbound frames and display records |
//! | [`router`] | Message classification and rendering |
//! | [`session`] | Display name resolution and attempt counting |
//! | [`transport`] | Transport capability and WebSocket implementation |

// ============================================================================
// Modules
// ============================================================================

/// Chat client: handle, builder and connection state machine.
///
/// Use [`ChatClient::builder()`] to configure and start a client.
pub mod client;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for handles and retries.
///
/// Newtype wrappers prevent mixing a generation with a retry ticket.
pub mod identifiers;

/// Chat protocol message types.
pub mod protocol;

/// Message classification and rendering.
pub mod router;

/// Per-page chat identity.
pub mod session;

/// Transport layer.
///
/// Internal module handling WebSocket connections.
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Re-exports
// ============================================================================

// Client types
pub use client::{
    ChannelSink, ChatClient, ClientBuilder, ClientConfig, ClientEvent, ConnectionManager,
    ConnectionState, ManagerParts, PresentationSink, ReconnectPolicy, StatusUpdate,
};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{Generation, RetryTicket};

// Protocol types
pub use protocol::{Category, DisplayRecord, InboundEvent};

// Router
pub use router::MessageRouter;

// Session types
pub use session::{IdentityProvider, Session, StaticIdentity};

// Transport types
pub use transport::{Transport, TransportEvent, TransportHandle, WebSocketTransport};
