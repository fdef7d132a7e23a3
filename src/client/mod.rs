//! Chat client module.
//!
//! This module owns the connection lifecycle: connecting, registering,
//! reconnecting on loss and routing inbound frames to the presentation sink.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ChatClient`] | Cloneable handle to the running event loop |
//! | [`ClientBuilder`] | Fluent configuration builder |
//! | [`ConnectionManager`] | Connection state machine |
//! | [`ReconnectPolicy`] | Bounded fixed-delay retry policy |
//! | [`PresentationSink`] | Where records and status updates go |
//!
//! # Example
//!
//! ```no_run
//! use chat_client::{ChatClient, ClientEvent, Result};
//!
//! # async fn example() -> Result<()> {
//! let (client, mut events) = ChatClient::builder()
//!     .page_url("http://localhost/")
//!     .start()?;
//!
//! while let Some(event) = events.recv().await {
//!     match event {
//!         ClientEvent::Record(record) => println!("{}", record.text),
//!         ClientEvent::Status(update) => println!("-- {}", update.text),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder pattern for client configuration.
pub mod builder;

/// Validated configuration and endpoint derivation.
pub mod config;

/// Client handle and event loop.
pub mod core;

/// Connection state machine.
pub mod manager;

/// Reconnection policy and retry scheduling.
pub mod retry;

/// Presentation sink boundary.
pub mod sink;

/// Connection state and status text.
pub mod state;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::ClientBuilder;
pub use config::{ClientConfig, DEFAULT_PORT, endpoint_for};
pub use core::ChatClient;
pub use manager::{
    ConnectionManager, MSG_CONNECTED, MSG_DISCONNECTED, MSG_ERROR, MSG_OPEN_FAILED, ManagerParts,
};
pub use retry::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_RECONNECT_INTERVAL, ReconnectPolicy, ScheduledRetry, Scheduler,
    TokioScheduler,
};
pub use sink::{ChannelSink, ClientEvent, PresentationSink};
pub use state::{
    ConnectionState, STATUS_CONNECTED, STATUS_CONNECTING, STATUS_DISCONNECTED, STATUS_FAILED,
    StatusUpdate,
};
