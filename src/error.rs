//! Error types for the chat client.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use chat_client::{ChatClient, Result};
//!
//! async fn example(client: &ChatClient) -> Result<()> {
//!     client.send("hello")?;
//!     client.force_reconnect()?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::InvalidUrl`] |
//! | Connection | [`Error::TransportOpen`], [`Error::ConnectionClosed`], [`Error::WebSocket`] |
//! | Client | [`Error::ClientStopped`] |
//! | Protocol | [`Error::MalformedPayload`] |
//! | External | [`Error::Io`] |
//!
//! None of these are fatal to the process. Transport failures surface to the
//! user as system records and status updates; the error values here are what
//! the transport and handle layers hand back to the connection manager.

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when client configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// The transport refused to create a handle.
    ///
    /// Synchronous failure of the open primitive. No automatic retry follows.
    #[error("Failed to open transport to {url}: {message}")]
    TransportOpen {
        /// Endpoint the open was attempted against.
        url: String,
        /// Description of the failure.
        message: String,
    },

    /// The transport handle has already closed.
    #[error("Connection closed")]
    ConnectionClosed,

    /// WebSocket protocol or socket failure.
    ///
    /// Reported to the user but never changes connection state by itself.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    // ========================================================================
    // Client Errors
    // ========================================================================
    /// The client event loop has terminated.
    #[error("Chat client stopped")]
    ClientStopped,

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Inbound frame did not match `{"sender": .., "message": ..}`.
    #[error("Malformed payload: {reason}")]
    MalformedPayload {
        /// Why parsing failed.
        reason: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a transport open failure.
    #[inline]
    pub fn transport_open(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransportOpen {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a malformed payload error.
    #[inline]
    pub fn malformed_payload(reason: impl Into<String>) -> Self {
        Self::MalformedPayload {
            reason: reason.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::TransportOpen { .. } | Self::ConnectionClosed | Self::WebSocket(_)
        )
    }

    /// Returns `true` if this is a configuration error.
    #[inline]
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::InvalidUrl(_))
    }

    /// Returns `true` if the automatic reconnection policy covers this error.
    ///
    /// Open failures are excluded: they are only retried by an explicit
    /// connect or force-reconnect.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ConnectionClosed | Self::WebSocket(_))
    }
}

// ============================================================================
// Tests
// ============================================================================
