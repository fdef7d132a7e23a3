//! Connection state and status reporting.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::Serialize;

// ============================================================================
// Status Text
// ============================================================================

/// Status shown while a handle is opening.
pub const STATUS_CONNECTING: &str = "Connecting...";

/// Status shown once the handle is open.
pub const STATUS_CONNECTED: &str = "Connected";

/// Status shown after the handle closed.
pub const STATUS_DISCONNECTED: &str = "Disconnected";

/// Status shown when the transport refused to open a handle.
pub const STATUS_FAILED: &str = "Connection Failed";

// ============================================================================
// ConnectionState
// ============================================================================

/// Lifecycle state of the chat connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// No live handle.
    #[default]
    Disconnected,
    /// A handle is opening.
    Connecting,
    /// The handle is open and registered.
    Connected,
}

impl ConnectionState {
    /// Returns `true` when sends are permitted.
    #[inline]
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Returns the lowercase name used for styling hooks.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// StatusUpdate
// ============================================================================

/// A state change as delivered to the presentation sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    /// New state.
    pub state: ConnectionState,

    /// Human-readable status line.
    pub text: String,
}

impl StatusUpdate {
    /// Creates a status update.
    #[inline]
    #[must_use]
    pub fn new(state: ConnectionState, text: impl Into<String>) -> Self {
        Self {
            state,
            text: text.into(),
        }
    }

    /// Returns `true` if the send affordance should be enabled.
    #[inline]
    #[must_use]
    pub const fn input_enabled(&self) -> bool {
        self.state.is_connected()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_disconnected() {
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_input_enabled_only_when_connected() {
        assert!(StatusUpdate::new(ConnectionState::Connected, STATUS_CONNECTED).input_enabled());
        assert!(!StatusUpdate::new(ConnectionState::Connecting, STATUS_CONNECTING).input_enabled());
        assert!(!StatusUpdate::new(ConnectionState::Disconnected, STATUS_FAILED).input_enabled());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ConnectionState::Connecting.to_string(), "connecting");
    }
}
