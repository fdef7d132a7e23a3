//! Inbound wire payload.
//!
//! The server wraps every broadcast in a small JSON object:
//!
//! ```json
//! { "sender": "Alice", "message": "hi" }
//! ```
//!
//! Messages originated by the server itself use the reserved sender
//! [`SERVER_SENDER`].

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Value, from_str, from_value};

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Sender value the server uses for its own announcements.
pub const SERVER_SENDER: &str = "Server";

// ============================================================================
// InboundEvent
// ============================================================================

/// A chat message received from the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Display name of the author, or [`SERVER_SENDER`].
    pub sender: String,

    /// Message body.
    pub message: String,
}

impl InboundEvent {
    /// Creates a new inbound event.
    #[inline]
    #[must_use]
    pub fn new(sender: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            message: message.into(),
        }
    }

    /// Parses a raw text frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedPayload`] when the frame is not a JSON
    /// object with string `sender` and `message` fields.
    pub fn parse(frame: &str) -> Result<Self> {
        let value: Value = from_str(frame).map_err(|e| Error::malformed_payload(e.to_string()))?;
        if !value.is_object() {
            return Err(Error::malformed_payload("expected a JSON object"));
        }
        from_value(value).map_err(|e| Error::malformed_payload(e.to_string()))
    }

    /// Returns `true` if the server authored this event.
    #[inline]
    #[must_use]
    pub fn is_from_server(&self) -> bool {
        self.sender == SERVER_SENDER
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed() {
        let event = InboundEvent::parse(r#"{"sender":"Bob","message":"hi"}"#).unwrap();
        assert_eq!(event, InboundEvent::new("Bob", "hi"));
        assert!(!event.is_from_server());
    }

    #[test]
    fn test_parse_server_message() {
        let event = InboundEvent::parse(r#"{"sender":"Server","message":"Welcome"}"#).unwrap();
        assert!(event.is_from_server());
        assert_eq!(event.message, "Welcome");
    }

    #[test]
    fn test_parse_ignores_extra_fields() {
        let event =
            InboundEvent::parse(r#"{"sender":"Bob","message":"hi","ts":12}"#).unwrap();
        assert_eq!(event.sender, "Bob");
    }

    #[test]
    fn test_parse_plain_text_fails() {
        let err = InboundEvent::parse("oops").unwrap_err();
        assert!(matches!(err, Error::MalformedPayload { .. }));
    }

    #[test]
    fn test_parse_missing_field_fails() {
        assert!(InboundEvent::parse(r#"{"sender":"Bob"}"#).is_err());
        assert!(InboundEvent::parse(r#"{"sender":1,"message":"x"}"#).is_err());
        assert!(InboundEvent::parse(r#"["Bob","hi"]"#).is_err());
    }
}
