//! Inbound message classification and rendering.
//!
//! The router turns raw text frames into [`DisplayRecord`]s. It never fails:
//! anything that does not parse as an [`InboundEvent`] is shown verbatim as a
//! system line.

// ============================================================================
// Imports
// ============================================================================

use tracing::{trace, warn};

use crate::protocol::{Category, DisplayRecord, InboundEvent, SERVER_SENDER};

// ============================================================================
// MessageRouter
// ============================================================================

/// Classifies inbound frames relative to the local display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRouter {
    /// Display name of the local session.
    display_name: String,
}

impl MessageRouter {
    /// Creates a router for the given local display name.
    #[inline]
    #[must_use]
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
        }
    }

    /// Returns the local display name.
    #[inline]
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Classifies a sender.
    ///
    /// The local display name wins over the reserved server name, so a user
    /// who picked `"Server"` sees their own lines as [`Category::User`].
    #[must_use]
    pub fn classify(&self, sender: &str) -> Category {
        if sender == self.display_name {
            Category::User
        } else if sender == SERVER_SENDER {
            Category::System
        } else {
            Category::Other
        }
    }

    /// Renders a classified message.
    ///
    /// System lines show the message alone; everything else is prefixed with
    /// the sender.
    #[must_use]
    pub fn render(&self, sender: &str, message: &str, category: Category) -> DisplayRecord {
        let text = match category {
            Category::System => message.to_string(),
            Category::User | Category::Other => format!("{sender}: {message}"),
        };
        DisplayRecord::new(text, category)
    }

    /// Routes one raw frame to a display record.
    #[must_use]
    pub fn route(&self, frame: &str) -> DisplayRecord {
        match InboundEvent::parse(frame) {
            Ok(event) => {
                let category = self.classify(&event.sender);
                trace!(sender = %event.sender, %category, "Routed inbound message");
                self.render(&event.sender, &event.message, category)
            }
            Err(e) => {
                warn!(error = %e, "Error parsing message");
                DisplayRecord::system(frame)
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    fn router() -> MessageRouter {
        MessageRouter::new("Alice")
    }

    #[test]
    fn test_classify_self() {
        assert_eq!(router().classify("Alice"), Category::User);
    }

    #[test]
    fn test_classify_server() {
        assert_eq!(router().classify("Server"), Category::System);
    }

    #[test]
    fn test_classify_other() {
        assert_eq!(router().classify("Bob"), Category::Other);
        assert_eq!(router().classify(""), Category::Other);
        assert_eq!(router().classify("alice"), Category::Other);
    }

    #[test]
    fn test_classify_user_named_server() {
        let router = MessageRouter::new("Server");
        assert_eq!(router.classify("Server"), Category::User);
    }

    #[test]
    fn test_render_system_suppresses_sender() {
        let record = router().render("Server", "Welcome", Category::System);
        assert_eq!(record.text, "Welcome");
    }

    #[test]
    fn test_render_prefixes_sender() {
        assert_eq!(router().render("Bob", "hi", Category::Other).text, "Bob: hi");
        assert_eq!(router().render("Alice", "yo", Category::User).text, "Alice: yo");
    }

    #[test]
    fn test_route_welcome() {
        let record = router().route(r#"{"sender":"Server","message":"Welcome"}"#);
        assert_eq!(record.text, "Welcome");
        assert_eq!(record.category, Category::System);
    }

    #[test]
    fn test_route_own_echo() {
        let record = router().route(r#"{"sender":"Alice","message":"hello"}"#);
        assert_eq!(record.text, "Alice: hello");
        assert_eq!(record.category, Category::User);
    }

    #[test]
    fn test_route_malformed_is_system_verbatim() {
        let record = router().route("oops");
        assert_eq!(record.text, "oops");
        assert_eq!(record.category, Category::System);
    }

    #[test]
    fn test_route_empty_frame() {
        let record = router().route("");
        assert_eq!(record.text, "");
        assert_eq!(record.category, Category::System);
    }

    proptest! {
        #[test]
        fn prop_classify_is_total(name in ".*", sender in ".*") {
            let router = MessageRouter::new(name.clone());
            let category = router.classify(&sender);
            let expected = if sender == name {
                Category::User
            } else if sender == SERVER_SENDER {
                Category::System
            } else {
                Category::Other
            };
            prop_assert_eq!(category, expected);
            prop_assert_eq!(router.classify(&sender), category);
        }

        #[test]
        fn prop_non_json_frames_are_kept_verbatim(frame in "[^{\\s]\\PC*") {
            let record = MessageRouter::new("Alice").route(&frame);
            prop_assert_eq!(record.category, Category::System);
            prop_assert_eq!(record.text, frame);
        }
    }
}
