//! Session identity and the identity provider boundary.
//!
//! A [`Session`] is created the first time the client connects and lives for
//! the rest of the process. Its display name never changes afterwards; only
//! the reconnect attempt counter moves.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;
use tracing::debug;

// ============================================================================
// Constants
// ============================================================================

/// Prefix of generated fallback names.
pub const GUEST_PREFIX: &str = "Guest";

/// Exclusive upper bound of the numeric guest suffix.
const GUEST_SUFFIX_BOUND: u32 = 1000;

// ============================================================================
// IdentityProvider
// ============================================================================

/// Supplies the user's display name.
///
/// Called at most once per process. Returning `None` or a blank string makes
/// the client fall back to a generated `Guest<n>` name.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Asks for a display name.
    async fn display_name(&self) -> Option<String>;
}

/// Identity provider that always answers with a fixed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticIdentity(Option<String>);

impl StaticIdentity {
    /// Creates a provider that answers with `name`.
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(Some(name.into()))
    }

    /// Creates a provider that never answers, forcing a guest name.
    #[inline]
    #[must_use]
    pub const fn anonymous() -> Self {
        Self(None)
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn display_name(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Shared identity provider.
pub type SharedIdentity = Arc<dyn IdentityProvider>;

// ============================================================================
// Session
// ============================================================================

/// Per-process chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Immutable display name.
    display_name: String,

    /// Automatic reconnect attempts since the last successful open.
    attempt_count: u32,
}

impl Session {
    /// Creates a session from a provider answer, applying the guest fallback.
    #[must_use]
    pub fn from_answer(answer: Option<String>) -> Self {
        let display_name = match answer {
            Some(name) if !name.trim().is_empty() => name,
            _ => {
                let name = guest_name();
                debug!(%name, "No display name supplied, using guest name");
                name
            }
        };

        Self {
            display_name,
            attempt_count: 0,
        }
    }

    /// Resolves a session by asking `provider` once.
    pub async fn resolve(provider: &dyn IdentityProvider) -> Self {
        Self::from_answer(provider.display_name().await)
    }

    /// Returns the display name.
    #[inline]
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the reconnect attempt count.
    #[inline]
    #[must_use]
    pub const fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    /// Records one more automatic reconnect attempt.
    #[inline]
    pub(crate) fn record_attempt(&mut self) -> u32 {
        self.attempt_count = self.attempt_count.saturating_add(1);
        self.attempt_count
    }

    /// Resets the attempt counter.
    #[inline]
    pub(crate) fn reset_attempts(&mut self) {
        self.attempt_count = 0;
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Generates a `Guest<0-999>` name.
#[must_use]
pub fn guest_name() -> String {
    let suffix = rand::thread_rng().gen_range(0..GUEST_SUFFIX_BOUND);
    format!("{GUEST_PREFIX}{suffix}")
}

// ============================================================================
// Tests
// ============================================================================
