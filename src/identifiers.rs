//! Type-safe identifiers for connection lifecycle entities.
//!
//! Newtype wrappers keep transport generations and retry tickets from being
//! mixed up at compile time. Both are monotonic counters owned by a single
//! [`ConnectionManager`](crate::ConnectionManager); they are never reused
//! within one manager's lifetime.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

// ============================================================================
// Generation
// ============================================================================

/// Identifies one transport handle.
///
/// Every call that opens a handle takes the next generation. Notices tagged
/// with anything other than the live generation are stale and get dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    /// Creates a generation from a raw value.
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the successor generation.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen-{}", self.0)
    }
}

// ============================================================================
// RetryTicket
// ============================================================================

/// Identifies one scheduled reconnect.
///
/// A timer firing is honoured only if its ticket is still the pending one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RetryTicket(u64);

impl RetryTicket {
    /// Creates a ticket from a raw value.
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the successor ticket.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RetryTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "retry-{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================
