//! Display-ready records.
//!
//! A [`DisplayRecord`] is what the presentation layer draws: one line of
//! text, a provenance category and the moment it arrived. Records are
//! derived on the fly and never persisted.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

// ============================================================================
// Category
// ============================================================================

/// Provenance of a displayed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Written by the local user (echoed back by the server).
    User,
    /// Written by another participant.
    Other,
    /// Connection notices, server announcements and unparseable frames.
    System,
}

impl Category {
    /// Returns the lowercase name used for styling hooks.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Other => "other",
            Self::System => "system",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// DisplayRecord
// ============================================================================

/// A line ready for the presentation sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRecord {
    /// Text to show.
    pub text: String,

    /// Provenance category.
    pub category: Category,

    /// When the record was produced.
    pub timestamp: DateTime<Utc>,
}

impl DisplayRecord {
    /// Creates a record stamped with the current time.
    #[inline]
    #[must_use]
    pub fn new(text: impl Into<String>, category: Category) -> Self {
        Self::at(text, category, Utc::now())
    }

    /// Creates a record with an explicit timestamp.
    #[inline]
    #[must_use]
    pub fn at(text: impl Into<String>, category: Category, timestamp: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            category,
            timestamp,
        }
    }

    /// Creates a system record stamped with the current time.
    #[inline]
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(text, Category::System)
    }

    /// Returns the arrival time as local `HH:MM:SS`.
    #[must_use]
    pub fn time_label(&self) -> String {
        self.timestamp
            .with_timezone(&Local)
            .format("%H:%M:%S")
            .to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================
