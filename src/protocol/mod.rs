//! Chat wire protocol and display types.
//!
//! # Protocol Overview
//!
//! | Message | Direction | Format |
//! |---------|-----------|--------|
//! | Registration | Client → Server | Plain text display name, first frame only |
//! | Chat line | Client → Server | Plain text, sent verbatim |
//! | Broadcast | Server → Client | `{"sender": "..", "message": ".."}` |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `inbound` | [`InboundEvent`] wire payload |
//! | `record` | [`DisplayRecord`] and [`Category`] |

// ============================================================================
// Submodules
// ============================================================================

/// Inbound wire payload.
pub mod inbound;

/// Display-ready records.
pub mod record;

// ============================================================================
// Re-exports
// ============================================================================

pub use inbound::{InboundEvent, SERVER_SENDER};
pub use record::{Category, DisplayRecord};
