//! Cross-cutting error types for Tally.
//!
//! Domain-specific errors (`CaptureError`, `DatabaseError`, ...) are defined in
//! their respective crates and wrap `CoreError` where they touch core types.

use thiserror::Error;

/// Errors raised while turning an entity into a field document.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An entity did not serialize to a field document (JSON object).
    #[error("Entity '{entity_type}' does not serialize to a field document")]
    NotADocument { entity_type: String },

    /// Entity or payload serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
