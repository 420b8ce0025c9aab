//! Database error types for tally-db.

use tally_capture::CaptureError;
use tally_core::errors::CoreError;
use thiserror::Error;

/// Errors from store and unit-of-work operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed or returned malformed data.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema bootstrap failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Operation not valid for the current tracking state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The row a write targeted was changed or removed underneath the commit,
    /// or an insert collided with an existing key.
    #[error("Conflict on {entity} '{key}': {reason}")]
    Conflict {
        entity: String,
        key: String,
        reason: String,
    },

    /// A pre-commit hook aborted the attempt.
    #[error("Pre-commit hook failed: {0}")]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
