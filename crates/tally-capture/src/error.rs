//! Capture error types.
//!
//! Every variant is terminal for the commit attempt that raised it: capture
//! never retries and never swallows a failure.

use tally_core::enums::MutationKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    /// A mutation kind that has no audit event reached the diff or assembly
    /// stage. The snapshot provider broke its contract.
    #[error("Unsupported mutation kind '{kind}' for entity '{entity}'")]
    UnsupportedMutation { entity: String, kind: MutationKind },

    /// The identity context is missing a required value.
    #[error("Missing identity: {0}")]
    MissingIdentity(String),

    /// The changes payload could not be serialized.
    #[error("Failed to serialize changes payload: {0}")]
    Serialization(#[from] serde_json::Error),
}
