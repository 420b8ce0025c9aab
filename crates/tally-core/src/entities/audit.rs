use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::audit_detail::ChangesPayload;
use crate::enums::EventType;

/// An append-only audit record describing one committed mutation.
///
/// `changes` holds the serialized [`ChangesPayload`]. Entries are immutable
/// once assembled and are never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AuditEntry {
    pub entity_name: String,
    pub entity_id: String,
    pub event_type: EventType,
    pub changes: String,
    pub user_id: String,
    pub correlation_id: String,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    /// Parse the stored changes payload back into its document form.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if `changes` is not a valid payload.
    pub fn payload(&self) -> Result<ChangesPayload, serde_json::Error> {
        serde_json::from_str(&self.changes)
    }
}
