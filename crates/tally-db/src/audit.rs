//! Audit log writes.
//!
//! Entries are only ever inserted, and only inside the transaction of the
//! commit that produced them.

use tally_core::entities::AuditEntry;

use crate::error::DatabaseError;

/// Insert one entry on `conn` (normally a transaction).
///
/// # Errors
///
/// Returns `DatabaseError::LibSql` if the INSERT fails.
pub async fn insert_audit_entry(
    conn: &libsql::Connection,
    entry: &AuditEntry,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO audit_entries (entity_name, entity_id, event_type, changes, user_id, correlation_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        libsql::params![
            entry.entity_name.as_str(),
            entry.entity_id.as_str(),
            entry.event_type.as_str(),
            entry.changes.as_str(),
            entry.user_id.as_str(),
            entry.correlation_id.as_str(),
            entry.created_at.to_rfc3339()
        ],
    )
    .await?;
    Ok(())
}
