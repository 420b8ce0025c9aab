//! Schema bootstrap.
//!
//! The audit table is embedded at compile time and created on open. Entity
//! tables are created on first use, one per `Entity::TABLE`. Every statement
//! is `IF NOT EXISTS`, so re-running is harmless.

use crate::TallyDb;
use crate::error::DatabaseError;

const MIGRATION_001: &str = include_str!("../migrations/001_audit.sql");

/// DDL for an entity document table.
pub(crate) fn entity_table_ddl(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            entity_key TEXT UNIQUE,
            body TEXT NOT NULL
        )"
    )
}

impl TallyDb {
    pub(crate) async fn run_migrations(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(MIGRATION_001)
            .await
            .map_err(|e| DatabaseError::Migration(format!("001_audit: {e}")))?;
        Ok(())
    }

    /// Create the document table for `table` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Migration` if the DDL fails.
    pub async fn ensure_table(&self, table: &str) -> Result<(), DatabaseError> {
        self.conn
            .execute(&entity_table_ddl(table), ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("table {table}: {e}")))?;
        Ok(())
    }
}
