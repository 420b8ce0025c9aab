//! # tally-db
//!
//! libSQL reference store for Tally.
//!
//! Entities live as JSON documents in one table per entity type. Changes are
//! tracked by a [`unit_of_work::UnitOfWork`], which runs its pre-commit hooks
//! (the audit interceptor among them) once per commit attempt and writes the
//! entity rows and the resulting audit entries in a single transaction.

pub mod audit;
pub mod error;
pub mod helpers;
mod migrations;
pub mod retry;
pub mod service;
pub mod tracker;
pub mod unit_of_work;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;
use tally_core::entity::{Entity, KeyValue};
use tally_schema::SchemaRegistry;

pub use unit_of_work::{CommitOutcome, UnitOfWork};

/// Database handle: one local libSQL database and connection.
pub struct TallyDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
    schema: SchemaRegistry,
}

impl TallyDb {
    /// Open a local database at `path` (or `":memory:"`).
    ///
    /// Creates the audit table on first open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or the
    /// bootstrap fails.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        let tally_db = Self {
            db,
            conn,
            schema: SchemaRegistry::new(),
        };
        tally_db.run_migrations().await?;
        Ok(tally_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    #[must_use]
    pub const fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    /// Start a unit of work with no hooks registered.
    #[must_use]
    pub fn unit_of_work(&self) -> UnitOfWork<'_> {
        UnitOfWork::new(self)
    }

    /// Read one entity by key. Untracked.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or the stored document does
    /// not deserialize into `E`.
    pub async fn find<E: Entity>(&self, key: &KeyValue) -> Result<Option<E>, DatabaseError> {
        self.ensure_table(E::TABLE).await?;
        let mut rows = self
            .conn
            .query(
                &format!("SELECT body FROM {} WHERE entity_key = ?1", E::TABLE),
                [key.to_string()],
            )
            .await?;
        let Some(row) = rows.next().await? else {
            return Ok(None);
        };
        let body = row.get::<String>(0)?;
        Ok(Some(serde_json::from_str(&body)?))
    }
}
