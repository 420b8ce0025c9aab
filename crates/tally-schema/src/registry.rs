//! Schema registry for audit artifacts.
//!
//! Schemas are generated from `tally-core` types with [`schemars::schema_for!`]
//! at construction time. Each is compiled by `jsonschema` on first use and the
//! compiled validator is kept for the life of the registry.

use std::collections::HashMap;
use std::sync::OnceLock;

use jsonschema::Validator;

use schemars::schema_for;
use serde_json::Value;
use tally_core::entities::AuditEntry;

use crate::error::SchemaError;

pub const AUDIT_ENTRY: &str = "audit_entry";
pub const CHANGES_PAYLOAD: &str = "changes_payload";
pub const IDENTITY_CONTEXT: &str = "identity_context";

/// Named JSON Schemas for every durable Tally document.
pub struct SchemaRegistry {
    schemas: HashMap<&'static str, RegisteredSchema>,
}

struct RegisteredSchema {
    schema: Value,
    /// Compile error text is cached too; a schema that fails once always fails.
    validator: OnceLock<Result<Validator, String>>,
}

impl RegisteredSchema {
    fn new(schema: Value) -> Self {
        Self {
            schema,
            validator: OnceLock::new(),
        }
    }

    fn validator(&self) -> Result<&Validator, SchemaError> {
        self.validator
            .get_or_init(|| jsonschema::validator_for(&self.schema).map_err(|e| format!("{e}")))
            .as_ref()
            .map_err(|e| SchemaError::Generation(e.clone()))
    }
}

macro_rules! register {
    ($map:expr, $name:expr, $ty:ty) => {
        $map.insert($name, RegisteredSchema::new(Value::from(schema_for!($ty))));
    };
}

impl SchemaRegistry {
    #[must_use]
    pub fn new() -> Self {
        let mut schemas = HashMap::new();

        register!(schemas, AUDIT_ENTRY, tally_core::entities::AuditEntry);
        register!(
            schemas,
            CHANGES_PAYLOAD,
            tally_core::audit_detail::ChangesPayload
        );
        register!(
            schemas,
            IDENTITY_CONTEXT,
            tally_core::identity::IdentityContext
        );

        Self { schemas }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schemas.get(name).map(|s| &s.schema)
    }

    /// Validate a JSON value against a named schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` if the schema name is unknown, or
    /// `SchemaError::ValidationFailed` if validation produces errors.
    /// `SchemaError::Generation` if the schema itself does not compile.
    pub fn validate(&self, name: &str, instance: &Value) -> Result<(), SchemaError> {
        let validator = self
            .schemas
            .get(name)
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))?
            .validator()?;

        let errors: Vec<String> = validator
            .iter_errors(instance)
            .map(|e| format!("{e}"))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::ValidationFailed { errors })
        }
    }

    /// Validate a serialized changes payload (the `changes` column).
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::InvalidJson` if `text` does not parse, otherwise
    /// as [`SchemaRegistry::validate`].
    pub fn validate_changes(&self, text: &str) -> Result<(), SchemaError> {
        let instance: Value = serde_json::from_str(text)?;
        self.validate(CHANGES_PAYLOAD, &instance)
    }

    /// Validate an audit entry together with its embedded payload.
    ///
    /// # Errors
    ///
    /// Returns the first failing check.
    pub fn validate_entry(&self, entry: &AuditEntry) -> Result<(), SchemaError> {
        let instance = serde_json::to_value(entry)?;
        self.validate(AUDIT_ENTRY, &instance)?;
        self.validate_changes(&entry.changes)
    }

    /// Registered schema names, sorted.
    #[must_use]
    pub fn list(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.schemas.keys().copied().collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}
