//! Entity capability traits and key resolution.
//!
//! Any serde-serializable struct becomes persistable by implementing [`Entity`].
//! Implementing the [`Auditable`] marker on top opts the type into audit capture.
//! Field order everywhere in Tally is serde declaration order.

use std::any::TypeId;
use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::errors::CoreError;

/// Entity id recorded when no primary key value can be resolved.
pub const NO_KEY_SENTINEL: &str = "<no-key>";

/// Ordered field name → value document of one entity.
pub type Fields = Map<String, Value>;

/// A persistable domain type.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Logical type name recorded in audit entries. Stable, not a display name.
    const NAME: &'static str;

    /// Storage table name.
    const TABLE: &'static str;

    /// Primary-key field names in key order. Empty for keyless entities.
    const KEY: &'static [&'static str];

    /// Serialize into an ordered field document.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Serialization` if serde fails, or
    /// `CoreError::NotADocument` if the entity is not a JSON object.
    fn fields(&self) -> Result<Fields, CoreError> {
        match serde_json::to_value(self)? {
            Value::Object(fields) => Ok(fields),
            _ => Err(CoreError::NotADocument {
                entity_type: Self::NAME.to_string(),
            }),
        }
    }

    /// Resolve the primary key value of this entity, if it has one.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Entity::fields`].
    fn key(&self) -> Result<Option<KeyValue>, CoreError> {
        Ok(KeyValue::from_fields(Self::KEY, &self.fields()?))
    }
}

/// Marker capability: mutations of implementing types are audited.
pub trait Auditable: Entity {}

/// Type-erased reference to a mutated entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityRef {
    pub type_id: TypeId,
    pub name: &'static str,
}

impl EntityRef {
    #[must_use]
    pub fn of<E: Entity>() -> Self {
        Self {
            type_id: TypeId::of::<E>(),
            name: E::NAME,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Primary key value, one component per key field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue(Vec<Value>);

impl KeyValue {
    #[must_use]
    pub const fn new(parts: Vec<Value>) -> Self {
        Self(parts)
    }

    /// Extract a key from a field document.
    ///
    /// Returns `None` for keyless entities and when any key field is missing
    /// or null.
    #[must_use]
    pub fn from_fields(key_fields: &[&str], fields: &Fields) -> Option<Self> {
        if key_fields.is_empty() {
            return None;
        }
        let mut parts = Vec::with_capacity(key_fields.len());
        for name in key_fields {
            match fields.get(*name) {
                None | Some(Value::Null) => return None,
                Some(value) => parts.push(value.clone()),
            }
        }
        Some(Self(parts))
    }
}

/// A single-part key renders its string verbatim, any other value as JSON
/// text. Composite keys render as a JSON array, so parts containing `,` stay
/// distinct.
impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [Value::String(s)] => f.write_str(s),
            [single] => write!(f, "{single}"),
            parts => {
                f.write_str("[")?;
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{part}")?;
                }
                f.write_str("]")
            }
        }
    }
}
