//! Changed-field map and the changes payload document.
//!
//! The payload stored in `AuditEntry::changes` is a self-describing document:
//! it repeats the entity name, id and event type next to the field diff, so it
//! can be read without the row's other columns.

use indexmap::IndexMap;
use indexmap::map::Iter;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::enums::{EventType, PayloadFormat};

/// Before/after values of one field. Absent sides are `null`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct FieldDiff {
    pub old: Value,
    pub new: Value,
}

/// Field name → diff, in field declaration order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(transparent)]
pub struct ChangedFieldMap(IndexMap<String, FieldDiff>);

impl ChangedFieldMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a field diff. Re-inserting a name keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, old: Value, new: Value) {
        self.0.insert(name.into(), FieldDiff { old, new });
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldDiff> {
        self.0.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, String, FieldDiff> {
        self.0.iter()
    }

    /// Field names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<'a> IntoIterator for &'a ChangedFieldMap {
    type Item = (&'a String, &'a FieldDiff);
    type IntoIter = Iter<'a, String, FieldDiff>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The serialized body of an audit entry.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ChangesPayload {
    pub entity_name: String,
    pub entity_id: String,
    pub event_type: EventType,
    pub changed_fields: ChangedFieldMap,
}

impl ChangesPayload {
    /// Render the payload as JSON text.
    ///
    /// Output is byte-stable for equal payloads: the envelope keys follow
    /// struct order and field diffs follow map insertion order.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if a value cannot be serialized.
    pub fn to_json(&self, format: PayloadFormat) -> Result<String, serde_json::Error> {
        match format {
            PayloadFormat::Pretty => serde_json::to_string_pretty(self),
            PayloadFormat::Compact => serde_json::to_string(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> ChangesPayload {
        let mut changed = ChangedFieldMap::new();
        changed.insert("title", Value::Null, json!("Dune"));
        changed.insert("author", Value::Null, json!("Herbert"));
        ChangesPayload {
            entity_name: "Book".into(),
            entity_id: "1".into(),
            event_type: EventType::Created,
            changed_fields: changed,
        }
    }

    #[test]
    fn compact_payload_layout() {
        let text = sample().to_json(PayloadFormat::Compact).unwrap();
        assert_eq!(
            text,
            r#"{"entity_name":"Book","entity_id":"1","event_type":"created","changed_fields":{"title":{"old":null,"new":"Dune"},"author":{"old":null,"new":"Herbert"}}}"#
        );
    }

    #[test]
    fn pretty_payload_is_indented_and_parses_back() {
        let text = sample().to_json(PayloadFormat::Pretty).unwrap();
        assert!(text.contains("\n  \"entity_name\": \"Book\""));
        let parsed: ChangesPayload = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn field_order_is_insertion_order() {
        let payload = sample();
        let names: Vec<_> = payload.changed_fields.names().collect();
        assert_eq!(names, vec!["title", "author"]);
    }

    #[test]
    fn reinsert_keeps_position() {
        let mut changed = ChangedFieldMap::new();
        changed.insert("a", json!(1), json!(2));
        changed.insert("b", json!(1), json!(2));
        changed.insert("a", json!(1), json!(3));
        let names: Vec<_> = changed.names().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(changed.get("a").unwrap().new, json!(3));
    }
}
