//! Serde roundtrip and JsonSchema validation tests for the persisted types.

use chrono::{TimeZone, Utc};
use schemars::schema_for;
use serde_json::json;
use tally_core::audit_detail::{ChangedFieldMap, ChangesPayload, FieldDiff};
use tally_core::entities::{AuditEntry, Book};
use tally_core::enums::{EventType, MissingIdentityPolicy, MutationKind, PayloadFormat};
use tally_core::identity::IdentityContext;

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

fn title_change() -> ChangedFieldMap {
    let mut fields = ChangedFieldMap::new();
    fields.insert("title", json!("Dune"), json!("Dune (2021)"));
    fields
}

roundtrip_and_validate!(book_roundtrip, Book, Book::new(1, "Dune", "Herbert"));

roundtrip_and_validate!(
    audit_entry_roundtrip,
    AuditEntry,
    AuditEntry {
        entity_name: "Book".into(),
        entity_id: "1".into(),
        event_type: EventType::Updated,
        changes: r#"{"entity_name":"Book"}"#.into(),
        user_id: "alice".into(),
        correlation_id: "cor-42".into(),
        created_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
    }
);

roundtrip_and_validate!(
    identity_roundtrip,
    IdentityContext,
    IdentityContext::new("alice", "cor-42")
);

roundtrip_and_validate!(
    field_diff_with_nested_document,
    FieldDiff,
    FieldDiff {
        old: serde_json::Value::Null,
        new: json!({"street": "Main", "tags": [1, 2]}),
    }
);

roundtrip_and_validate!(
    changes_payload_roundtrip,
    ChangesPayload,
    ChangesPayload {
        entity_name: "Book".into(),
        entity_id: "1".into(),
        event_type: EventType::Updated,
        changed_fields: title_change(),
    }
);

roundtrip_and_validate!(event_type_roundtrip, EventType, EventType::Deleted);
roundtrip_and_validate!(mutation_kind_roundtrip, MutationKind, MutationKind::Insert);
roundtrip_and_validate!(payload_format_roundtrip, PayloadFormat, PayloadFormat::Compact);
roundtrip_and_validate!(
    missing_identity_roundtrip,
    MissingIdentityPolicy,
    MissingIdentityPolicy::Fallback
);

#[test]
fn stored_payload_parses_back() {
    let payload = ChangesPayload {
        entity_name: "Book".into(),
        entity_id: "1".into(),
        event_type: EventType::Updated,
        changed_fields: title_change(),
    };
    let entry = AuditEntry {
        entity_name: "Book".into(),
        entity_id: "1".into(),
        event_type: EventType::Updated,
        changes: payload.to_json(PayloadFormat::Pretty).unwrap(),
        user_id: "alice".into(),
        correlation_id: "cor-42".into(),
        created_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
    };

    assert_eq!(entry.payload().unwrap(), payload);
}

#[test]
fn event_type_serializes_lowercase() {
    assert_eq!(
        serde_json::to_value(EventType::Created).unwrap(),
        json!("created")
    );
}
