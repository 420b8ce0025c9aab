//! Audit record assembly: diff + identity + time → `AuditEntry`.

use tally_core::audit_detail::{ChangedFieldMap, ChangesPayload};
use tally_core::entities::AuditEntry;
use tally_core::entity::{KeyValue, NO_KEY_SENTINEL};
use tally_core::enums::{EventType, PayloadFormat};
use tally_core::identity::IdentityProvider;
use tally_core::mutation::PendingMutation;

use crate::clock::Clock;
use crate::error::CaptureError;

/// Assemble the audit entry for one mutation.
///
/// A missing key is recorded as [`NO_KEY_SENTINEL`] rather than failing.
/// `created_at` is taken from `clock` at assembly time.
///
/// # Errors
///
/// Returns `CaptureError::UnsupportedMutation` if the mutation kind has no
/// event type, or `CaptureError::Serialization` if the payload cannot be
/// rendered.
pub fn assemble(
    mutation: &PendingMutation,
    diff: ChangedFieldMap,
    key: Option<&KeyValue>,
    identity: &dyn IdentityProvider,
    clock: &dyn Clock,
    format: PayloadFormat,
) -> Result<AuditEntry, CaptureError> {
    let event_type =
        EventType::for_mutation(mutation.kind).ok_or_else(|| CaptureError::UnsupportedMutation {
            entity: mutation.entity.name.to_string(),
            kind: mutation.kind,
        })?;

    let entity_name = mutation.entity.name.to_string();
    let entity_id = key.map_or_else(|| NO_KEY_SENTINEL.to_string(), ToString::to_string);

    let payload = ChangesPayload {
        entity_name: entity_name.clone(),
        entity_id: entity_id.clone(),
        event_type,
        changed_fields: diff,
    };
    let changes = payload.to_json(format)?;

    Ok(AuditEntry {
        entity_name,
        entity_id,
        event_type,
        changes,
        user_id: identity.current_user_id().to_string(),
        correlation_id: identity.current_correlation_id().to_string(),
        created_at: clock.now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;
    use tally_core::entities::Book;
    use tally_core::entity::{Entity, EntityRef};
    use tally_core::enums::MutationKind;
    use tally_core::identity::IdentityContext;

    use crate::clock::FixedClock;
    use crate::diff::build_diff;

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap())
    }

    fn identity() -> IdentityContext {
        IdentityContext::new("alice", "cor-42")
    }

    fn insert_dune() -> PendingMutation {
        let fields = Book::new(1, "Dune", "Herbert").fields().unwrap();
        PendingMutation::insert(EntityRef::of::<Book>(), &fields)
    }

    #[test]
    fn copies_identity_and_clock() {
        let m = insert_dune();
        let key = KeyValue::new(vec![json!(1)]);
        let entry = assemble(
            &m,
            build_diff(&m).unwrap(),
            Some(&key),
            &identity(),
            &clock(),
            PayloadFormat::Compact,
        )
        .unwrap();

        assert_eq!(entry.entity_name, "Book");
        assert_eq!(entry.entity_id, "1");
        assert_eq!(entry.event_type, EventType::Created);
        assert_eq!(entry.user_id, "alice");
        assert_eq!(entry.correlation_id, "cor-42");
        assert_eq!(entry.created_at, clock().0);
    }

    #[test]
    fn payload_is_self_describing() {
        let m = insert_dune();
        let key = KeyValue::new(vec![json!(1)]);
        let entry = assemble(
            &m,
            build_diff(&m).unwrap(),
            Some(&key),
            &identity(),
            &clock(),
            PayloadFormat::Compact,
        )
        .unwrap();

        let payload: serde_json::Value = serde_json::from_str(&entry.changes).unwrap();
        assert_eq!(
            payload,
            json!({
                "entity_name": "Book",
                "entity_id": "1",
                "event_type": "created",
                "changed_fields": {
                    "id": {"old": null, "new": 1},
                    "title": {"old": null, "new": "Dune"},
                    "author": {"old": null, "new": "Herbert"}
                }
            })
        );
    }

    #[test]
    fn missing_key_uses_sentinel() {
        let m = insert_dune();
        let entry = assemble(
            &m,
            build_diff(&m).unwrap(),
            None,
            &identity(),
            &clock(),
            PayloadFormat::Pretty,
        )
        .unwrap();
        assert_eq!(entry.entity_id, "<no-key>");
        assert_eq!(entry.payload().unwrap().entity_id, "<no-key>");
    }

    #[rstest]
    #[case(PayloadFormat::Pretty)]
    #[case(PayloadFormat::Compact)]
    fn same_input_yields_identical_bytes(#[case] format: PayloadFormat) {
        let m = insert_dune();
        let key = KeyValue::new(vec![json!(1)]);
        let first = assemble(&m, build_diff(&m).unwrap(), Some(&key), &identity(), &clock(), format)
            .unwrap();
        let second =
            assemble(&m, build_diff(&m).unwrap(), Some(&key), &identity(), &clock(), format)
                .unwrap();
        assert_eq!(first.changes.as_bytes(), second.changes.as_bytes());
        assert_eq!(first, second);
    }

    #[test]
    fn unchanged_mutation_is_rejected() {
        let fields = Book::new(1, "Dune", "Herbert").fields().unwrap();
        let m = PendingMutation::unchanged(EntityRef::of::<Book>(), &fields);
        let err = assemble(
            &m,
            ChangedFieldMap::new(),
            None,
            &identity(),
            &clock(),
            PayloadFormat::Pretty,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CaptureError::UnsupportedMutation {
                kind: MutationKind::Unchanged,
                ..
            }
        ));
    }
}
