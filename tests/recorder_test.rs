use std::sync::{Arc, Mutex};

use serde_json::json;

use entity_changelog::adapters::audit::json_audit_store::JsonAuditStore;
use entity_changelog::adapters::audit::memory_audit_store::MemoryAuditStore;
use entity_changelog::adapters::metadata::static_metadata::StaticMetadataReader;
use entity_changelog::adapters::resolvers::prefix_type_resolver::PrefixTypeResolver;
use entity_changelog::core::errors::{ChangelogError, Result};
use entity_changelog::core::models::audit_record::{AuditAction, AuditRecord};
use entity_changelog::core::models::change_set::{ChangeSet, FieldValue};
use entity_changelog::core::models::entity::{Auditable, EntityHandle, EntityId};
use entity_changelog::core::models::lifecycle::LifecycleEvent;
use entity_changelog::core::services::record_builder::AuditRecordBuilder;
use entity_changelog::core::services::{
    AuditSession, ChangeObserver, ChangeRecorder, DeferredWriter, SessionState,
};
use entity_changelog::core::traits::audit::{AuditQuery, AuditStore};

// ─── Helpers ─────────────────────────────────────────────────────

fn observer() -> ChangeObserver {
    let metadata = StaticMetadataReader::new()
        .with_auditable("Order", &["secret"])
        .with_auditable("Customer", &[]);
    ChangeObserver::new(
        Arc::new(metadata),
        ["internalCache".to_string()].into_iter().collect(),
        AuditRecordBuilder::new(Arc::new(PrefixTypeResolver::new(vec!["Proxy::".into()]))),
    )
}

fn recorder(store: Arc<dyn AuditStore>) -> ChangeRecorder {
    ChangeRecorder::new(observer(), DeferredWriter::new(store))
}

fn order(id: i64) -> Arc<dyn Auditable> {
    Arc::new(EntityHandle::new("Order", id))
}

/// Store whose batches always fail; counts attempts.
#[derive(Default)]
struct BrokenStore {
    attempts: Mutex<usize>,
}

impl AuditStore for BrokenStore {
    fn write_batch(&self, _records: &[AuditRecord]) -> Result<()> {
        *self.attempts.lock().unwrap() += 1;
        Err(ChangelogError::StoreError {
            detail: "connection reset".into(),
        })
    }

    fn query(&self, _filter: &AuditQuery) -> Result<Vec<AuditRecord>> {
        Ok(Vec::new())
    }
}

/// Shared store that rejects any batch touching `Order#99`.
struct RejectingStore {
    inner: MemoryAuditStore,
}

impl AuditStore for RejectingStore {
    fn write_batch(&self, records: &[AuditRecord]) -> Result<()> {
        if records.iter().any(|r| r.subject_id == EntityId::Int(99)) {
            return Err(ChangelogError::StoreError {
                detail: "constraint violation".into(),
            });
        }
        self.inner.write_batch(records)
    }

    fn query(&self, filter: &AuditQuery) -> Result<Vec<AuditRecord>> {
        self.inner.query(filter)
    }
}

// ─── Scenarios ───────────────────────────────────────────────────

#[test]
fn order_created_is_persisted_once() {
    let store = Arc::new(MemoryAuditStore::new());
    let rec = recorder(store.clone());

    let mut session = rec.begin();
    rec.observe(&mut session, &LifecycleEvent::Created(order(42)));
    assert_eq!(rec.complete(&mut session).unwrap(), 1);

    let records = store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].subject_type, "Order");
    assert_eq!(records[0].subject_id, EntityId::Int(42));
    assert_eq!(records[0].action, AuditAction::Create);
    assert_eq!(records[0].changes, None);
}

#[test]
fn order_update_drops_ignored_field() {
    let store = Arc::new(MemoryAuditStore::new());
    let rec = recorder(store.clone());
    let changes = ChangeSet::new()
        .with("status", "NEW", "PAID")
        .with("internalCache", 1, 2);

    let mut session = rec.begin();
    rec.observe(&mut session, &LifecycleEvent::Updated(order(42), changes));
    rec.complete(&mut session).unwrap();

    let records = store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].changes.as_deref(),
        Some(r#"{"status":["NEW","PAID"]}"#)
    );
}

#[test]
fn order_update_with_only_ignored_field_writes_nothing() {
    let store = Arc::new(MemoryAuditStore::new());
    let rec = recorder(store.clone());

    let mut session = rec.begin();
    rec.observe(
        &mut session,
        &LifecycleEvent::Updated(order(42), ChangeSet::new().with("internalCache", 1, 2)),
    );

    assert!(session.is_empty());
    assert_eq!(rec.complete(&mut session).unwrap(), 0);
    assert!(store.records().is_empty());
    assert_eq!(store.commit_count(), 0);
}

#[test]
fn failed_flush_propagates_and_keeps_buffer() {
    let store = Arc::new(BrokenStore::default());
    let rec = recorder(store.clone());

    let mut session = rec.begin();
    rec.observe(&mut session, &LifecycleEvent::Created(order(1)));
    rec.observe(&mut session, &LifecycleEvent::Removed(order(2)));

    let err = rec.complete(&mut session).unwrap_err();
    assert!(matches!(err, ChangelogError::StoreError { .. }));
    assert_eq!(session.len(), 2);
    assert_eq!(session.state(), SessionState::Accumulating);
    assert_eq!(*store.attempts.lock().unwrap(), 1);
}

#[test]
fn retry_after_failure_writes_each_record_once() {
    let tmp = tempfile::TempDir::new().unwrap();
    let good = Arc::new(JsonAuditStore::new(tmp.path(), "audit.log"));
    let broken = Arc::new(BrokenStore::default());

    let obs = observer();
    let mut session = AuditSession::new();
    obs.on_create(&mut session, &EntityHandle::new("Order", 1));
    obs.on_create(&mut session, &EntityHandle::new("Order", 2));

    assert!(DeferredWriter::new(broken).flush(&mut session).is_err());
    assert_eq!(DeferredWriter::new(good.clone()).flush(&mut session).unwrap(), 2);

    let ids: Vec<_> = good
        .query(&AuditQuery::default())
        .unwrap()
        .into_iter()
        .map(|r| r.subject_id)
        .collect();
    assert_eq!(ids, vec![EntityId::Int(1), EntityId::Int(2)]);
    assert!(session.is_empty());
}

#[test]
fn failed_unit_does_not_discard_other_units_on_shared_store() {
    let store = Arc::new(RejectingStore {
        inner: MemoryAuditStore::new(),
    });
    let first = recorder(store.clone());
    let second = recorder(store.clone());

    let mut unit_a = first.begin();
    first.observe(&mut unit_a, &LifecycleEvent::Created(order(1)));
    first.observe(&mut unit_a, &LifecycleEvent::Created(order(2)));

    let mut unit_b = second.begin();
    second.observe(&mut unit_b, &LifecycleEvent::Created(order(99)));

    assert!(second.complete(&mut unit_b).is_err());
    assert_eq!(first.complete(&mut unit_a).unwrap(), 2);

    let ids: Vec<_> = store.inner.records().into_iter().map(|r| r.subject_id).collect();
    assert_eq!(ids, vec![EntityId::Int(1), EntityId::Int(2)]);
    assert_eq!(unit_b.len(), 1);
}

#[test]
fn concurrent_units_on_shared_store_are_all_accounted_for() {
    let store = Arc::new(RejectingStore {
        inner: MemoryAuditStore::new(),
    });
    let rec = Arc::new(recorder(store.clone()));

    let handles: Vec<_> = [1, 99, 2, 99, 3]
        .into_iter()
        .map(|id| {
            let rec = Arc::clone(&rec);
            std::thread::spawn(move || {
                let mut session = rec.begin();
                rec.observe(&mut session, &LifecycleEvent::Created(order(id)));
                rec.observe(&mut session, &LifecycleEvent::Removed(order(id)));
                (id, rec.complete(&mut session), session.len())
            })
        })
        .collect();

    for handle in handles {
        let (id, outcome, left) = handle.join().unwrap();
        if id == 99 {
            assert!(outcome.is_err());
            assert_eq!(left, 2);
        } else {
            assert_eq!(outcome.unwrap(), 2);
            assert_eq!(left, 0);
        }
    }

    let records = store.inner.records();
    assert_eq!(records.len(), 6);
    assert!(records.iter().all(|r| r.subject_id != EntityId::Int(99)));
    assert_eq!(store.inner.commit_count(), 3);
}

// ─── Properties ──────────────────────────────────────────────────

#[test]
fn unauditable_objects_never_produce_records() {
    let store = Arc::new(MemoryAuditStore::new());
    let rec = recorder(store.clone());
    let changes = ChangeSet::new().with("status", "a", "b");

    let mut session = rec.begin();
    for type_name in ["Session", "Proxy::Session", "Unknown"] {
        let subject: Arc<dyn Auditable> = Arc::new(EntityHandle::new(type_name, 1));
        rec.observe(&mut session, &LifecycleEvent::Created(subject.clone()));
        rec.observe(&mut session, &LifecycleEvent::Updated(subject.clone(), changes.clone()));
        rec.observe(&mut session, &LifecycleEvent::Removed(subject));
    }

    assert!(session.is_empty());
    assert_eq!(rec.complete(&mut session).unwrap(), 0);
    assert!(store.records().is_empty());
}

#[test]
fn create_and_remove_never_carry_changes() {
    let store = Arc::new(MemoryAuditStore::new());
    let rec = recorder(store.clone());

    let mut session = rec.begin();
    rec.observe(&mut session, &LifecycleEvent::Created(order(1)));
    rec.observe(&mut session, &LifecycleEvent::Removed(order(1)));
    rec.complete(&mut session).unwrap();

    assert!(store.records().iter().all(|r| r.changes.is_none()));
}

#[test]
fn payload_decodes_to_filtered_normalized_map() {
    let obs = observer();
    let changes = ChangeSet::new()
        .with("status", "NEW", "PAID")
        .with(
            "customer",
            FieldValue::reference(EntityHandle::new("Customer", 7)),
            FieldValue::reference(EntityHandle::new("Customer", 8)),
        )
        .with("secret", "a", "b")
        .with(
            "notes",
            FieldValue::null(),
            FieldValue::stream(b"handle with care".to_vec()),
        )
        .with("lines", json!([1, 2]), json!([1, 2, 3]));

    let record = obs
        .record(&EntityHandle::new("Order", 42), AuditAction::Update, Some(&changes))
        .unwrap()
        .unwrap();
    let payload = record.decoded_changes().unwrap().unwrap();

    assert_eq!(payload.fields(), vec!["status", "customer", "notes", "lines"]);
    assert_eq!(payload.get("status"), Some((&json!("NEW"), &json!("PAID"))));
    assert_eq!(payload.get("customer"), Some((&json!(7), &json!(8))));
    assert_eq!(
        payload.get("notes"),
        Some((&json!(null), &json!("handle with care")))
    );
    assert_eq!(payload.get("lines"), Some((&json!([1, 2]), &json!([1, 2, 3]))));
}

#[test]
fn proxy_prefix_is_stripped_from_subject_type() {
    let store = Arc::new(MemoryAuditStore::new());
    let rec = recorder(store.clone());
    let proxied: Arc<dyn Auditable> = Arc::new(EntityHandle::new("Proxy::Order", 5));

    let mut session = rec.begin();
    rec.observe(&mut session, &LifecycleEvent::Created(proxied));
    rec.complete(&mut session).unwrap();

    assert_eq!(store.records()[0].subject_type, "Order");
}

#[test]
fn flush_order_matches_enqueue_order() {
    let store = Arc::new(MemoryAuditStore::new());
    let rec = recorder(store.clone());

    let mut session = rec.begin();
    for id in [5, 3, 9, 1] {
        rec.observe(&mut session, &LifecycleEvent::Created(order(id)));
    }
    rec.complete(&mut session).unwrap();

    let ids: Vec<_> = store.records().into_iter().map(|r| r.subject_id).collect();
    assert_eq!(
        ids,
        vec![
            EntityId::Int(5),
            EntityId::Int(3),
            EntityId::Int(9),
            EntityId::Int(1)
        ]
    );
}

#[test]
fn session_is_reusable_across_units_of_work() {
    let store = Arc::new(MemoryAuditStore::new());
    let rec = recorder(store.clone());

    let mut session = rec.begin();
    rec.observe(&mut session, &LifecycleEvent::Created(order(1)));
    rec.complete(&mut session).unwrap();
    assert_eq!(session.state(), SessionState::Idle);

    rec.observer()
        .on_remove(&mut session, &EntityHandle::new("Order", 1));
    rec.complete(&mut session).unwrap();

    assert_eq!(store.records().len(), 2);
    assert_eq!(store.commit_count(), 2);
}
