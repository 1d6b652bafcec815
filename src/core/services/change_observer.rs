use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, error};

use crate::core::errors::Result;
use crate::core::models::audit_record::{AuditAction, AuditRecord, ChangePayload};
use crate::core::models::change_set::ChangeSet;
use crate::core::models::entity::Auditable;
use crate::core::models::lifecycle::LifecycleEvent;
use crate::core::services::deferred_writer::AuditSession;
use crate::core::services::loggability_policy::LoggabilityPolicy;
use crate::core::services::record_builder::AuditRecordBuilder;
use crate::core::services::value_normalizer::ValueNormalizer;
use crate::core::traits::metadata::MetadataReader;

/// Receives lifecycle notifications and turns them into pending audit records.
///
/// Never writes to the store. Errors while handling a single notification
/// are logged and the notification is dropped, so the host's unit of work
/// is never interrupted by the change log.
pub struct ChangeObserver {
    metadata: Arc<dyn MetadataReader>,
    ignored_fields: HashSet<String>,
    normalizer: ValueNormalizer,
    builder: AuditRecordBuilder,
}

impl ChangeObserver {
    pub fn new(
        metadata: Arc<dyn MetadataReader>,
        ignored_fields: HashSet<String>,
        builder: AuditRecordBuilder,
    ) -> Self {
        Self {
            metadata,
            ignored_fields,
            normalizer: ValueNormalizer,
            builder,
        }
    }

    pub fn on_create(&self, session: &mut AuditSession, subject: &dyn Auditable) {
        self.dispatch(session, subject, AuditAction::Create, None);
    }

    pub fn on_update(&self, session: &mut AuditSession, subject: &dyn Auditable, changes: &ChangeSet) {
        self.dispatch(session, subject, AuditAction::Update, Some(changes));
    }

    pub fn on_remove(&self, session: &mut AuditSession, subject: &dyn Auditable) {
        self.dispatch(session, subject, AuditAction::Remove, None);
    }

    pub fn observe(&self, session: &mut AuditSession, event: &LifecycleEvent) {
        match event {
            LifecycleEvent::Created(subject) => self.on_create(session, subject.as_ref()),
            LifecycleEvent::Updated(subject, changes) => {
                self.on_update(session, subject.as_ref(), changes)
            }
            LifecycleEvent::Removed(subject) => self.on_remove(session, subject.as_ref()),
        }
    }

    /// Compute the record for one notification without enqueueing it.
    ///
    /// `Ok(None)` means nothing should be logged: the type is not auditable,
    /// or an update has no loggable field left.
    pub fn record(
        &self,
        subject: &dyn Auditable,
        action: AuditAction,
        changes: Option<&ChangeSet>,
    ) -> Result<Option<AuditRecord>> {
        let policy = LoggabilityPolicy::new(self.metadata.as_ref(), &self.ignored_fields);
        let type_policy = policy.for_type(&self.builder.canonical_type(subject));
        if !type_policy.is_loggable() {
            return Ok(None);
        }

        let payload = match (action, changes) {
            (AuditAction::Update, Some(changes)) => {
                let mut payload = ChangePayload::new();
                for (field, change) in changes.iter() {
                    if !type_policy.is_field_loggable(field) {
                        continue;
                    }
                    let old = self.normalizer.normalize(field, &change.old)?;
                    let new = self.normalizer.normalize(field, &change.new)?;
                    payload.insert(field, old, new);
                }
                Some(payload)
            }
            _ => None,
        };

        self.builder.build(subject, action, payload.as_ref())
    }

    fn dispatch(
        &self,
        session: &mut AuditSession,
        subject: &dyn Auditable,
        action: AuditAction,
        changes: Option<&ChangeSet>,
    ) {
        let outcome = self
            .record(subject, action, changes)
            .and_then(|record| match record {
                Some(record) => session.enqueue(record).map(|()| true),
                None => Ok(false),
            });

        match outcome {
            Ok(true) => debug!(
                type_name = subject.type_name(),
                %action,
                pending = session.len(),
                "audit record enqueued"
            ),
            Ok(false) => {}
            Err(e) => error!(
                type_name = subject.type_name(),
                %action,
                error = %e,
                "audit record dropped"
            ),
        }
    }
}
