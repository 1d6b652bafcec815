use std::sync::Arc;

use crate::core::models::audit_record::AuditAction;
use crate::core::models::change_set::ChangeSet;
use crate::core::models::entity::Auditable;

/// A lifecycle notification delivered by the host.
#[derive(Debug, Clone)]
pub enum LifecycleEvent {
    Created(Arc<dyn Auditable>),
    Updated(Arc<dyn Auditable>, ChangeSet),
    Removed(Arc<dyn Auditable>),
}

impl LifecycleEvent {
    pub fn subject(&self) -> &dyn Auditable {
        match self {
            LifecycleEvent::Created(subject)
            | LifecycleEvent::Updated(subject, _)
            | LifecycleEvent::Removed(subject) => subject.as_ref(),
        }
    }

    pub fn action(&self) -> AuditAction {
        match self {
            LifecycleEvent::Created(_) => AuditAction::Create,
            LifecycleEvent::Updated(..) => AuditAction::Update,
            LifecycleEvent::Removed(_) => AuditAction::Remove,
        }
    }
}
