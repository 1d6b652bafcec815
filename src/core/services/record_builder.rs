use std::sync::Arc;

use chrono::Utc;

use crate::core::errors::{ChangelogError, Result};
use crate::core::models::audit_record::{AuditAction, AuditRecord, ChangePayload};
use crate::core::models::entity::Auditable;
use crate::core::traits::type_resolver::TypeResolver;

/// Assembles audit records from an observed object and its filtered changes.
pub struct AuditRecordBuilder {
    resolver: Arc<dyn TypeResolver>,
}

impl AuditRecordBuilder {
    pub fn new(resolver: Arc<dyn TypeResolver>) -> Self {
        Self { resolver }
    }

    /// Logical type name of `subject`.
    pub fn canonical_type(&self, subject: &dyn Auditable) -> String {
        self.resolver.canonical_type(subject.type_name())
    }

    /// Build the record for one lifecycle event.
    ///
    /// Returns `Ok(None)` for an update whose payload is empty or absent.
    /// `changes` is ignored for create and remove.
    pub fn build(
        &self,
        subject: &dyn Auditable,
        action: AuditAction,
        changes: Option<&ChangePayload>,
    ) -> Result<Option<AuditRecord>> {
        let changes = match action {
            AuditAction::Update => match changes {
                Some(payload) if !payload.is_empty() => Some(payload.to_json()?),
                _ => return Ok(None),
            },
            AuditAction::Create | AuditAction::Remove => None,
        };

        let subject_type = self.canonical_type(subject);
        let subject_id = subject
            .identifier()
            .ok_or_else(|| ChangelogError::MissingIdentifier {
                type_name: subject_type.clone(),
            })?;

        Ok(Some(AuditRecord {
            subject_type,
            subject_id,
            action,
            changes,
            logged_at: Utc::now(),
        }))
    }
}
