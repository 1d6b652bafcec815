use chrono::{DateTime, Utc};

use crate::core::errors::Result;
use crate::core::models::audit_record::{AuditAction, AuditRecord};
use crate::core::models::entity::EntityId;

/// Filters for reading the change log back. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    pub subject_type: Option<String>,
    pub subject_id: Option<EntityId>,
    pub action: Option<AuditAction>,
    pub since: Option<DateTime<Utc>>,
}

impl AuditQuery {
    pub fn matches(&self, record: &AuditRecord) -> bool {
        if let Some(subject_type) = &self.subject_type
            && record.subject_type != *subject_type
        {
            return false;
        }
        if let Some(subject_id) = &self.subject_id
            && record.subject_id != *subject_id
        {
            return false;
        }
        if let Some(action) = self.action
            && record.action != action
        {
            return false;
        }
        if let Some(since) = self.since
            && record.logged_at < since
        {
            return false;
        }
        true
    }
}

/// Port for durably storing audit records.
///
/// One call to `write_batch` carries one unit of work. Stores shared by
/// several writers must keep each batch separate from the others.
pub trait AuditStore: Send + Sync {
    /// Durably write `records` in order. Either every record is written
    /// or none is and the error is returned.
    fn write_batch(&self, records: &[AuditRecord]) -> Result<()>;

    /// Read committed records, oldest first.
    fn query(&self, filter: &AuditQuery) -> Result<Vec<AuditRecord>>;
}
