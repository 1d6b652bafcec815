use std::sync::Mutex;

use crate::core::errors::{ChangelogError, Result};
use crate::core::models::audit_record::AuditRecord;
use crate::core::traits::audit::{AuditQuery, AuditStore};

#[derive(Debug, Default)]
struct Inner {
    committed: Vec<AuditRecord>,
    batches: usize,
}

/// In-process audit store. Each batch is appended under one lock, so
/// writers sharing the store never see or disturb each other's batches.
#[derive(Debug, Default)]
pub struct MemoryAuditStore {
    inner: Mutex<Inner>,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every committed record, oldest first.
    pub fn records(&self) -> Vec<AuditRecord> {
        self.inner
            .lock()
            .map(|inner| inner.committed.clone())
            .unwrap_or_default()
    }

    /// Number of non-empty batches written.
    pub fn commit_count(&self) -> usize {
        self.inner.lock().map(|inner| inner.batches).unwrap_or(0)
    }

    fn with_inner<T>(&self, f: impl FnOnce(&mut Inner) -> T) -> Result<T> {
        let mut guard = self.inner.lock().map_err(|_| ChangelogError::StoreError {
            detail: "memory store poisoned by an earlier panic".into(),
        })?;
        Ok(f(&mut guard))
    }
}

impl AuditStore for MemoryAuditStore {
    fn write_batch(&self, records: &[AuditRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        self.with_inner(|inner| {
            inner.committed.extend_from_slice(records);
            inner.batches += 1;
        })
    }

    fn query(&self, filter: &AuditQuery) -> Result<Vec<AuditRecord>> {
        self.with_inner(|inner| {
            inner
                .committed
                .iter()
                .filter(|record| filter.matches(record))
                .cloned()
                .collect()
        })
    }
}
