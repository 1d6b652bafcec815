use std::sync::Arc;

use tracing::{debug, error, info};

use crate::core::errors::{ChangelogError, Result};
use crate::core::models::audit_record::AuditRecord;
use crate::core::traits::audit::AuditStore;

/// Where a unit of work is in its write cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Accumulating,
    Flushing,
}

/// Records produced during one unit of work, waiting for the flush.
///
/// Owned by the host for the lifetime of the unit of work. Concurrent
/// hosts keep one session per unit of work.
#[derive(Debug)]
pub struct AuditSession {
    pending: Vec<AuditRecord>,
    state: SessionState,
}

impl Default for AuditSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditSession {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            state: SessionState::Idle,
        }
    }

    /// Append a record. Rejected while the session is being flushed.
    pub fn enqueue(&mut self, record: AuditRecord) -> Result<()> {
        if self.state == SessionState::Flushing {
            return Err(ChangelogError::FlushInProgress);
        }
        self.pending.push(record);
        self.state = SessionState::Accumulating;
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn pending(&self) -> &[AuditRecord] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Writes a session's records to the store at the end of the unit of work.
pub struct DeferredWriter {
    store: Arc<dyn AuditStore>,
}

impl DeferredWriter {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Write every pending record as one batch, in enqueue order.
    ///
    /// Returns the number of records written. An empty session touches
    /// nothing. On failure the session keeps its records for a retry and
    /// the error is returned.
    pub fn flush(&self, session: &mut AuditSession) -> Result<usize> {
        if session.pending.is_empty() {
            session.state = SessionState::Idle;
            return Ok(0);
        }

        session.state = SessionState::Flushing;
        let count = session.pending.len();
        debug!(count, "flushing audit records");

        match self.store.write_batch(&session.pending) {
            Ok(()) => {
                session.pending.clear();
                session.state = SessionState::Idle;
                info!(count, "audit records committed");
                Ok(count)
            }
            Err(e) => {
                error!(count, error = %e, "audit flush failed, records kept for retry");
                session.state = SessionState::Accumulating;
                Err(e)
            }
        }
    }
}
