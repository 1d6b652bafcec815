use crate::core::errors::Result;
use crate::core::models::lifecycle::LifecycleEvent;
use crate::core::services::change_observer::ChangeObserver;
use crate::core::services::deferred_writer::{AuditSession, DeferredWriter};

/// Observer and writer paired for hosts that drive whole units of work.
///
/// ```rust,ignore
/// let mut session = recorder.begin();
/// recorder.observe(&mut session, &LifecycleEvent::Created(order));
/// recorder.complete(&mut session)?;
/// ```
pub struct ChangeRecorder {
    observer: ChangeObserver,
    writer: DeferredWriter,
}

impl ChangeRecorder {
    pub fn new(observer: ChangeObserver, writer: DeferredWriter) -> Self {
        Self { observer, writer }
    }

    /// Start a unit of work.
    pub fn begin(&self) -> AuditSession {
        AuditSession::new()
    }

    pub fn observe(&self, session: &mut AuditSession, event: &LifecycleEvent) {
        self.observer.observe(session, event);
    }

    /// End of the unit of work: write everything the session collected.
    pub fn complete(&self, session: &mut AuditSession) -> Result<usize> {
        self.writer.flush(session)
    }

    /// The observer, for hosts that deliver notifications one by one.
    pub fn observer(&self) -> &ChangeObserver {
        &self.observer
    }
}
