pub mod change_observer;
pub mod change_recorder;
pub mod deferred_writer;
pub mod loggability_policy;
pub mod record_builder;
pub mod value_normalizer;

pub use change_observer::ChangeObserver;
pub use change_recorder::ChangeRecorder;
pub use deferred_writer::{AuditSession, DeferredWriter, SessionState};
