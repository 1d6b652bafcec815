//! Entity change log recorder.
//!
//! Observes create/update/remove notifications from an object store,
//! filters and normalizes the changed fields, and writes one audit record
//! per accepted notification at the end of the unit of work.
//!
//! # Architecture
//!
//! - `core::services::ChangeObserver` turns notifications into records
//!   and queues them in an `AuditSession`
//! - `core::services::DeferredWriter` writes a session's records through
//!   an `AuditStore` once the unit of work is complete
//! - `core::traits` holds the ports to the host: metadata, type names, storage
//! - `adapters` holds the bundled implementations of those ports

pub mod adapters;
pub mod config;
pub mod core;
