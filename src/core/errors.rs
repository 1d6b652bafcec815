use std::path::PathBuf;

/// All domain errors for the change log recorder.
///
/// Each variant provides enough context to diagnose the issue
/// without needing a debugger.
#[derive(Debug, thiserror::Error)]
pub enum ChangelogError {
    #[error("Metadata lookup failed for type '{type_name}': {detail}")]
    MetadataLookup { type_name: String, detail: String },

    #[error(
        "Object of type '{type_name}' has no identifier\n\n  \
         Audit records are keyed by the subject's primary identifier.\n  \
         Make sure the object was assigned an id before the lifecycle event fired."
    )]
    MissingIdentifier { type_name: String },

    #[error("Cannot normalize value of field '{field}': {detail}")]
    Normalization { field: String, detail: String },

    #[error("Serialization failed: {detail}")]
    Serialization { detail: String },

    #[error(
        "A flush is in progress for this unit of work\n\n  \
         Records cannot be enqueued while the session is being written.\n  \
         Start a new unit of work once the flush has completed."
    )]
    FlushInProgress,

    #[error("Audit store error: {detail}")]
    StoreError { detail: String },

    #[error("Invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    #[error(
        "Parse error in {file} at line {line}: {detail}\n\n  \
         Expected one JSON object per line, e.g.\n    \
         {{\"event\":\"update\",\"type\":\"Order\",\"id\":42,\"changes\":{{\"status\":[\"NEW\",\"PAID\"]}}}}"
    )]
    ParseError {
        file: PathBuf,
        line: usize,
        detail: String,
    },

    #[error(
        "File not found: {path}\n\n  \
         Check that the path is correct and the file exists."
    )]
    FileNotFound { path: PathBuf },

    #[error(
        "This project uses format version {project_version}, but this build \
         only supports up to version {supported_version}.\n\n  \
         Solution: upgrade entity-changelog."
    )]
    FormatVersionTooNew {
        project_version: u32,
        supported_version: u32,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ChangelogError>;
