use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::error;

use crate::config::app_config::AuditSection;
use crate::core::errors::{ChangelogError, Result};
use crate::core::models::audit_record::AuditRecord;
use crate::core::traits::audit::{AuditQuery, AuditStore};

/// Audit store that appends records as JSON lines to a file.
///
/// Each line in the log file is a self-contained JSON object representing
/// one `AuditRecord`. A batch is serialized up front and appended with a
/// single write while holding the store's write lock. If the write fails
/// part way, the file is truncated back to its previous length.
pub struct JsonAuditStore {
    log_path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonAuditStore {
    /// Create a store that writes to `{dir}/{log_file}`.
    pub fn new(dir: &Path, log_file: &str) -> Self {
        Self {
            log_path: dir.join(log_file),
            write_lock: Mutex::new(()),
        }
    }

    /// Create a store from the `[audit]` section, falling back to defaults
    /// if the section is missing.
    pub fn from_config(dir: &Path, audit_section: Option<&AuditSection>) -> Self {
        let log_file = audit_section
            .map(|a| a.log_file.as_str())
            .unwrap_or("audit.log");
        Self::new(dir, log_file)
    }

    /// Check whether auditing is enabled in the configuration.
    /// Returns `true` when the section is absent (enabled by default).
    pub fn is_enabled(audit_section: Option<&AuditSection>) -> bool {
        audit_section.map(|a| a.enabled).unwrap_or(true)
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }

    fn encode(records: &[AuditRecord]) -> Result<String> {
        let mut batch = String::new();
        for record in records {
            let line = serde_json::to_string(record).map_err(|e| ChangelogError::StoreError {
                detail: format!("Failed to serialize audit record: {e}"),
            })?;
            batch.push_str(&line);
            batch.push('\n');
        }
        Ok(batch)
    }
}

/// Write `bytes` in full. On failure `restore` is called to undo whatever
/// part of the write landed, and the write error is returned.
fn write_or_restore(
    out: &mut impl Write,
    bytes: &[u8],
    restore: impl FnOnce() -> io::Result<()>,
) -> io::Result<()> {
    let written = out.write_all(bytes).and_then(|()| out.flush());
    if let Err(e) = written {
        if let Err(restore_err) = restore() {
            error!(error = %restore_err, "could not truncate partial audit batch");
        }
        return Err(e);
    }
    Ok(())
}

impl AuditStore for JsonAuditStore {
    fn write_batch(&self, records: &[AuditRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let batch = Self::encode(records)?;

        let _guard = self.write_lock.lock().map_err(|_| ChangelogError::StoreError {
            detail: "audit log lock poisoned by an earlier panic".into(),
        })?;

        // Ensure the parent directory exists
        if let Some(parent) = self.log_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| ChangelogError::StoreError {
                detail: format!("Cannot open audit log at {}: {e}", self.log_path.display()),
            })?;
        let start = file.metadata()?.len();
        let restore_handle = file.try_clone()?;

        write_or_restore(&mut file, batch.as_bytes(), || restore_handle.set_len(start)).map_err(
            |e| ChangelogError::StoreError {
                detail: format!("Failed to write audit records: {e}"),
            },
        )
    }

    fn query(&self, filter: &AuditQuery) -> Result<Vec<AuditRecord>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&self.log_path).map_err(|e| ChangelogError::StoreError {
            detail: format!("Cannot read audit log: {e}"),
        })?;

        let reader = BufReader::new(file);
        let mut records = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| ChangelogError::StoreError {
                detail: format!("Error reading audit log line {}: {e}", line_num + 1),
            })?;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let record: AuditRecord =
                serde_json::from_str(trimmed).map_err(|e| ChangelogError::StoreError {
                    detail: format!("Malformed audit record at line {}: {e}", line_num + 1),
                })?;

            if filter.matches(&record) {
                records.push(record);
            }
        }

        Ok(records)
    }
}
