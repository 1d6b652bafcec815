use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::core::errors::{ChangelogError, Result};

/// Top-level configuration read from `.changelog/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub changelog: ChangelogSection,
    pub audit: Option<AuditSection>,
    #[serde(default)]
    pub types: BTreeMap<String, TypeEntry>,
}

impl AppConfig {
    /// Load the configuration from `{dir}/config.toml`.
    ///
    /// After parsing, validates the audit log filename and type names.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join("config.toml");
        if !config_path.exists() {
            return Err(ChangelogError::InvalidConfig {
                detail: "config.toml not found. Run 'changelog init' first.".into(),
            });
        }
        let content = std::fs::read_to_string(&config_path)?;
        Self::parse(&content)
    }

    /// Parse and validate configuration text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ChangelogError::InvalidConfig {
            detail: format!("Failed to parse config.toml: {e}"),
        })?;

        if config.changelog.format_version > CURRENT_FORMAT_VERSION {
            return Err(ChangelogError::FormatVersionTooNew {
                project_version: config.changelog.format_version,
                supported_version: CURRENT_FORMAT_VERSION,
            });
        }

        for type_name in config.types.keys() {
            if type_name.trim().is_empty() {
                return Err(ChangelogError::InvalidConfig {
                    detail: "Type names in [types] cannot be empty".into(),
                });
            }
        }

        if let Some(audit) = &config.audit {
            validate_simple_filename(&audit.log_file, "audit log file")?;
        }

        Ok(config)
    }

    /// The global field denylist as a set.
    pub fn ignored_fields(&self) -> HashSet<String> {
        self.changelog.ignored_fields.iter().cloned().collect()
    }
}

/// Current format version supported by this build.
pub const CURRENT_FORMAT_VERSION: u32 = 1;

/// The `[changelog]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangelogSection {
    /// Format version for backward compatibility. Defaults to 1 if missing.
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    /// Field names never logged, whatever the type.
    #[serde(default)]
    pub ignored_fields: Vec<String>,
    /// Runtime type-name prefixes added by lazy-loading wrappers.
    #[serde(default)]
    pub proxy_prefixes: Vec<String>,
}

fn default_format_version() -> u32 {
    1
}

/// The `[audit]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditSection {
    pub enabled: bool,
    pub log_file: String,
}

/// A `[types.<Name>]` entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TypeEntry {
    #[serde(default)]
    pub auditable: bool,
    /// Fields of this type that are never logged.
    #[serde(default)]
    pub skip_fields: Vec<String>,
}

/// Reject anything that is not a plain file name.
fn validate_simple_filename(name: &str, what: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\');
    if invalid {
        return Err(ChangelogError::InvalidConfig {
            detail: format!("Invalid {what} '{name}': must be a plain file name"),
        });
    }
    Ok(())
}
