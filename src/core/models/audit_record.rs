use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::errors::{ChangelogError, Result};
use crate::core::models::entity::EntityId;

/// Lifecycle actions that get recorded in the change log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Create,
    Update,
    Remove,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditAction::Create => write!(f, "create"),
            AuditAction::Update => write!(f, "update"),
            AuditAction::Remove => write!(f, "remove"),
        }
    }
}

impl FromStr for AuditAction {
    type Err = ChangelogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "create" => Ok(AuditAction::Create),
            "update" => Ok(AuditAction::Update),
            "remove" => Ok(AuditAction::Remove),
            other => Err(ChangelogError::InvalidConfig {
                detail: format!("Unknown action '{other}'. Expected create, update or remove"),
            }),
        }
    }
}

/// Normalized field changes of one update, in change-set order.
///
/// Serializes as a JSON object mapping each field to `[old, new]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangePayload {
    fields: Map<String, Value>,
}

impl ChangePayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, old: Value, new: Value) {
        self.fields.insert(field.into(), Value::Array(vec![old, new]));
    }

    /// The `(old, new)` pair recorded for `field`.
    pub fn get(&self, field: &str) -> Option<(&Value, &Value)> {
        match self.fields.get(field)? {
            Value::Array(pair) if pair.len() == 2 => Some((&pair[0], &pair[1])),
            _ => None,
        }
    }

    pub fn fields(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ChangelogError::Serialization {
            detail: format!("Failed to serialize change payload: {e}"),
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let payload: Self =
            serde_json::from_str(json).map_err(|e| ChangelogError::Serialization {
                detail: format!("Malformed change payload: {e}"),
            })?;

        for (field, value) in &payload.fields {
            if !matches!(value, Value::Array(pair) if pair.len() == 2) {
                return Err(ChangelogError::Serialization {
                    detail: format!("Field '{field}' is not an [old, new] pair"),
                });
            }
        }

        Ok(payload)
    }
}

/// A single entry of the change log (JSON lines format).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub subject_type: String,
    pub subject_id: EntityId,
    pub action: AuditAction,
    pub changes: Option<String>,
    pub logged_at: DateTime<Utc>,
}

impl AuditRecord {
    /// Decode the `changes` payload, if any.
    pub fn decoded_changes(&self) -> Result<Option<ChangePayload>> {
        self.changes
            .as_deref()
            .map(ChangePayload::from_json)
            .transpose()
    }
}
