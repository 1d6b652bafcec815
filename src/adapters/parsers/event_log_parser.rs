use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::core::errors::{ChangelogError, Result};
use crate::core::models::change_set::{ChangeSet, FieldValue};
use crate::core::models::entity::{EntityHandle, EntityId};
use crate::core::models::lifecycle::LifecycleEvent;

/// Events of one unit of work, in delivery order.
pub type UnitOfWork = Vec<LifecycleEvent>;

/// One line of an event log.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
enum RawEvent {
    Create {
        #[serde(rename = "type")]
        type_name: String,
        id: Option<EntityId>,
    },
    Update {
        #[serde(rename = "type")]
        type_name: String,
        id: Option<EntityId>,
        #[serde(default)]
        changes: Map<String, Value>,
    },
    Remove {
        #[serde(rename = "type")]
        type_name: String,
        id: Option<EntityId>,
    },
    Flush,
}

/// Parses JSON-lines event logs into units of work.
///
/// Supports:
/// - `create` / `update` / `remove` events carrying `type` and `id`
/// - `update.changes` mapping each field to `[old, new]`
/// - `{"$ref": {"type": .., "id": ..}}` values for related objects
/// - `{"$stream": "..."}` values for stream payloads
/// - `flush` lines closing the current unit of work
/// - Blank lines and `#` comments
pub struct EventLogParser {
    source: PathBuf,
}

impl EventLogParser {
    pub fn new(source: &Path) -> Self {
        Self {
            source: source.to_path_buf(),
        }
    }

    /// Split the log into units of work. Events after the last `flush`
    /// form a final unit; empty units are dropped.
    pub fn parse(&self, content: &str) -> Result<Vec<UnitOfWork>> {
        let mut units = Vec::new();
        let mut current = UnitOfWork::new();

        for (idx, raw) in content.lines().enumerate() {
            let line = idx + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let event: RawEvent =
                serde_json::from_str(trimmed).map_err(|e| self.error(line, e.to_string()))?;

            match event {
                RawEvent::Create { type_name, id } => {
                    current.push(LifecycleEvent::Created(subject(type_name, id)));
                }
                RawEvent::Update {
                    type_name,
                    id,
                    changes,
                } => {
                    let change_set = self.change_set(line, changes)?;
                    current.push(LifecycleEvent::Updated(subject(type_name, id), change_set));
                }
                RawEvent::Remove { type_name, id } => {
                    current.push(LifecycleEvent::Removed(subject(type_name, id)));
                }
                RawEvent::Flush => {
                    if !current.is_empty() {
                        units.push(std::mem::take(&mut current));
                    }
                }
            }
        }

        if !current.is_empty() {
            units.push(current);
        }

        Ok(units)
    }

    fn change_set(&self, line: usize, changes: Map<String, Value>) -> Result<ChangeSet> {
        let mut set = ChangeSet::new();
        for (field, pair) in changes {
            let Value::Array(mut sides) = pair else {
                return Err(self.error(line, format!("field '{field}' must be [old, new]")));
            };
            if sides.len() != 2 {
                return Err(self.error(line, format!("field '{field}' must be [old, new]")));
            }
            let new = self.field_value(line, &field, sides.pop().unwrap_or_default())?;
            let old = self.field_value(line, &field, sides.pop().unwrap_or_default())?;
            set.insert(field, old, new);
        }
        Ok(set)
    }

    fn field_value(&self, line: usize, field: &str, value: Value) -> Result<FieldValue> {
        if let Value::Object(map) = &value
            && map.len() == 1
        {
            if let Some(reference) = map.get("$ref") {
                let handle: EntityHandle = serde_json::from_value(reference.clone())
                    .map_err(|e| self.error(line, format!("bad $ref in '{field}': {e}")))?;
                return Ok(FieldValue::reference(handle));
            }
            if let Some(stream) = map.get("$stream") {
                let Value::String(text) = stream else {
                    return Err(self.error(line, format!("$stream in '{field}' must be a string")));
                };
                return Ok(FieldValue::stream(text.clone()));
            }
        }
        Ok(FieldValue::Plain(value))
    }

    fn error(&self, line: usize, detail: String) -> ChangelogError {
        ChangelogError::ParseError {
            file: self.source.clone(),
            line,
            detail,
        }
    }
}

fn subject(type_name: String, id: Option<EntityId>) -> Arc<EntityHandle> {
    Arc::new(EntityHandle { type_name, id })
}
