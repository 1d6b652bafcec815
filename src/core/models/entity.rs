use std::fmt;

use serde::{Deserialize, Serialize};

/// Primary identifier of a tracked object.
///
/// Serialized untagged so integer keys stay numbers in the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Int(i64),
    Str(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Int(n) => write!(f, "{n}"),
            EntityId::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        EntityId::Int(value)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        EntityId::Str(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        EntityId::Str(value)
    }
}

impl From<EntityId> for serde_json::Value {
    fn from(id: EntityId) -> Self {
        match id {
            EntityId::Int(n) => serde_json::Value::from(n),
            EntityId::Str(s) => serde_json::Value::String(s),
        }
    }
}

/// Anything that exposes a primary identifier.
///
/// Returns `None` while the object has not been assigned one yet
/// (e.g. a related object that was never stored).
pub trait Identifiable: fmt::Debug + Send + Sync {
    fn identifier(&self) -> Option<EntityId>;
}

/// A tracked object as seen by the observer.
///
/// `type_name` is the host's runtime type name and may carry a wrapper
/// prefix; it is canonicalized when the record is built.
pub trait Auditable: Identifiable {
    fn type_name(&self) -> &str;
}

/// Plain handle to a stored object: its runtime type and identifier.
///
/// Hosts that do not want to implement the traits on their own types
/// can describe subjects and references with this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityHandle {
    #[serde(rename = "type")]
    pub type_name: String,
    pub id: Option<EntityId>,
}

impl EntityHandle {
    pub fn new(type_name: impl Into<String>, id: impl Into<EntityId>) -> Self {
        Self {
            type_name: type_name.into(),
            id: Some(id.into()),
        }
    }

    /// A handle for an object that has no identifier yet.
    pub fn unsaved(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            id: None,
        }
    }
}

impl Identifiable for EntityHandle {
    fn identifier(&self) -> Option<EntityId> {
        self.id.clone()
    }
}

impl Auditable for EntityHandle {
    fn type_name(&self) -> &str {
        &self.type_name
    }
}
