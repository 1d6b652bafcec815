use std::fmt;
use std::sync::Arc;

use crate::core::models::entity::Identifiable;

/// Byte or stream-like payload that can be rendered as text.
pub trait TextLike: fmt::Debug + Send + Sync {
    fn read_text(&self) -> std::io::Result<String>;
}

impl TextLike for String {
    fn read_text(&self) -> std::io::Result<String> {
        Ok(self.clone())
    }
}

impl TextLike for Vec<u8> {
    fn read_text(&self) -> std::io::Result<String> {
        String::from_utf8(self.clone())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

/// One side of a field change as delivered by the host's dirty tracking.
#[derive(Debug, Clone)]
pub enum FieldValue {
    /// Another stored object; only its identifier ends up in the log.
    Reference(Arc<dyn Identifiable>),
    /// Stream-like payload, logged as its text.
    Stream(Arc<dyn TextLike>),
    /// Primitives and plain structures.
    Plain(serde_json::Value),
}

impl FieldValue {
    pub fn reference(entity: impl Identifiable + 'static) -> Self {
        FieldValue::Reference(Arc::new(entity))
    }

    pub fn stream(payload: impl TextLike + 'static) -> Self {
        FieldValue::Stream(Arc::new(payload))
    }

    pub fn null() -> Self {
        FieldValue::Plain(serde_json::Value::Null)
    }
}

macro_rules! plain_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    FieldValue::Plain(value.into())
                }
            }
        )*
    };
}

plain_from!(serde_json::Value, &str, String, bool, i32, i64, u32, u64, f64);

/// Old and new value of a single field.
#[derive(Debug, Clone)]
pub struct FieldChange {
    pub old: FieldValue,
    pub new: FieldValue,
}

/// Per-field changes of one object during one unit of work.
///
/// Keeps insertion order; field names are unique.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    entries: Vec<(String, FieldChange)>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change. A field that is already present keeps its position
    /// and gets the new pair.
    pub fn insert(
        &mut self,
        field: impl Into<String>,
        old: impl Into<FieldValue>,
        new: impl Into<FieldValue>,
    ) {
        let field = field.into();
        let change = FieldChange {
            old: old.into(),
            new: new.into(),
        };
        match self.entries.iter_mut().find(|(name, _)| *name == field) {
            Some((_, existing)) => *existing = change,
            None => self.entries.push((field, change)),
        }
    }

    /// Builder-style `insert`.
    pub fn with(
        mut self,
        field: impl Into<String>,
        old: impl Into<FieldValue>,
        new: impl Into<FieldValue>,
    ) -> Self {
        self.insert(field, old, new);
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldChange> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, change)| change)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldChange)> {
        self.entries
            .iter()
            .map(|(name, change)| (name.as_str(), change))
    }

    pub fn fields(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
