use serde_json::Value;

use crate::core::errors::{ChangelogError, Result};
use crate::core::models::change_set::FieldValue;

/// Reduces changed values to a stable, serializable form.
///
/// - References to other objects become their identifier (`null` if unsaved)
/// - Stream payloads become their text
/// - Plain values pass through unchanged
pub struct ValueNormalizer;

impl ValueNormalizer {
    /// Normalize one side of a change to `field`.
    pub fn normalize(&self, field: &str, value: &FieldValue) -> Result<Value> {
        match value {
            FieldValue::Reference(entity) => {
                Ok(entity.identifier().map(Value::from).unwrap_or(Value::Null))
            }
            FieldValue::Stream(payload) => payload.read_text().map(Value::String).map_err(|e| {
                ChangelogError::Normalization {
                    field: field.to_string(),
                    detail: format!("stream payload is not readable as text: {e}"),
                }
            }),
            FieldValue::Plain(value) => Ok(value.clone()),
        }
    }
}
