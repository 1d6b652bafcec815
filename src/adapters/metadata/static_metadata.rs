use std::collections::{BTreeMap, HashMap, HashSet};

use crate::config::app_config::TypeEntry;
use crate::core::errors::{ChangelogError, Result};
use crate::core::traits::metadata::MetadataReader;

#[derive(Debug, Clone, Default)]
struct TypeMetadata {
    auditable: bool,
    skip_fields: HashSet<String>,
}

/// Metadata reader backed by a fixed table of known types.
///
/// Types that are not in the table are a lookup error, which the
/// loggability policy turns into "not logged".
#[derive(Debug, Clone, Default)]
pub struct StaticMetadataReader {
    types: HashMap<String, TypeMetadata>,
}

impl StaticMetadataReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the `[types]` table of the configuration.
    pub fn from_config(types: &BTreeMap<String, TypeEntry>) -> Self {
        let mut reader = Self::new();
        for (name, entry) in types {
            reader.insert(name, entry.auditable, entry.skip_fields.iter().cloned());
        }
        reader
    }

    /// Register (or replace) a type.
    pub fn insert(
        &mut self,
        type_name: impl Into<String>,
        auditable: bool,
        skip_fields: impl IntoIterator<Item = String>,
    ) {
        self.types.insert(
            type_name.into(),
            TypeMetadata {
                auditable,
                skip_fields: skip_fields.into_iter().collect(),
            },
        );
    }

    /// Builder-style registration of an auditable type.
    pub fn with_auditable(mut self, type_name: &str, skip_fields: &[&str]) -> Self {
        self.insert(
            type_name,
            true,
            skip_fields.iter().map(|f| f.to_string()),
        );
        self
    }

    fn lookup(&self, type_name: &str) -> Result<&TypeMetadata> {
        self.types
            .get(type_name)
            .ok_or_else(|| ChangelogError::MetadataLookup {
                type_name: type_name.to_string(),
                detail: "type is not declared in [types]".into(),
            })
    }
}

impl MetadataReader for StaticMetadataReader {
    fn is_auditable(&self, type_name: &str) -> Result<bool> {
        Ok(self.lookup(type_name)?.auditable)
    }

    fn is_field_auditable(&self, type_name: &str, field: &str) -> Result<bool> {
        Ok(!self.lookup(type_name)?.skip_fields.contains(field))
    }
}
