use std::collections::HashSet;

use tracing::warn;

use crate::core::traits::metadata::MetadataReader;

/// Decides which objects and fields end up in the change log.
///
/// Holds the process-wide ignore list; the per-type answer is computed
/// fresh for every observed object through [`LoggabilityPolicy::for_type`].
pub struct LoggabilityPolicy<'a> {
    metadata: &'a dyn MetadataReader,
    ignored_fields: &'a HashSet<String>,
}

impl<'a> LoggabilityPolicy<'a> {
    pub fn new(metadata: &'a dyn MetadataReader, ignored_fields: &'a HashSet<String>) -> Self {
        Self {
            metadata,
            ignored_fields,
        }
    }

    /// Evaluate the policy for one runtime type.
    ///
    /// A failed metadata lookup makes the type not loggable.
    pub fn for_type(&self, type_name: &str) -> TypePolicy<'a> {
        let loggable = match self.metadata.is_auditable(type_name) {
            Ok(auditable) => auditable,
            Err(e) => {
                warn!(type_name, error = %e, "metadata lookup failed, type not logged");
                false
            }
        };

        TypePolicy {
            type_name: type_name.to_string(),
            loggable,
            metadata: self.metadata,
            ignored_fields: self.ignored_fields,
        }
    }
}

/// Policy answers for a single type.
pub struct TypePolicy<'a> {
    type_name: String,
    loggable: bool,
    metadata: &'a dyn MetadataReader,
    ignored_fields: &'a HashSet<String>,
}

impl TypePolicy<'_> {
    pub fn is_loggable(&self) -> bool {
        self.loggable
    }

    pub fn is_field_loggable(&self, field: &str) -> bool {
        if !self.loggable || self.ignored_fields.contains(field) {
            return false;
        }

        match self.metadata.is_field_auditable(&self.type_name, field) {
            Ok(auditable) => auditable,
            Err(e) => {
                warn!(
                    type_name = %self.type_name,
                    field,
                    error = %e,
                    "field metadata lookup failed, field not logged"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::{ChangelogError, Result};

    /// `Order` is auditable with `secret` excluded, `Draft` is known but
    /// not auditable, everything else is unknown.
    struct FakeMetadata;

    impl MetadataReader for FakeMetadata {
        fn is_auditable(&self, type_name: &str) -> Result<bool> {
            match type_name {
                "Order" => Ok(true),
                "Draft" => Ok(false),
                other => Err(ChangelogError::MetadataLookup {
                    type_name: other.to_string(),
                    detail: "unknown type".into(),
                }),
            }
        }

        fn is_field_auditable(&self, _type_name: &str, field: &str) -> Result<bool> {
            match field {
                "secret" => Ok(false),
                "broken" => Err(ChangelogError::MetadataLookup {
                    type_name: "Order".into(),
                    detail: "unreadable field".into(),
                }),
                _ => Ok(true),
            }
        }
    }

    fn ignored(fields: &[&str]) -> HashSet<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn auditable_type_is_loggable() {
        let ignore = ignored(&[]);
        let policy = LoggabilityPolicy::new(&FakeMetadata, &ignore);
        assert!(policy.for_type("Order").is_loggable());
    }

    #[test]
    fn unmarked_type_is_not_loggable() {
        let ignore = ignored(&[]);
        let policy = LoggabilityPolicy::new(&FakeMetadata, &ignore);
        assert!(!policy.for_type("Draft").is_loggable());
    }

    #[test]
    fn lookup_failure_fails_closed() {
        let ignore = ignored(&[]);
        let policy = LoggabilityPolicy::new(&FakeMetadata, &ignore);
        let type_policy = policy.for_type("Mystery");

        assert!(!type_policy.is_loggable());
        assert!(!type_policy.is_field_loggable("status"));
    }

    #[test]
    fn globally_ignored_field_is_skipped() {
        let ignore = ignored(&["updatedAt"]);
        let policy = LoggabilityPolicy::new(&FakeMetadata, &ignore);
        let type_policy = policy.for_type("Order");

        assert!(!type_policy.is_field_loggable("updatedAt"));
        assert!(type_policy.is_field_loggable("status"));
    }

    #[test]
    fn field_marked_non_auditable_is_skipped() {
        let ignore = ignored(&[]);
        let policy = LoggabilityPolicy::new(&FakeMetadata, &ignore);
        assert!(!policy.for_type("Order").is_field_loggable("secret"));
    }

    #[test]
    fn field_lookup_failure_fails_closed() {
        let ignore = ignored(&[]);
        let policy = LoggabilityPolicy::new(&FakeMetadata, &ignore);
        assert!(!policy.for_type("Order").is_field_loggable("broken"));
    }

    #[test]
    fn fields_of_unloggable_type_are_skipped() {
        let ignore = ignored(&[]);
        let policy = LoggabilityPolicy::new(&FakeMetadata, &ignore);
        assert!(!policy.for_type("Draft").is_field_loggable("status"));
    }
}
