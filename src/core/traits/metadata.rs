use crate::core::errors::Result;

/// Port answering which types and fields are marked auditable.
///
/// An `Err` means the lookup itself failed (e.g. unknown type);
/// callers treat that as "not auditable".
pub trait MetadataReader: Send + Sync {
    /// Whether `type_name` carries the auditable marker.
    fn is_auditable(&self, type_name: &str) -> Result<bool>;

    /// Whether `field` of `type_name` is auditable on its own.
    fn is_field_auditable(&self, type_name: &str, field: &str) -> Result<bool>;
}
