/// Port mapping a runtime type name to the logical domain type name.
///
/// Hosts whose lazy-loading wrappers rename types plug in a resolver
/// that undoes the renaming.
pub trait TypeResolver: Send + Sync {
    fn canonical_type(&self, runtime_type: &str) -> String;
}

/// Resolver for hosts that never wrap types.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTypeResolver;

impl TypeResolver for IdentityTypeResolver {
    fn canonical_type(&self, runtime_type: &str) -> String {
        runtime_type.to_string()
    }
}
