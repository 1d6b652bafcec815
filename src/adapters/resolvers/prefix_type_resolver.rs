use crate::core::traits::type_resolver::TypeResolver;

/// Strips the first matching wrapper prefix from runtime type names.
#[derive(Debug, Clone, Default)]
pub struct PrefixTypeResolver {
    prefixes: Vec<String>,
}

impl PrefixTypeResolver {
    pub fn new(prefixes: Vec<String>) -> Self {
        Self { prefixes }
    }
}

impl TypeResolver for PrefixTypeResolver {
    fn canonical_type(&self, runtime_type: &str) -> String {
        self.prefixes
            .iter()
            .filter(|p| !p.is_empty())
            .find_map(|p| runtime_type.strip_prefix(p.as_str()))
            .unwrap_or(runtime_type)
            .to_string()
    }
}
