pub mod audit;
pub mod metadata;
pub mod type_resolver;
