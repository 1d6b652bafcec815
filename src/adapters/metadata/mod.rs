pub mod static_metadata;
