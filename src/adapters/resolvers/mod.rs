pub mod prefix_type_resolver;
