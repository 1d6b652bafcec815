pub mod audit;
pub mod metadata;
pub mod parsers;
pub mod resolvers;
