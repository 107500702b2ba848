//! Core data model: typed values, the attribute container, per-type
//! definitions and the link model.

pub mod collection;
pub mod definition;
pub mod link;
pub mod value;

pub use collection::AttributesCollection;
pub use definition::{AttributeDefinition, ConstraintDefinition, ConstraintRule};
pub use link::{AssetLink, CreateLinkCommand, LinkCardinality, LinkDefinition};
pub use value::{AttributeType, AttributeValue, ScalarValue, ValueVisitor};
