//! asset-core: schema-driven attributes for typed assets
//!
//! The engineering core of an asset service: a dynamically-typed yet
//! statically-checked attribute model, a pluggable constraint-validation
//! engine with three modes, a typed-condition-to-predicate compiler, and a
//! cardinality state machine over asset-to-target links.
//!
//! ## Flow
//!
//! ```text
//! raw payload → registry lookup → typed values → AttributesCollection
//!            → AttributeValidator (FULL | PARTIAL | STRICT) → accept/reject
//!
//! Condition (attribute, operator, typed value) → visitor dispatch
//!            → Predicate fragment, combined conjunctively
//!
//! CreateLinkCommand → definition lookup → duplicate check
//!            → cardinality check → accept/reject
//! ```
//!
//! Everything except the registry snapshot is synchronous, stateless and
//! side-effect-free over immutable inputs. Persistence, HTTP and event
//! transport are collaborators behind the narrow traits in [`registry`] and
//! [`links`].

pub mod error;
pub mod links;
pub mod model;
pub mod reader;
pub mod registry;
pub mod search;
pub mod validation;

pub use error::{
    AttributeError, CardinalitySide, CoreError, CoreResult, LinkError, QueryError, RegistryError,
    RuleViolation,
};
pub use links::{LinkService, LinkStore};
pub use model::{
    AssetLink, AttributeDefinition, AttributeType, AttributeValue, AttributesCollection,
    ConstraintDefinition, ConstraintRule, CreateLinkCommand, LinkCardinality, LinkDefinition,
    ScalarValue, ValueVisitor,
};
pub use reader::read_attributes;
pub use registry::{
    AttributeDefinitionRegistry, DefinitionStore, DirectorySchemaSource, InMemoryDefinitionStore,
    SchemaSource,
};
pub use search::{compile_condition, compile_search, Condition, ConditionOperator, Predicate};
pub use validation::{
    AttributeValidator, CustomRule, CustomRuleContext, CustomRuleRegistry, ValidationMode,
};
