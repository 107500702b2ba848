//! Error taxonomy for the attribute core
//!
//! Every failure here is locally recoverable and caller-surfaced: nothing is
//! swallowed, nothing is retried internally. The hosting API layer translates
//! these into transport-level responses.

use std::fmt;

use thiserror::Error;

use crate::model::{AttributeType, ConstraintRule};
use crate::search::condition::ConditionOperator;

/// Failures while turning a raw payload into typed attribute values.
#[derive(Error, Debug)]
pub enum AttributeError {
    #[error("No attribute definition found for '{name}' on entity type '{entity_type}'")]
    MissingDefinition { entity_type: String, name: String },

    #[error("Value for attribute '{name}' is not compatible with declared type {expected}")]
    IncompatibleType {
        name: String,
        expected: AttributeType,
    },

    #[error("Invalid value for attribute '{name}': {reason}")]
    InvalidValue { name: String, reason: String },
}

/// A single constraint-rule failure. Carries the rule kind, the offending
/// attribute and a human-readable reason — rule failures never travel as
/// generic errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{rule} violation on attribute '{attribute}': {message}")]
pub struct RuleViolation {
    pub rule: ConstraintRule,
    pub attribute: String,
    pub message: String,
}

impl RuleViolation {
    pub fn new(
        rule: ConstraintRule,
        attribute: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule,
            attribute: attribute.into(),
            message: message.into(),
        }
    }
}

/// Which side of a relationship breached its cardinality limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardinalitySide {
    Asset,
    Target,
}

impl fmt::Display for CardinalitySide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardinalitySide::Asset => f.write_str("asset"),
            CardinalitySide::Target => f.write_str("target"),
        }
    }
}

/// Failures while creating or deactivating a link.
#[derive(Error, Debug)]
pub enum LinkError {
    #[error("Link definition not found for {entity_type}/{entity_subtype}")]
    DefinitionNotFound {
        entity_type: String,
        entity_subtype: String,
    },

    #[error("Link definition for {entity_type}/{entity_subtype} is inactive")]
    DefinitionInactive {
        entity_type: String,
        entity_subtype: String,
    },

    #[error("An active link already exists for asset '{asset_id}' and target '{target_code}' under {entity_type}/{entity_subtype}")]
    AlreadyExists {
        asset_id: String,
        target_code: String,
        entity_type: String,
        entity_subtype: String,
    },

    #[error("Cardinality violation: {side} '{id}' already has an active link under {entity_type}/{entity_subtype}")]
    CardinalityViolation {
        side: CardinalitySide,
        id: String,
        entity_type: String,
        entity_subtype: String,
    },

    #[error("No active link found for asset '{asset_id}' and target '{target_code}' under {entity_type}/{entity_subtype}")]
    NotFound {
        asset_id: String,
        target_code: String,
        entity_type: String,
        entity_subtype: String,
    },

    #[error("Link store error: {0}")]
    Store(#[from] anyhow::Error),
}

/// Failures while compiling conditions into predicates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Operator {operator} is not supported for attribute '{attribute}' of type {value_type}")]
    UnsupportedOperator {
        operator: ConditionOperator,
        attribute: String,
        value_type: AttributeType,
    },

    #[error("Operator {operator} cannot compare attribute '{attribute}' against a null value")]
    NullComparison {
        operator: ConditionOperator,
        attribute: String,
    },
}

/// Failures while loading or refreshing the definition registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Failed to load schema for entity type '{entity_type}': {reason}")]
    Schema { entity_type: String, reason: String },

    #[error("Failed to enumerate schema documents: {0}")]
    SchemaSource(#[source] std::io::Error),

    #[error("Definition store error: {0}")]
    Store(#[source] anyhow::Error),
}

/// Top-level error for callers that cross component boundaries.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Attribute(#[from] AttributeError),

    #[error(transparent)]
    Rule(#[from] RuleViolation),

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Result type aliases for convenience
pub type CoreResult<T> = Result<T, CoreError>;
pub type AttributeResult<T> = Result<T, AttributeError>;
pub type ValidationResult<T> = Result<T, RuleViolation>;
pub type LinkResult<T> = Result<T, LinkError>;
pub type QueryResult<T> = Result<T, QueryError>;
pub type RegistryResult<T> = Result<T, RegistryError>;
