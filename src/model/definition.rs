//! Attribute definitions and constraint rules
//!
//! Definitions are scoped per entity type and are the single authority for
//! what an attribute is called, what type it carries and whether it must be
//! supplied. Constraints attach named rules to a definition.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::value::AttributeType;

/// Declared shape of an attribute for one entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub entity_type: String,
    pub name: String,
    pub value_type: AttributeType,
    pub required: bool,
}

impl AttributeDefinition {
    pub fn new(
        entity_type: impl Into<String>,
        name: impl Into<String>,
        value_type: AttributeType,
        required: bool,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            name: name.into(),
            value_type,
            required,
        }
    }
}

/// Named validation check attached to a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintRule {
    Type,
    Required,
    MinMax,
    Enum,
    Length,
    Custom,
}

impl ConstraintRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintRule::Type => "TYPE",
            ConstraintRule::Required => "REQUIRED",
            ConstraintRule::MinMax => "MIN_MAX",
            ConstraintRule::Enum => "ENUM",
            ConstraintRule::Length => "LENGTH",
            ConstraintRule::Custom => "CUSTOM",
        }
    }
}

impl fmt::Display for ConstraintRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rule bound to a definition, with the rule-specific configuration value:
/// `MIN_MAX` carries `"min,max"`, `ENUM` a comma-separated allow-list,
/// `LENGTH` a maximum length, `CUSTOM` the registered rule name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintDefinition {
    pub definition: AttributeDefinition,
    pub rule: ConstraintRule,
    pub rule_value: Option<String>,
}

impl ConstraintDefinition {
    pub fn new(definition: AttributeDefinition, rule: ConstraintRule) -> Self {
        Self {
            definition,
            rule,
            rule_value: None,
        }
    }

    pub fn with_value(
        definition: AttributeDefinition,
        rule: ConstraintRule,
        rule_value: impl Into<String>,
    ) -> Self {
        Self {
            definition,
            rule,
            rule_value: Some(rule_value.into()),
        }
    }
}
