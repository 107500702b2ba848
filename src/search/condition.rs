//! Search conditions
//!
//! A condition is one (attribute, operator, typed operand) fragment prior to
//! compilation. The operand is a full [`AttributeValue`], so the compiler can
//! dispatch on the stored type rather than on the operator.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::AttributeValue;

/// Comparison operator of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConditionOperator {
    Eq,
    Like,
    Gt,
    Lt,
}

impl ConditionOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionOperator::Eq => "EQ",
            ConditionOperator::Like => "LIKE",
            ConditionOperator::Gt => "GT",
            ConditionOperator::Lt => "LT",
        }
    }
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One search predicate fragment. The operand carries the attribute name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    pub operator: ConditionOperator,
    pub value: AttributeValue,
}

impl Condition {
    pub fn new(operator: ConditionOperator, value: AttributeValue) -> Self {
        Self { operator, value }
    }

    pub fn eq(value: AttributeValue) -> Self {
        Self::new(ConditionOperator::Eq, value)
    }

    pub fn like(value: AttributeValue) -> Self {
        Self::new(ConditionOperator::Like, value)
    }

    pub fn gt(value: AttributeValue) -> Self {
        Self::new(ConditionOperator::Gt, value)
    }

    pub fn lt(value: AttributeValue) -> Self {
        Self::new(ConditionOperator::Lt, value)
    }

    /// Name of the attribute under comparison.
    pub fn attribute(&self) -> &str {
        self.value.name()
    }
}
