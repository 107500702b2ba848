//! Attribute validation: constraint-rule engine with three modes and a
//! pluggable custom-rule table.

pub mod custom;
pub mod validator;

pub use custom::{CustomRule, CustomRuleContext, CustomRuleRegistry};
pub use validator::{AttributeValidator, ValidationMode};
