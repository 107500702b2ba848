//! Constraint-rule evaluation
//!
//! Validates an attribute collection against the registry's constraint
//! chains for the entity type. Evaluation is fail-fast: the first violation
//! aborts validation and is surfaced. Per-attribute rule order is the
//! registry's deterministic chain (TYPE before value-shape rules before
//! CUSTOM).

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::RuleViolation;
use crate::model::{AttributesCollection, ConstraintDefinition, ConstraintRule};
use crate::registry::AttributeDefinitionRegistry;

use super::custom::{CustomRuleContext, CustomRuleRegistry};

/// Governs how omission and unknown names are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// REQUIRED is enforced even for names entirely absent from the input.
    #[default]
    Full,
    /// REQUIRED is skipped for absent names. A name present with a null
    /// value still fails: supplied-but-empty is a violation, not an
    /// omission.
    Partial,
    /// FULL, plus any input name without a matching definition is rejected.
    Strict,
}

/// Validates collections against per-entity-type constraint chains.
pub struct AttributeValidator {
    registry: Arc<AttributeDefinitionRegistry>,
    custom_rules: Arc<CustomRuleRegistry>,
}

impl AttributeValidator {
    pub fn new(
        registry: Arc<AttributeDefinitionRegistry>,
        custom_rules: Arc<CustomRuleRegistry>,
    ) -> Self {
        Self {
            registry,
            custom_rules,
        }
    }

    /// Validate `attributes` for `entity_type` under `mode`. Returns the
    /// first violation encountered.
    pub fn validate(
        &self,
        entity_type: &str,
        attributes: &AttributesCollection,
        mode: ValidationMode,
    ) -> Result<(), RuleViolation> {
        let result = self.run(entity_type, attributes, mode);
        if let Err(violation) = &result {
            debug!(
                entity_type,
                rule = %violation.rule,
                attribute = %violation.attribute,
                "attribute validation failed"
            );
        }
        result
    }

    fn run(
        &self,
        entity_type: &str,
        attributes: &AttributesCollection,
        mode: ValidationMode,
    ) -> Result<(), RuleViolation> {
        let definitions = self.registry.definitions(entity_type);
        let constraints = self.registry.constraints(entity_type);

        if mode == ValidationMode::Strict {
            for name in attributes.names() {
                if !definitions.contains_key(name) {
                    return Err(RuleViolation::new(
                        ConstraintRule::Type,
                        name,
                        format!("Unknown attribute definition: '{name}'"),
                    ));
                }
            }
        }

        // Present names, in input order.
        for name in attributes.names() {
            let Some(chain) = constraints.get(name) else {
                continue;
            };
            for constraint in chain {
                self.check(constraint, attributes)?;
            }
        }

        // Absent names: REQUIRED applies unless the mode tolerates omission.
        if mode != ValidationMode::Partial {
            let mut missing: Vec<&str> = definitions
                .values()
                .filter(|d| d.required && !attributes.contains(&d.name))
                .map(|d| d.name.as_str())
                .collect();
            missing.sort_unstable();
            if let Some(name) = missing.first() {
                return Err(required_violation(name));
            }
        }

        Ok(())
    }

    fn check(
        &self,
        constraint: &ConstraintDefinition,
        attributes: &AttributesCollection,
    ) -> Result<(), RuleViolation> {
        let name = &constraint.definition.name;
        let values = attributes.get_all(name);

        match constraint.rule {
            ConstraintRule::Type => {
                for value in values {
                    if value.value_type() != constraint.definition.value_type {
                        return Err(RuleViolation::new(
                            ConstraintRule::Type,
                            name,
                            format!(
                                "Attribute type mismatch: '{name}' expected {}, actual {}",
                                constraint.definition.value_type,
                                value.value_type()
                            ),
                        ));
                    }
                }
                Ok(())
            }
            ConstraintRule::Required => {
                // Only reached for present names; absence is handled per
                // mode by the caller. A present name must carry a non-null
                // value.
                if values.iter().all(|v| v.is_null()) {
                    return Err(required_violation(name));
                }
                Ok(())
            }
            ConstraintRule::MinMax => self.check_min_max(constraint, attributes),
            ConstraintRule::Enum => self.check_enum(constraint, attributes),
            ConstraintRule::Length => self.check_length(constraint, attributes),
            ConstraintRule::Custom => self.check_custom(constraint, attributes),
        }
    }

    /// Inclusive decimal bounds, rule value `"min,max"`. Applies to decimal
    /// values only; null and non-decimal values pass through.
    fn check_min_max(
        &self,
        constraint: &ConstraintDefinition,
        attributes: &AttributesCollection,
    ) -> Result<(), RuleViolation> {
        let name = &constraint.definition.name;
        let raw = constraint.rule_value.as_deref().unwrap_or_default();
        let Some((min, max)) = parse_bounds(raw) else {
            return Err(RuleViolation::new(
                ConstraintRule::MinMax,
                name,
                format!("Invalid MIN_MAX bounds '{raw}', expected 'min,max'"),
            ));
        };

        for value in attributes.get_all(name) {
            let Some(number) = value.as_number() else {
                continue;
            };
            if number < min {
                return Err(RuleViolation::new(
                    ConstraintRule::MinMax,
                    name,
                    format!("Value {number} of attribute '{name}' is less than minimum {min}"),
                ));
            }
            if number > max {
                return Err(RuleViolation::new(
                    ConstraintRule::MinMax,
                    name,
                    format!("Value {number} of attribute '{name}' exceeds maximum {max}"),
                ));
            }
        }
        Ok(())
    }

    /// Comma-separated allow-list. Applies to string values only.
    fn check_enum(
        &self,
        constraint: &ConstraintDefinition,
        attributes: &AttributesCollection,
    ) -> Result<(), RuleViolation> {
        let name = &constraint.definition.name;
        let raw = constraint.rule_value.as_deref().unwrap_or_default();
        let allowed: Vec<&str> = raw.split(',').map(str::trim).collect();

        for value in attributes.get_all(name) {
            let Some(text) = value.as_text() else {
                continue;
            };
            if !allowed.contains(&text) {
                return Err(RuleViolation::new(
                    ConstraintRule::Enum,
                    name,
                    format!(
                        "Value '{text}' of attribute '{name}' is not allowed (expected one of: {raw})"
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Maximum character length. Applies to string values only.
    fn check_length(
        &self,
        constraint: &ConstraintDefinition,
        attributes: &AttributesCollection,
    ) -> Result<(), RuleViolation> {
        let name = &constraint.definition.name;
        let raw = constraint.rule_value.as_deref().unwrap_or_default();
        let Ok(max) = raw.parse::<usize>() else {
            return Err(RuleViolation::new(
                ConstraintRule::Length,
                name,
                format!("Invalid LENGTH rule value '{raw}', expected a maximum length"),
            ));
        };

        for value in attributes.get_all(name) {
            let Some(text) = value.as_text() else {
                continue;
            };
            if text.chars().count() > max {
                return Err(RuleViolation::new(
                    ConstraintRule::Length,
                    name,
                    format!("Length must be less than or equal to {max}"),
                ));
            }
        }
        Ok(())
    }

    fn check_custom(
        &self,
        constraint: &ConstraintDefinition,
        attributes: &AttributesCollection,
    ) -> Result<(), RuleViolation> {
        let name = &constraint.definition.name;
        let Some(rule_name) = constraint.rule_value.as_deref() else {
            return Err(RuleViolation::new(
                ConstraintRule::Custom,
                name,
                "CUSTOM constraint is missing a rule name".to_string(),
            ));
        };
        let Some(rule) = self.custom_rules.get(rule_name) else {
            return Err(RuleViolation::new(
                ConstraintRule::Custom,
                name,
                format!("Custom rule '{rule_name}' is not registered"),
            ));
        };
        rule.validate(&CustomRuleContext {
            attributes,
            definition: &constraint.definition,
        })
    }
}

fn required_violation(name: &str) -> RuleViolation {
    RuleViolation::new(
        ConstraintRule::Required,
        name,
        format!("Attribute '{name}' is required"),
    )
}

fn parse_bounds(raw: &str) -> Option<(Decimal, Decimal)> {
    let (min, max) = raw.split_once(',')?;
    let min = Decimal::from_str(min.trim()).ok()?;
    let max = Decimal::from_str(max.trim()).ok()?;
    Some((min, max))
}
