//! Custom validation rules
//!
//! CUSTOM constraints dispatch by name to an implementation the hosting
//! application registers at startup. An explicit registration table, not
//! reflection: name → rule, built once and handed to the validator.
//!
//! A rule sees the whole attribute collection plus the definition under
//! test, so cross-attribute checks (two attributes must hold equal values)
//! are expressible.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::RuleViolation;
use crate::model::{AttributeDefinition, AttributesCollection};

/// Everything a custom rule may inspect.
pub struct CustomRuleContext<'a> {
    pub attributes: &'a AttributesCollection,
    pub definition: &'a AttributeDefinition,
}

/// A named validation capability supplied by the hosting application.
pub trait CustomRule: Send + Sync {
    fn validate(&self, context: &CustomRuleContext<'_>) -> Result<(), RuleViolation>;
}

impl<F> CustomRule for F
where
    F: Fn(&CustomRuleContext<'_>) -> Result<(), RuleViolation> + Send + Sync,
{
    fn validate(&self, context: &CustomRuleContext<'_>) -> Result<(), RuleViolation> {
        self(context)
    }
}

/// Registration table of custom rules, keyed by the name CUSTOM constraints
/// carry as their rule value.
#[derive(Default, Clone)]
pub struct CustomRuleRegistry {
    rules: HashMap<String, Arc<dyn CustomRule>>,
}

impl CustomRuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, rule: impl CustomRule + 'static) {
        self.rules.insert(name.into(), Arc::new(rule));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn CustomRule>> {
        self.rules.get(name)
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl std::fmt::Debug for CustomRuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomRuleRegistry")
            .field("rules", &self.rules.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AttributeType, AttributeValue, ConstraintRule};

    #[test]
    fn closures_register_as_rules() {
        let mut registry = CustomRuleRegistry::new();
        registry.register("never-blue", |ctx: &CustomRuleContext<'_>| {
            match ctx.attributes.get(&ctx.definition.name).and_then(|v| v.as_text()) {
                Some("blue") => Err(RuleViolation::new(
                    ConstraintRule::Custom,
                    &ctx.definition.name,
                    "blue is not allowed here",
                )),
                _ => Ok(()),
            }
        });

        assert!(registry.is_registered("never-blue"));
        let definition = AttributeDefinition::new("device", "color", AttributeType::String, false);
        let attributes = AttributesCollection::new().add(AttributeValue::text("color", "blue"));
        let context = CustomRuleContext {
            attributes: &attributes,
            definition: &definition,
        };
        let err = registry.get("never-blue").unwrap().validate(&context).unwrap_err();
        assert_eq!(err.rule, ConstraintRule::Custom);
    }
}
