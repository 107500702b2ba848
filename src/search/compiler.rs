//! Condition → predicate compilation
//!
//! Each condition dispatches on the stored operand's type through the same
//! visitor contract the value model exposes; the per-type handler then
//! switches on the operator. Unsupported operator/type pairings are hard
//! errors naming both. Conditions combine conjunctively alongside an
//! optional entity-type filter and an always-present not-soft-deleted guard.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::QueryError;
use crate::model::ValueVisitor;

use super::condition::{Condition, ConditionOperator};
use super::predicate::{CompareOp, Predicate};

/// Search entry point: compile an ordered condition list, with an optional
/// entity-type filter, into one conjunctive predicate.
pub fn compile_search(
    entity_type: Option<&str>,
    conditions: &[Condition],
) -> Result<Predicate, QueryError> {
    let mut parts = Vec::with_capacity(conditions.len() + 2);
    if let Some(entity_type) = entity_type {
        parts.push(Predicate::EntityType(entity_type.to_string()));
    }
    for condition in conditions {
        parts.push(compile_condition(condition)?);
    }
    parts.push(Predicate::NotDeleted);
    Ok(Predicate::And(parts))
}

/// Compile a single condition into a predicate leaf.
pub fn compile_condition(condition: &Condition) -> Result<Predicate, QueryError> {
    let mut compiler = ConditionCompiler {
        operator: condition.operator,
    };
    condition.value.accept(&mut compiler)
}

struct ConditionCompiler {
    operator: ConditionOperator,
}

impl ConditionCompiler {
    fn unsupported(
        &self,
        attribute: &str,
        value_type: crate::model::AttributeType,
    ) -> QueryError {
        QueryError::UnsupportedOperator {
            operator: self.operator,
            attribute: attribute.to_string(),
            value_type,
        }
    }

    fn null_comparison(&self, attribute: &str) -> QueryError {
        QueryError::NullComparison {
            operator: self.operator,
            attribute: attribute.to_string(),
        }
    }
}

impl ValueVisitor for ConditionCompiler {
    type Output = Result<Predicate, QueryError>;

    fn visit_string(&mut self, name: &str, value: Option<&str>) -> Self::Output {
        use ConditionOperator::*;
        match (self.operator, value) {
            (Eq, None) => Ok(Predicate::IsAbsent {
                attribute: name.to_string(),
            }),
            (Eq, Some(text)) => Ok(Predicate::TextEquals {
                attribute: name.to_string(),
                value: text.to_string(),
            }),
            (Like, Some(text)) => Ok(Predicate::TextLike {
                attribute: name.to_string(),
                pattern: wrap_pattern(text),
            }),
            (Like, None) => Err(self.null_comparison(name)),
            (Gt | Lt, _) => Err(self.unsupported(name, crate::model::AttributeType::String)),
        }
    }

    fn visit_decimal(&mut self, name: &str, value: Option<Decimal>) -> Self::Output {
        use ConditionOperator::*;
        let ordering = match self.operator {
            Eq => CompareOp::Eq,
            Gt => CompareOp::Gt,
            Lt => CompareOp::Lt,
            Like => return Err(self.unsupported(name, crate::model::AttributeType::Decimal)),
        };
        match (ordering, value) {
            (CompareOp::Eq, None) => Ok(Predicate::IsAbsent {
                attribute: name.to_string(),
            }),
            (_, None) => Err(self.null_comparison(name)),
            (ordering, Some(value)) => Ok(Predicate::NumberCompare {
                attribute: name.to_string(),
                ordering,
                value,
            }),
        }
    }

    fn visit_boolean(&mut self, name: &str, value: Option<bool>) -> Self::Output {
        use ConditionOperator::*;
        match (self.operator, value) {
            (Eq, None) => Ok(Predicate::IsAbsent {
                attribute: name.to_string(),
            }),
            (Eq, Some(value)) => Ok(Predicate::FlagEquals {
                attribute: name.to_string(),
                value,
            }),
            (Like | Gt | Lt, _) => {
                Err(self.unsupported(name, crate::model::AttributeType::Boolean))
            }
        }
    }

    fn visit_date(&mut self, name: &str, value: Option<DateTime<Utc>>) -> Self::Output {
        use ConditionOperator::*;
        let ordering = match self.operator {
            Eq => CompareOp::Eq,
            Gt => CompareOp::Gt,
            Lt => CompareOp::Lt,
            Like => return Err(self.unsupported(name, crate::model::AttributeType::Date)),
        };
        match (ordering, value) {
            (CompareOp::Eq, None) => Ok(Predicate::IsAbsent {
                attribute: name.to_string(),
            }),
            (_, None) => Err(self.null_comparison(name)),
            (ordering, Some(value)) => Ok(Predicate::DateCompare {
                attribute: name.to_string(),
                ordering,
                value,
            }),
        }
    }
}

/// Wrap a bare substring in `%…%`; a pattern the caller already shaped with
/// wildcard characters passes through untouched.
fn wrap_pattern(text: &str) -> String {
    if text.contains('%') || text.contains('_') {
        text.to_string()
    } else {
        format!("%{text}%")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AttributeType, AttributeValue};

    #[test]
    fn like_auto_wraps_bare_substrings() {
        assert_eq!(wrap_pattern("blue"), "%blue%");
        assert_eq!(wrap_pattern("bl%"), "bl%");
        assert_eq!(wrap_pattern("bl_e"), "bl_e");
    }

    #[test]
    fn null_eq_compiles_to_is_absent() {
        let condition = Condition::eq(AttributeValue::null("color", AttributeType::String));
        let predicate = compile_condition(&condition).unwrap();
        assert_eq!(
            predicate,
            Predicate::IsAbsent {
                attribute: "color".to_string()
            }
        );
    }

    #[test]
    fn null_ordering_comparison_is_an_error() {
        let condition = Condition::gt(AttributeValue::null("area", AttributeType::Decimal));
        let err = compile_condition(&condition).unwrap_err();
        assert!(matches!(err, QueryError::NullComparison { .. }));
    }

    #[test]
    fn unsupported_pairings_name_operator_and_attribute() {
        let condition = Condition::gt(AttributeValue::text("color", "blue"));
        let err = compile_condition(&condition).unwrap_err();
        match err {
            QueryError::UnsupportedOperator {
                operator,
                attribute,
                value_type,
            } => {
                assert_eq!(operator, ConditionOperator::Gt);
                assert_eq!(attribute, "color");
                assert_eq!(value_type, AttributeType::String);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn search_composes_conjunctively_with_guards() {
        let conditions = vec![Condition::eq(AttributeValue::text("color", "blue"))];
        let predicate = compile_search(Some("device"), &conditions).unwrap();
        let Predicate::And(parts) = predicate else {
            panic!("expected a conjunction");
        };
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], Predicate::EntityType("device".to_string()));
        assert_eq!(parts[2], Predicate::NotDeleted);
    }
}
