//! Backend-neutral predicates
//!
//! The compiler's output: a predicate tree a storage layer can translate
//! into its own query language. No SQL is generated here. For non-SQL
//! backends and for tests, [`Predicate::evaluate`] interprets the tree
//! in memory with the same semantics the compiler promises.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::model::AttributesCollection;

/// Ordering half of a comparison leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CompareOp {
    Eq,
    Gt,
    Lt,
}

/// A storage-neutral predicate over an asset's attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Predicate {
    /// Conjunction of sub-predicates.
    And(Vec<Predicate>),
    /// The asset's entity type equals the given type.
    EntityType(String),
    /// The asset is not soft-deleted.
    NotDeleted,
    /// The attribute carries no non-null value.
    IsAbsent { attribute: String },
    /// Case-insensitive exact string match.
    TextEquals { attribute: String, value: String },
    /// Case-insensitive pattern match; `%` matches any run, `_` one char.
    TextLike { attribute: String, pattern: String },
    /// Numeric comparison against a decimal operand.
    NumberCompare {
        attribute: String,
        ordering: CompareOp,
        value: Decimal,
    },
    /// Exact boolean match.
    FlagEquals { attribute: String, value: bool },
    /// Chronological comparison against a timestamp operand.
    DateCompare {
        attribute: String,
        ordering: CompareOp,
        value: DateTime<Utc>,
    },
}

impl Predicate {
    /// Interpret the predicate against one asset's attributes.
    ///
    /// Multi-valued attributes match when any value satisfies the leaf.
    pub fn evaluate(
        &self,
        attributes: &AttributesCollection,
        entity_type: &str,
        deleted: bool,
    ) -> bool {
        match self {
            Predicate::And(parts) => parts
                .iter()
                .all(|p| p.evaluate(attributes, entity_type, deleted)),
            Predicate::EntityType(expected) => expected == entity_type,
            Predicate::NotDeleted => !deleted,
            Predicate::IsAbsent { attribute } => {
                attributes.get_all(attribute).iter().all(|v| v.is_null())
            }
            Predicate::TextEquals { attribute, value } => {
                let value = value.to_lowercase();
                attributes
                    .get_all(attribute)
                    .iter()
                    .filter_map(|v| v.as_text())
                    .any(|text| text.to_lowercase() == value)
            }
            Predicate::TextLike { attribute, pattern } => {
                let pattern: Vec<char> = pattern.to_lowercase().chars().collect();
                attributes
                    .get_all(attribute)
                    .iter()
                    .filter_map(|v| v.as_text())
                    .any(|text| {
                        let text: Vec<char> = text.to_lowercase().chars().collect();
                        like_match(&pattern, &text)
                    })
            }
            Predicate::NumberCompare {
                attribute,
                ordering,
                value,
            } => attributes
                .get_all(attribute)
                .iter()
                .filter_map(|v| v.as_number())
                .any(|n| compare(*ordering, n.cmp(value))),
            Predicate::FlagEquals { attribute, value } => attributes
                .get_all(attribute)
                .iter()
                .filter_map(|v| v.as_flag())
                .any(|b| b == *value),
            Predicate::DateCompare {
                attribute,
                ordering,
                value,
            } => attributes
                .get_all(attribute)
                .iter()
                .filter_map(|v| v.as_timestamp())
                .any(|t| compare(*ordering, t.cmp(value))),
        }
    }
}

fn compare(op: CompareOp, ordering: std::cmp::Ordering) -> bool {
    match op {
        CompareOp::Eq => ordering.is_eq(),
        CompareOp::Gt => ordering.is_gt(),
        CompareOp::Lt => ordering.is_lt(),
    }
}

/// SQL LIKE semantics over char slices; caller lowercases both sides.
///
/// Two-pointer scan with single-level `%` backtracking, so runtime stays
/// O(pattern x text) even for caller-supplied patterns with many wildcards.
fn like_match(pattern: &[char], text: &[char]) -> bool {
    let (mut p, mut t) = (0, 0);
    // last `%` seen and the text position its run currently ends at
    let mut resume: Option<(usize, usize)> = None;
    while t < text.len() {
        match pattern.get(p) {
            Some('%') => {
                resume = Some((p, t));
                p += 1;
            }
            Some('_') => {
                p += 1;
                t += 1;
            }
            Some(c) if *c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match resume {
                // grow the last `%` run by one char and retry
                Some((rp, rt)) => {
                    resume = Some((rp, rt + 1));
                    p = rp + 1;
                    t = rt + 1;
                }
                None => return false,
            },
        }
    }
    // text consumed; only trailing `%` runs may remain
    pattern[p..].iter().all(|c| *c == '%')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AttributeValue;

    fn matches_like(pattern: &str, text: &str) -> bool {
        let p: Vec<char> = pattern.chars().collect();
        let t: Vec<char> = text.chars().collect();
        like_match(&p, &t)
    }

    #[test]
    fn like_wildcards() {
        assert!(matches_like("%lue%", "blue"));
        assert!(matches_like("bl_e", "blue"));
        assert!(matches_like("%", ""));
        assert!(matches_like("blue", "blue"));
        assert!(!matches_like("bl_e", "blues"));
        assert!(!matches_like("green", "blue"));
    }

    #[test]
    fn like_handles_wildcard_heavy_patterns() {
        assert!(matches_like("%a%b%c%", "xxaxxbxxcxx"));
        assert!(matches_like("%%%blue%%%", "blue"));
        // many wildcards against a long non-matching text must still terminate
        let text = "a".repeat(200);
        assert!(!matches_like("%a%a%a%a%a%a%a%a%x", &text));
        assert!(matches_like("%a%a%a%a%a%a%a%a%", &text));
    }

    #[test]
    fn text_equals_folds_case_beyond_ascii() {
        let attrs = AttributesCollection::new().add(AttributeValue::text("city", "MÜNCHEN"));
        let p = Predicate::TextEquals {
            attribute: "city".to_string(),
            value: "münchen".to_string(),
        };
        assert!(p.evaluate(&attrs, "device", false));
    }

    #[test]
    fn is_absent_treats_nulls_as_absence() {
        let p = Predicate::IsAbsent {
            attribute: "color".to_string(),
        };
        let empty = AttributesCollection::new();
        assert!(p.evaluate(&empty, "device", false));

        let nulled = empty.clear("color", crate::model::AttributeType::String);
        assert!(p.evaluate(&nulled, "device", false));

        let filled = empty.add(AttributeValue::text("color", "blue"));
        assert!(!p.evaluate(&filled, "device", false));
    }

    #[test]
    fn multi_valued_attribute_matches_on_any_value() {
        let attrs = AttributesCollection::new()
            .add(AttributeValue::text("tags", "alpha"))
            .add(AttributeValue::text("tags", "beta"));
        let p = Predicate::TextEquals {
            attribute: "tags".to_string(),
            value: "BETA".to_string(),
        };
        assert!(p.evaluate(&attrs, "device", false));
    }
}
