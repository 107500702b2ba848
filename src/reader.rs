//! Raw payload reading
//!
//! Turns an inbound JSON object into a typed [`AttributesCollection`], driven
//! entirely by the definitions the registry resolves for the entity type.
//! Unknown names, JSON shapes that cannot satisfy the declared type, and
//! well-shaped but unparsable content each fail with their own error kind.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::error::AttributeError;
use crate::model::{AttributeDefinition, AttributeType, AttributeValue, AttributesCollection};

/// Read a raw JSON object into a typed collection.
///
/// `definitions` is the merged registry view for one entity type. A JSON
/// array becomes a multi-valued attribute in order; JSON `null` becomes a
/// typed null entry; an empty array contributes nothing.
pub fn read_attributes(
    entity_type: &str,
    definitions: &HashMap<String, AttributeDefinition>,
    payload: &Value,
) -> Result<AttributesCollection, AttributeError> {
    let object = payload.as_object().ok_or_else(|| AttributeError::InvalidValue {
        name: "$".to_string(),
        reason: "attribute payload must be a JSON object".to_string(),
    })?;

    let mut collection = AttributesCollection::new();
    for (name, raw) in object {
        let definition = definitions
            .get(name)
            .ok_or_else(|| AttributeError::MissingDefinition {
                entity_type: entity_type.to_string(),
                name: name.clone(),
            })?;

        match raw {
            Value::Array(items) => {
                for item in items {
                    collection = collection.add(read_scalar(definition, item)?);
                }
            }
            single => collection = collection.add(read_scalar(definition, single)?),
        }
    }
    Ok(collection)
}

fn read_scalar(
    definition: &AttributeDefinition,
    raw: &Value,
) -> Result<AttributeValue, AttributeError> {
    if raw.is_null() {
        return Ok(AttributeValue::null(&definition.name, definition.value_type));
    }

    match definition.value_type {
        AttributeType::String => match raw.as_str() {
            Some(s) => Ok(AttributeValue::text(&definition.name, s)),
            None => Err(incompatible(definition)),
        },
        AttributeType::Boolean => match raw.as_bool() {
            Some(b) => Ok(AttributeValue::flag(&definition.name, b)),
            None => Err(incompatible(definition)),
        },
        AttributeType::Decimal => match raw {
            Value::Number(n) => parse_decimal(&n.to_string())
                .map(|d| AttributeValue::number(&definition.name, d))
                .ok_or_else(|| invalid(definition, format!("unparsable number '{n}'"))),
            Value::String(s) => parse_decimal(s)
                .map(|d| AttributeValue::number(&definition.name, d))
                .ok_or_else(|| invalid(definition, format!("unparsable decimal '{s}'"))),
            _ => Err(incompatible(definition)),
        },
        AttributeType::Date => match raw.as_str() {
            Some(s) => DateTime::parse_from_rfc3339(s)
                .map(|t| AttributeValue::timestamp(&definition.name, t.with_timezone(&Utc)))
                .map_err(|e| invalid(definition, format!("unparsable date '{s}': {e}"))),
            None => Err(incompatible(definition)),
        },
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

fn incompatible(definition: &AttributeDefinition) -> AttributeError {
    AttributeError::IncompatibleType {
        name: definition.name.clone(),
        expected: definition.value_type,
    }
}

fn invalid(definition: &AttributeDefinition, reason: String) -> AttributeError {
    AttributeError::InvalidValue {
        name: definition.name.clone(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn defs() -> HashMap<String, AttributeDefinition> {
        [
            ("color", AttributeType::String, false),
            ("area", AttributeType::Decimal, false),
            ("active", AttributeType::Boolean, false),
            ("installed_at", AttributeType::Date, false),
            ("tags", AttributeType::String, false),
        ]
        .into_iter()
        .map(|(name, value_type, required)| {
            (
                name.to_string(),
                AttributeDefinition::new("device", name, value_type, required),
            )
        })
        .collect()
    }

    #[test]
    fn reads_typed_scalars() {
        let c = read_attributes(
            "device",
            &defs(),
            &json!({
                "color": "blue",
                "area": 3.0,
                "active": true,
                "installed_at": "2024-03-01T10:00:00Z",
            }),
        )
        .unwrap();

        assert_eq!(c.get("color").unwrap().as_text(), Some("blue"));
        assert_eq!(c.get("area").unwrap().as_number().unwrap().to_string(), "3");
        assert_eq!(c.get("active").unwrap().as_flag(), Some(true));
        assert!(c.get("installed_at").unwrap().as_timestamp().is_some());
    }

    #[test]
    fn array_payload_preserves_order() {
        let c = read_attributes("device", &defs(), &json!({ "tags": ["a", "b", "c"] })).unwrap();
        let texts: Vec<_> = c.get_all("tags").iter().map(|v| v.as_text().unwrap()).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[test]
    fn numeric_string_parses_for_decimal() {
        let c = read_attributes("device", &defs(), &json!({ "area": "150.00" })).unwrap();
        assert_eq!(c.get("area").unwrap().as_number().unwrap().to_string(), "150");
    }

    #[test]
    fn null_becomes_typed_null() {
        let c = read_attributes("device", &defs(), &json!({ "area": null })).unwrap();
        let v = c.get("area").unwrap();
        assert!(v.is_null());
        assert_eq!(v.value_type(), AttributeType::Decimal);
    }

    #[test]
    fn unknown_name_is_missing_definition() {
        let err = read_attributes("device", &defs(), &json!({ "bogus": 1 })).unwrap_err();
        assert!(matches!(err, AttributeError::MissingDefinition { name, .. } if name == "bogus"));
    }

    #[test]
    fn wrong_shape_is_incompatible_type() {
        let err = read_attributes("device", &defs(), &json!({ "active": "yes" })).unwrap_err();
        assert!(matches!(err, AttributeError::IncompatibleType { .. }));
    }

    #[test]
    fn bad_date_text_is_invalid_value() {
        let err = read_attributes("device", &defs(), &json!({ "installed_at": "yesterday" })).unwrap_err();
        assert!(matches!(err, AttributeError::InvalidValue { .. }));
    }

    #[test]
    fn decimal_round_trip_is_normalization_idempotent() {
        let c = read_attributes("device", &defs(), &json!({ "area": 3.0 })).unwrap();
        let again = read_attributes("device", &defs(), &c.to_json()).unwrap();
        assert_eq!(
            again.get("area").unwrap().as_number(),
            Some(Decimal::from(3))
        );
        assert_eq!(c, again);
    }

    #[test]
    fn high_precision_decimal_survives_round_trip() {
        let fine = Decimal::from_str("0.12345678901234567891").unwrap();
        let c = AttributesCollection::new().add(AttributeValue::number("area", fine));
        let again = read_attributes("device", &defs(), &c.to_json()).unwrap();
        assert_eq!(again.get("area").unwrap().as_number(), Some(fine));
    }
}
