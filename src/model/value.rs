//! Typed attribute values
//!
//! Attributes carry one of a closed set of runtime types. The set is closed
//! on purpose: every dispatch site matches exhaustively, so adding a type
//! breaks every visitor at compile time instead of at runtime.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AttributeError;

/// Runtime type of an attribute value. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttributeType {
    String,
    Decimal,
    Boolean,
    Date,
}

impl AttributeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeType::String => "STRING",
            AttributeType::Decimal => "DECIMAL",
            AttributeType::Boolean => "BOOLEAN",
            AttributeType::Date => "DATE",
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The actual payload of a non-null attribute value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Text(String),
    Number(Decimal),
    Flag(bool),
    Timestamp(DateTime<Utc>),
}

impl ScalarValue {
    /// Runtime type of this scalar.
    pub fn runtime_type(&self) -> AttributeType {
        match self {
            ScalarValue::Text(_) => AttributeType::String,
            ScalarValue::Number(_) => AttributeType::Decimal,
            ScalarValue::Flag(_) => AttributeType::Boolean,
            ScalarValue::Timestamp(_) => AttributeType::Date,
        }
    }
}

/// A named, typed, immutable attribute value.
///
/// The value may be absent (`None`), which represents an explicitly
/// null-valued attribute of a known type — distinct from the attribute not
/// being present in a collection at all. Decimal payloads are normalized on
/// construction (trailing fractional zeros stripped), so `3.0` and `3`
/// compare and serialize identically.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeValue {
    name: String,
    value_type: AttributeType,
    value: Option<ScalarValue>,
}

impl AttributeValue {
    /// Build a value from a scalar, taking the type from the scalar itself.
    pub fn from_scalar(name: impl Into<String>, scalar: ScalarValue) -> Self {
        let scalar = normalize(scalar);
        Self {
            name: name.into(),
            value_type: scalar.runtime_type(),
            value: Some(scalar),
        }
    }

    /// A string-typed value.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::from_scalar(name, ScalarValue::Text(value.into()))
    }

    /// A decimal-typed value. The decimal is normalized.
    pub fn number(name: impl Into<String>, value: Decimal) -> Self {
        Self::from_scalar(name, ScalarValue::Number(value))
    }

    /// A boolean-typed value.
    pub fn flag(name: impl Into<String>, value: bool) -> Self {
        Self::from_scalar(name, ScalarValue::Flag(value))
    }

    /// A date-typed value.
    pub fn timestamp(name: impl Into<String>, value: DateTime<Utc>) -> Self {
        Self::from_scalar(name, ScalarValue::Timestamp(value))
    }

    /// An explicitly null value of the given type.
    pub fn null(name: impl Into<String>, value_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            value_type,
            value: None,
        }
    }

    /// Return a new instance carrying `value` instead of the current one.
    ///
    /// The replacement must agree with the declared type; a mismatched
    /// scalar is rejected rather than silently retyping the attribute.
    pub fn with_value(&self, value: Option<ScalarValue>) -> Result<Self, AttributeError> {
        if let Some(scalar) = &value {
            if scalar.runtime_type() != self.value_type {
                return Err(AttributeError::IncompatibleType {
                    name: self.name.clone(),
                    expected: self.value_type,
                });
            }
        }
        Ok(Self {
            name: self.name.clone(),
            value_type: self.value_type,
            value: value.map(normalize),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> AttributeType {
        self.value_type
    }

    pub fn value(&self) -> Option<&ScalarValue> {
        self.value.as_ref()
    }

    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }

    /// The string payload, if this is a non-null string value.
    pub fn as_text(&self) -> Option<&str> {
        match &self.value {
            Some(ScalarValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// The decimal payload, if this is a non-null decimal value.
    pub fn as_number(&self) -> Option<Decimal> {
        match &self.value {
            Some(ScalarValue::Number(d)) => Some(*d),
            _ => None,
        }
    }

    /// The boolean payload, if this is a non-null boolean value.
    pub fn as_flag(&self) -> Option<bool> {
        match &self.value {
            Some(ScalarValue::Flag(b)) => Some(*b),
            _ => None,
        }
    }

    /// The timestamp payload, if this is a non-null date value.
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match &self.value {
            Some(ScalarValue::Timestamp(t)) => Some(*t),
            _ => None,
        }
    }

    /// Dispatch on the declared type. Shared by serialization and the
    /// predicate compiler.
    pub fn accept<V: ValueVisitor>(&self, visitor: &mut V) -> V::Output {
        match self.value_type {
            AttributeType::String => visitor.visit_string(self.name(), self.as_text()),
            AttributeType::Decimal => visitor.visit_decimal(self.name(), self.as_number()),
            AttributeType::Boolean => visitor.visit_boolean(self.name(), self.as_flag()),
            AttributeType::Date => visitor.visit_date(self.name(), self.as_timestamp()),
        }
    }

    /// JSON shape of the payload alone (the name is the caller's key).
    pub fn value_json(&self) -> serde_json::Value {
        match &self.value {
            None => serde_json::Value::Null,
            Some(ScalarValue::Text(s)) => serde_json::Value::String(s.clone()),
            Some(ScalarValue::Flag(b)) => serde_json::Value::Bool(*b),
            Some(ScalarValue::Timestamp(t)) => serde_json::Value::String(t.to_rfc3339()),
            Some(ScalarValue::Number(d)) => d
                .to_string()
                .parse::<serde_json::Number>()
                .map(serde_json::Value::Number)
                .unwrap_or_else(|_| serde_json::Value::String(d.to_string())),
        }
    }
}

fn normalize(scalar: ScalarValue) -> ScalarValue {
    match scalar {
        ScalarValue::Number(d) => ScalarValue::Number(d.normalize()),
        other => other,
    }
}

/// Visitor over the closed type set.
///
/// Each handler receives the attribute name and the (possibly null) payload
/// of the matching type.
pub trait ValueVisitor {
    type Output;

    fn visit_string(&mut self, name: &str, value: Option<&str>) -> Self::Output;
    fn visit_decimal(&mut self, name: &str, value: Option<Decimal>) -> Self::Output;
    fn visit_boolean(&mut self, name: &str, value: Option<bool>) -> Self::Output;
    fn visit_date(&mut self, name: &str, value: Option<DateTime<Utc>>) -> Self::Output;
}
