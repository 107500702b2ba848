//! Ordered, multi-valued attribute container
//!
//! Keyed by attribute name; a name may hold several values (repeated "tags").
//! Name order is insertion order of first occurrence, value order per name is
//! insertion order. All mutators are copy-on-write and return a new
//! collection; an instance never changes once constructed.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

use super::value::{AttributeType, AttributeValue};

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    name: String,
    values: Vec<AttributeValue>,
}

/// Ordered mapping from attribute name to an ordered sequence of values.
///
/// Invariant: no entry ever holds an empty values list — removing the last
/// value for a name removes the name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributesCollection {
    entries: Vec<Entry>,
}

impl AttributesCollection {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// First value for the name, if any.
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.entry(name).and_then(|e| e.values.first())
    }

    /// Value at `index` within the name's sequence.
    pub fn get_at(&self, name: &str, index: usize) -> Option<&AttributeValue> {
        self.entry(name).and_then(|e| e.values.get(index))
    }

    /// Full ordered sequence for the name, empty if absent.
    pub fn get_all(&self, name: &str) -> &[AttributeValue] {
        self.entry(name).map(|e| e.values.as_slice()).unwrap_or(&[])
    }

    /// First value for the name, but only when its runtime type matches.
    ///
    /// A type-incompatible lookup fails soft (returns `None`), never errors.
    pub fn get_typed(&self, name: &str, value_type: AttributeType) -> Option<&AttributeValue> {
        self.get(name).filter(|v| v.value_type() == value_type)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    /// Attribute names in insertion order of first occurrence.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Number of distinct attribute names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace all values for the value's name. Copy-on-write.
    pub fn set(&self, value: AttributeValue) -> Self {
        let mut next = self.clone();
        match next.entries.iter_mut().find(|e| e.name == value.name()) {
            Some(entry) => entry.values = vec![value],
            None => next.entries.push(Entry {
                name: value.name().to_string(),
                values: vec![value],
            }),
        }
        next
    }

    /// Append a value, preserving prior values for the name. Copy-on-write.
    pub fn add(&self, value: AttributeValue) -> Self {
        let mut next = self.clone();
        match next.entries.iter_mut().find(|e| e.name == value.name()) {
            Some(entry) => entry.values.push(value),
            None => next.entries.push(Entry {
                name: value.name().to_string(),
                values: vec![value],
            }),
        }
        next
    }

    /// Write a single explicitly-null entry of the given type for the name:
    /// "cleared", as opposed to "absent". Copy-on-write.
    pub fn clear(&self, name: &str, value_type: AttributeType) -> Self {
        self.set(AttributeValue::null(name, value_type))
    }

    /// Drop the name entirely. Copy-on-write.
    pub fn remove(&self, name: &str) -> Self {
        let mut next = self.clone();
        next.entries.retain(|e| e.name != name);
        next
    }

    /// Read-only snapshot keyed by name. Map iteration order is unspecified;
    /// use [`names`](Self::names) when order matters.
    pub fn as_map(&self) -> HashMap<String, Vec<AttributeValue>> {
        self.entries
            .iter()
            .map(|e| (e.name.clone(), e.values.clone()))
            .collect()
    }

    /// Read-only flat snapshot of every value, in collection order.
    pub fn as_list(&self) -> Vec<AttributeValue> {
        self.entries
            .iter()
            .flat_map(|e| e.values.iter().cloned())
            .collect()
    }

    /// JSON shape: a single-valued name serializes as a scalar, a
    /// multi-valued name as an ordered array. Stored nulls serialize as
    /// `null` in place: they are data, not absence.
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::with_capacity(self.entries.len());
        for entry in &self.entries {
            let value = if entry.values.len() == 1 {
                entry.values[0].value_json()
            } else {
                serde_json::Value::Array(entry.values.iter().map(|v| v.value_json()).collect())
            };
            map.insert(entry.name.clone(), value);
        }
        serde_json::Value::Object(map)
    }
}

impl Serialize for AttributesCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            if entry.values.len() == 1 {
                map.serialize_entry(&entry.name, &entry.values[0].value_json())?;
            } else {
                let values: Vec<serde_json::Value> =
                    entry.values.iter().map(|v| v.value_json()).collect();
                map.serialize_entry(&entry.name, &values)?;
            }
        }
        map.end()
    }
}

impl FromIterator<AttributeValue> for AttributesCollection {
    fn from_iter<I: IntoIterator<Item = AttributeValue>>(iter: I) -> Self {
        let mut collection = AttributesCollection::new();
        for value in iter {
            collection = collection.add(value);
        }
        collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;

    #[test]
    fn name_order_is_first_occurrence_order() {
        let c = AttributesCollection::new()
            .add(AttributeValue::text("b", "1"))
            .add(AttributeValue::text("a", "2"))
            .add(AttributeValue::text("b", "3"));
        let names: Vec<_> = c.names().collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(c.get_all("b").len(), 2);
    }

    #[test]
    fn get_at_indexes_within_a_name() {
        let c = AttributesCollection::new()
            .add(AttributeValue::text("tags", "a"))
            .add(AttributeValue::text("tags", "b"));
        assert_eq!(c.get_at("tags", 0).unwrap().as_text(), Some("a"));
        assert_eq!(c.get_at("tags", 1).unwrap().as_text(), Some("b"));
        assert!(c.get_at("tags", 2).is_none());
        assert!(c.get_at("missing", 0).is_none());
    }

    #[test]
    fn snapshots_expose_every_value() {
        let c = AttributesCollection::new()
            .add(AttributeValue::text("tags", "a"))
            .add(AttributeValue::text("color", "blue"))
            .add(AttributeValue::text("tags", "b"));

        let map = c.as_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map["tags"].len(), 2);
        assert_eq!(map["color"][0].as_text(), Some("blue"));

        // flat list follows collection order: all of "tags", then "color"
        let texts: Vec<_> = c.as_list().iter().map(|v| v.as_text().unwrap().to_string()).collect();
        assert_eq!(texts, vec!["a", "b", "blue"]);
    }

    #[test]
    fn mutators_are_copy_on_write() {
        let base = AttributesCollection::new().add(AttributeValue::text("tag", "x"));
        let extended = base.add(AttributeValue::text("tag", "y"));
        assert_eq!(base.get_all("tag").len(), 1);
        assert_eq!(extended.get_all("tag").len(), 2);

        let replaced = extended.set(AttributeValue::text("tag", "z"));
        assert_eq!(replaced.get_all("tag").len(), 1);
        assert_eq!(replaced.get("tag").unwrap().as_text(), Some("z"));
        assert_eq!(extended.get_all("tag").len(), 2);
    }

    #[test]
    fn get_typed_fails_soft_on_type_mismatch() {
        let c = AttributesCollection::new().add(AttributeValue::text("color", "blue"));
        assert!(c.get_typed("color", AttributeType::String).is_some());
        assert!(c.get_typed("color", AttributeType::Decimal).is_none());
        assert!(c.get_typed("missing", AttributeType::String).is_none());
    }

    #[test]
    fn clear_writes_an_explicit_null_entry() {
        let c = AttributesCollection::new()
            .add(AttributeValue::text("color", "blue"))
            .clear("color", AttributeType::String);
        assert!(c.contains("color"));
        let v = c.get("color").unwrap();
        assert!(v.is_null());
        assert_eq!(v.value_type(), AttributeType::String);
    }

    #[test]
    fn remove_drops_the_name() {
        let c = AttributesCollection::new()
            .add(AttributeValue::text("color", "blue"))
            .remove("color");
        assert!(!c.contains("color"));
        assert!(c.get_all("color").is_empty());
    }

    #[test]
    fn json_shape_scalar_vs_array_vs_null() {
        let c = AttributesCollection::new()
            .add(AttributeValue::text("color", "blue"))
            .add(AttributeValue::text("tags", "a"))
            .add(AttributeValue::text("tags", "b"))
            .add(AttributeValue::null("note", AttributeType::String))
            .add(AttributeValue::null("mixed", AttributeType::String))
            .add(AttributeValue::text("mixed", "x"));
        assert_eq!(
            c.to_json(),
            json!({
                "color": "blue",
                "tags": ["a", "b"],
                "note": null,
                "mixed": [null, "x"],
            })
        );
        // the Serialize impl agrees with to_json
        let via_serde = serde_json::to_value(&c).unwrap();
        assert_eq!(via_serde, c.to_json());
    }

    #[test]
    fn single_valued_decimal_serializes_normalized() {
        let c = AttributesCollection::new().add(AttributeValue::number(
            "area",
            Decimal::new(30, 1), // 3.0
        ));
        assert_eq!(c.to_json(), json!({ "area": 3 }));
    }
}
