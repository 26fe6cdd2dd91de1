//! Ordered attribute values captured in a cursor.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::Value;

/// Decoded cursor contents: sort-key values keyed by attribute name, in
/// ordering priority.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CursorValues {
    entries: Vec<(String, Value)>,
}

impl CursorValues {
    /// Creates an empty value map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry, replacing the value if the attribute is present.
    pub fn insert(&mut self, attribute: impl Into<String>, value: Value) {
        let attribute = attribute.into();
        match self.entries.iter_mut().find(|(name, _)| *name == attribute) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((attribute, value)),
        }
    }

    /// Returns the value for an attribute.
    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == attribute)
            .map(|(_, value)| value)
    }

    /// Iterates over attribute names in order.
    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Iterates over entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether there are no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for CursorValues {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (attribute, value) in iter {
            values.insert(attribute, value);
        }
        values
    }
}

impl Serialize for CursorValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CursorValues {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = CursorValues;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of sort attribute values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries: Vec<(String, Value)> =
                    Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, value)) = access.next_entry::<String, Value>()? {
                    if entries.iter().any(|(existing, _)| *existing == name) {
                        return Err(serde::de::Error::custom(format!(
                            "duplicate cursor attribute `{name}`"
                        )));
                    }
                    entries.push((name, value));
                }
                Ok(CursorValues { entries })
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_insertion_order() {
        let values: CursorValues = [("title", Value::from("b")), ("id", Value::Int(3))]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"{"title":{"text":"b"},"id":{"int":3}}"#);

        let decoded: CursorValues = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.attributes().collect::<Vec<_>>(), ["title", "id"]);
    }

    #[test]
    fn rejects_duplicate_attributes() {
        let json = r#"{"id":{"int":1},"id":{"int":2}}"#;
        assert!(serde_json::from_str::<CursorValues>(json).is_err());
    }
}
