//! Primitive sort-key values.

use std::cmp::Ordering;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;
use uuid::Uuid;

/// A primitive value captured from a record for one sort column.
///
/// Comparisons follow SQL semantics: anything compared with [`Value::Null`]
/// is unknown, integers and floats compare numerically with each other, and
/// values of unrelated kinds do not compare at all.
///
/// The serialized form is externally tagged (`{"int": 5}`, `"null"`) so that a
/// decoded cursor yields exactly the variant that was encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Value {
    /// SQL `NULL`.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// Double precision float. Must be finite to survive a cursor round-trip.
    Float(f64),
    /// UTF-8 text.
    Text(String),
    /// Point in time, serialized as RFC 3339 with fixed nanosecond precision.
    Timestamp(#[serde(with = "fixed_precision")] Timestamp),
    /// UUID, serialized in hyphenated form.
    Uuid(Uuid),
}

impl Value {
    /// Returns whether this value is SQL `NULL`.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the snake_case name of the value kind.
    #[inline]
    pub fn kind(&self) -> &'static str {
        self.into()
    }

    /// Compares two values the way the storage engine would.
    ///
    /// Returns `None` when either side is `NULL` or the kinds are unrelated.
    pub fn sql_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Null, _) | (_, Self::Null) => None,
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Int(a), Self::Float(b)) => (*a as f64).partial_cmp(b),
            (Self::Float(a), Self::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Timestamp(a), Self::Timestamp(b)) => Some(a.cmp(b)),
            (Self::Uuid(a), Self::Uuid(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Returns the text content if this is a [`Value::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the integer content if this is a [`Value::Int`].
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<Timestamp> for Value {
    fn from(value: Timestamp) -> Self {
        Self::Timestamp(value)
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Serializes timestamps with a fixed number of fractional digits so that the
/// textual form sorts the same way the instants do.
mod fixed_precision {
    use jiff::Timestamp;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        timestamp: &Timestamp,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&format_args!("{timestamp:.9}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_never_compares() {
        assert_eq!(Value::Null.sql_cmp(&Value::Null), None);
        assert_eq!(Value::Int(1).sql_cmp(&Value::Null), None);
    }

    #[test]
    fn numbers_compare_across_kinds() {
        assert_eq!(Value::Int(2).sql_cmp(&Value::Float(2.5)), Some(Ordering::Less));
        assert_eq!(Value::Float(3.0).sql_cmp(&Value::Int(3)), Some(Ordering::Equal));
    }

    #[test]
    fn unrelated_kinds_do_not_compare() {
        assert_eq!(Value::Int(1).sql_cmp(&Value::Text("1".into())), None);
    }

    #[test]
    fn timestamp_uses_fixed_precision() {
        let timestamp: Timestamp = "2024-03-01T10:00:00Z".parse().unwrap();
        let json = serde_json::to_string(&Value::Timestamp(timestamp)).unwrap();
        assert_eq!(json, r#"{"timestamp":"2024-03-01T10:00:00.000000000Z"}"#);

        let decoded: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, Value::Timestamp(timestamp));
    }

    #[test]
    fn option_maps_to_null() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("a")), Value::Text("a".into()));
        assert_eq!(Value::Null.kind(), "null");
        assert_eq!(Value::Int(1).kind(), "int");
    }
}
