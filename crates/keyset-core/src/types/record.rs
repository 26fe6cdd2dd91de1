//! The engine's view of a single row.

use std::collections::{BTreeMap, HashMap};

use super::Value;

/// A row that can report the values of its sort columns.
///
/// Returning `None` means the row does not expose the field at all, while
/// `Some(Value::Null)` means the field exists and is SQL `NULL`. Computed sort
/// keys are reported under the alias of their descriptor, the same way a SQL
/// projection exposes `expression AS alias`.
pub trait Record {
    /// Returns the value stored under `name`.
    fn value(&self, name: &str) -> Option<Value>;
}

impl<R: Record + ?Sized> Record for &R {
    #[inline]
    fn value(&self, name: &str) -> Option<Value> {
        (**self).value(name)
    }
}

impl Record for BTreeMap<String, Value> {
    fn value(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl Record for HashMap<String, Value> {
    fn value(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}
