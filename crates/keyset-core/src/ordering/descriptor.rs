//! Per-column sort descriptors and value comparison.

use std::cmp::Ordering;

use super::{ColumnRef, NullsOrder, SortOrder};
use crate::types::{Record, Value};

/// A known single-argument transform applied to a column before comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transform {
    /// Case-insensitive comparison through `lower(...)`.
    CaseFold,
}

impl Transform {
    /// Recognizes a transform by its SQL function name.
    pub fn from_function(name: &str) -> Option<Self> {
        name.eq_ignore_ascii_case("lower").then_some(Self::CaseFold)
    }

    /// Applies the transform to a captured value.
    pub fn apply(self, value: Value) -> Value {
        match (self, value) {
            (Self::CaseFold, Value::Text(text)) => Value::Text(text.to_lowercase()),
            (_, value) => value,
        }
    }

    /// Wraps an SQL operand with the transform.
    pub fn wrap_sql(self, operand: &str) -> String {
        match self {
            Self::CaseFold => format!("LOWER({operand})"),
        }
    }
}

/// How the value of a sort column is obtained from a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueExpression {
    /// The stored column itself.
    Column(ColumnRef),
    /// A transform applied to a stored column.
    Transformed {
        /// The underlying column.
        column: ColumnRef,
        /// The transform applied on both sides of every comparison.
        transform: Transform,
    },
    /// An opaque computed expression, exposed by rows under `alias`.
    Computed {
        /// Name the computed value is projected as.
        alias: String,
        /// SQL text of the expression.
        sql: String,
    },
}

impl ValueExpression {
    /// Evaluates the expression against a record.
    ///
    /// Returns `None` when the record does not expose the underlying field.
    pub fn evaluate<R: Record + ?Sized>(&self, record: &R) -> Option<Value> {
        match self {
            Self::Column(column) => record.value(&column.name),
            Self::Transformed { column, transform } => {
                record.value(&column.name).map(|value| transform.apply(value))
            }
            Self::Computed { alias, .. } => record.value(alias),
        }
    }

    /// Returns the field name rows expose this expression's input under.
    pub fn source_name(&self) -> &str {
        match self {
            Self::Column(column) | Self::Transformed { column, .. } => &column.name,
            Self::Computed { alias, .. } => alias,
        }
    }
}

/// Whether a sort column may hold nulls, and where they sort.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nullable {
    /// The column never holds nulls.
    #[default]
    None,
    /// Nulls sort before every non-null value.
    NullsFirst,
    /// Nulls sort after every non-null value.
    NullsLast,
}

impl Nullable {
    /// Returns the null placement, if the column is nullable.
    #[inline]
    pub fn placement(self) -> Option<NullsOrder> {
        match self {
            Self::None => None,
            Self::NullsFirst => Some(NullsOrder::First),
            Self::NullsLast => Some(NullsOrder::Last),
        }
    }

    /// Returns the policy with the opposite placement.
    #[inline]
    pub fn reversed(self) -> Self {
        match self {
            Self::None => Self::None,
            Self::NullsFirst => Self::NullsLast,
            Self::NullsLast => Self::NullsFirst,
        }
    }
}

impl From<NullsOrder> for Nullable {
    fn from(order: NullsOrder) -> Self {
        match order {
            NullsOrder::First => Self::NullsFirst,
            NullsOrder::Last => Self::NullsLast,
        }
    }
}

/// A single sort column of a keyset ordering.
///
/// Descriptors are immutable once built; [`OrderDescriptor::reversed`]
/// returns a new descriptor instead of flipping in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderDescriptor {
    attribute_name: String,
    sort_direction: SortOrder,
    value_expression: ValueExpression,
    nullable: Nullable,
    distinct: bool,
}

impl OrderDescriptor {
    /// Creates a non-nullable, non-distinct descriptor.
    pub fn new(
        attribute_name: impl Into<String>,
        value_expression: ValueExpression,
        sort_direction: SortOrder,
    ) -> Self {
        Self {
            attribute_name: attribute_name.into(),
            sort_direction,
            value_expression,
            nullable: Nullable::None,
            distinct: false,
        }
    }

    /// Creates a descriptor over a plain column, named after the column.
    pub fn column(reference: &str, sort_direction: SortOrder) -> Self {
        let column = ColumnRef::parse(reference);
        Self::new(column.name.clone(), ValueExpression::Column(column), sort_direction)
    }

    /// Sets the null policy.
    pub fn with_nullable(mut self, nullable: Nullable) -> Self {
        self.nullable = nullable;
        self
    }

    /// Marks the descriptor as the unique tie-breaker.
    pub fn with_distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    /// Returns the logical name used as the cursor field key.
    #[inline]
    pub fn attribute_name(&self) -> &str {
        &self.attribute_name
    }

    /// Returns the sort direction.
    #[inline]
    pub fn sort_direction(&self) -> SortOrder {
        self.sort_direction
    }

    /// Returns how the value is obtained.
    #[inline]
    pub fn value_expression(&self) -> &ValueExpression {
        &self.value_expression
    }

    /// Returns the null policy.
    #[inline]
    pub fn nullable(&self) -> Nullable {
        self.nullable
    }

    /// Returns whether the column may hold nulls.
    #[inline]
    pub fn is_nullable(&self) -> bool {
        self.nullable != Nullable::None
    }

    /// Returns whether the column is unique across the source.
    #[inline]
    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    /// Returns where nulls sort, falling back to the storage default for
    /// columns that are declared non-nullable.
    pub fn effective_nulls(&self) -> NullsOrder {
        self.nullable
            .placement()
            .unwrap_or_else(|| self.sort_direction.default_nulls())
    }

    /// Evaluates this descriptor's value for a record.
    pub fn evaluate<R: Record + ?Sized>(&self, record: &R) -> Option<Value> {
        self.value_expression.evaluate(record)
    }

    /// Returns the descriptor for the reversed ordering.
    pub fn reversed(&self) -> Self {
        Self {
            sort_direction: self.sort_direction.reversed(),
            nullable: self.nullable.reversed(),
            ..self.clone()
        }
    }

    /// Orders two captured values under this descriptor.
    pub fn compare_values(&self, a: &Value, b: &Value) -> Ordering {
        let nulls_first = self.effective_nulls() == NullsOrder::First;
        match (a.is_null(), b.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) if nulls_first => Ordering::Less,
            (true, false) => Ordering::Greater,
            (false, true) if nulls_first => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                let ordering = a.sql_cmp(b).unwrap_or(Ordering::Equal);
                match self.sort_direction {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn case_fold_lowercases_text_only() {
        assert_eq!(
            Transform::CaseFold.apply(Value::Text("MiXeD".into())),
            Value::Text("mixed".into())
        );
        assert_eq!(Transform::CaseFold.apply(Value::Null), Value::Null);
    }

    #[test]
    fn transformed_expression_evaluates_through_transform() {
        let mut row = BTreeMap::new();
        row.insert("title".to_owned(), Value::from("Hello"));

        let expression = ValueExpression::Transformed {
            column: ColumnRef::parse("title"),
            transform: Transform::CaseFold,
        };
        assert_eq!(expression.evaluate(&row), Some(Value::from("hello")));
    }

    #[test]
    fn nulls_last_sorts_after_values_in_both_directions() {
        let asc = OrderDescriptor::column("merged_at", SortOrder::Asc)
            .with_nullable(Nullable::NullsLast);
        assert_eq!(asc.compare_values(&Value::Null, &Value::Int(1)), Ordering::Greater);

        let desc = OrderDescriptor::column("merged_at", SortOrder::Desc)
            .with_nullable(Nullable::NullsLast);
        assert_eq!(desc.compare_values(&Value::Null, &Value::Int(1)), Ordering::Greater);
        assert_eq!(desc.compare_values(&Value::Int(1), &Value::Int(2)), Ordering::Greater);
    }

    #[test]
    fn reversed_flips_direction_and_nulls() {
        let descriptor = OrderDescriptor::column("merged_at", SortOrder::Asc)
            .with_nullable(Nullable::NullsLast);
        let reversed = descriptor.reversed();
        assert_eq!(reversed.sort_direction(), SortOrder::Desc);
        assert_eq!(reversed.nullable(), Nullable::NullsFirst);
        assert_eq!(reversed.reversed(), descriptor);
    }
}
