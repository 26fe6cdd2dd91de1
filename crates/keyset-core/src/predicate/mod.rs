//! Keyset predicates: "strictly before/after this cursor" as a condition tree.
//!
//! For an ordering `(a, b)` and cursor values `(va, vb)`, rows after the
//! cursor are those with `a` strictly beyond `va`, or `a` equal to `va` and
//! `b` strictly beyond `vb`. Nullable columns add null branches according to
//! where nulls sort relative to the direction of travel.

mod condition;

pub use condition::{Comparison, Condition};

use crate::cursor::CursorValues;
use crate::error::{Error, Result};
use crate::ordering::{KeysetOrdering, NullsOrder, OrderDescriptor, SortOrder};
use crate::types::Value;

/// Which side of a cursor to select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Rows that sort before the cursor.
    Before,
    /// Rows that sort after the cursor.
    After,
}

impl Direction {
    /// Returns the operator selecting values strictly on this side.
    pub fn operator(self, sort_direction: SortOrder) -> Comparison {
        match (self, sort_direction) {
            (Self::After, SortOrder::Asc) | (Self::Before, SortOrder::Desc) => Comparison::Gt,
            (Self::After, SortOrder::Desc) | (Self::Before, SortOrder::Asc) => Comparison::Lt,
        }
    }

    /// Returns whether nulls placed as given lie on this side of every
    /// non-null value.
    pub fn contains_nulls(self, nulls: NullsOrder) -> bool {
        matches!(
            (self, nulls),
            (Self::After, NullsOrder::Last) | (Self::Before, NullsOrder::First)
        )
    }
}

/// Builds keyset predicates for one ordering.
#[derive(Debug, Clone, Copy)]
pub struct PredicateBuilder<'a> {
    ordering: &'a KeysetOrdering,
}

impl<'a> PredicateBuilder<'a> {
    /// Creates a builder for the given ordering.
    pub fn new(ordering: &'a KeysetOrdering) -> Self {
        Self { ordering }
    }

    /// Builds the predicate selecting rows strictly on `direction`'s side of
    /// the cursor.
    ///
    /// Fails with [`Error::InvalidCursor`] if the cursor lacks a sort column
    /// or holds null for a column that can never be null.
    pub fn build(&self, cursor: &CursorValues, direction: Direction) -> Result<Condition> {
        let mut descriptors = self.ordering.iter().rev();
        let Some(tie_breaker) = descriptors.next() else {
            return Err(Error::invalid_cursor("ordering has no sort columns"));
        };

        let mut condition = beyond(tie_breaker, cursor_value(cursor, tie_breaker)?, direction);
        for descriptor in descriptors {
            let value = cursor_value(cursor, descriptor)?;
            condition = Condition::or([
                beyond(descriptor, value, direction),
                Condition::and([equal(descriptor, value), condition]),
            ]);
        }

        Ok(condition)
    }
}

fn cursor_value<'c>(cursor: &'c CursorValues, descriptor: &OrderDescriptor) -> Result<&'c Value> {
    let attribute = descriptor.attribute_name();
    let value = cursor
        .get(attribute)
        .ok_or_else(|| Error::invalid_cursor(format!("cursor is missing `{attribute}`")))?;

    if value.is_null() && !descriptor.is_nullable() {
        return Err(Error::invalid_cursor(format!(
            "cursor holds null for non-nullable `{attribute}`"
        )));
    }

    Ok(value)
}

/// Rows whose value for `descriptor` lies strictly on `direction`'s side of
/// `value`.
fn beyond(descriptor: &OrderDescriptor, value: &Value, direction: Direction) -> Condition {
    let operand = descriptor.value_expression();
    let nulls_beyond = descriptor
        .nullable()
        .placement()
        .is_some_and(|nulls| direction.contains_nulls(nulls));

    if value.is_null() {
        // Nulls are all equal, so only non-null rows can be strictly beyond.
        return if nulls_beyond {
            Condition::Const(false)
        } else {
            Condition::is_not_null(operand)
        };
    }

    let op = direction.operator(descriptor.sort_direction());
    Condition::or([
        Condition::compare(operand, op, value),
        if nulls_beyond {
            Condition::is_null(operand)
        } else {
            Condition::Const(false)
        },
    ])
}

/// Rows tied with `value` on `descriptor`.
fn equal(descriptor: &OrderDescriptor, value: &Value) -> Condition {
    let operand = descriptor.value_expression();
    if value.is_null() {
        Condition::is_null(operand)
    } else {
        Condition::compare(operand, Comparison::Eq, value)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::ordering::Nullable;
    use crate::types::Record;

    fn id(direction: SortOrder) -> OrderDescriptor {
        OrderDescriptor::column("id", direction).with_distinct(true)
    }

    fn value(nullable: Nullable) -> OrderDescriptor {
        OrderDescriptor::column("value", SortOrder::Asc).with_nullable(nullable)
    }

    fn row(id: i64, value: Option<i64>) -> BTreeMap<String, Value> {
        BTreeMap::from([
            ("id".to_owned(), Value::Int(id)),
            ("value".to_owned(), value.into()),
        ])
    }

    fn cursor(id: i64, value: Option<i64>) -> CursorValues {
        [("value", Value::from(value)), ("id", Value::Int(id))]
            .into_iter()
            .collect()
    }

    fn selected(condition: &Condition, rows: &[BTreeMap<String, Value>]) -> Vec<i64> {
        rows.iter()
            .filter(|row| condition.matches(*row))
            .filter_map(|row| row.value("id").and_then(|id| id.as_int()))
            .collect()
    }

    #[test]
    fn operators_follow_direction() {
        assert_eq!(Direction::After.operator(SortOrder::Asc), Comparison::Gt);
        assert_eq!(Direction::After.operator(SortOrder::Desc), Comparison::Lt);
        assert_eq!(Direction::Before.operator(SortOrder::Asc), Comparison::Lt);
        assert_eq!(Direction::Before.operator(SortOrder::Desc), Comparison::Gt);
    }

    #[test]
    fn single_column_is_a_plain_comparison() {
        let ordering = KeysetOrdering::new(vec![id(SortOrder::Desc)]).unwrap();
        let values: CursorValues = [("id", Value::Int(5))].into_iter().collect();

        let condition = PredicateBuilder::new(&ordering)
            .build(&values, Direction::After)
            .unwrap();
        assert_eq!(
            condition,
            Condition::compare(ordering[0].value_expression(), Comparison::Lt, &Value::Int(5))
        );
    }

    #[test]
    fn nulls_last_after_non_null_includes_nulls() {
        let ordering =
            KeysetOrdering::new(vec![value(Nullable::NullsLast), id(SortOrder::Asc)]).unwrap();
        let rows = [row(1, None), row(2, Some(5)), row(3, None), row(4, Some(2)), row(5, Some(5))];

        let condition = PredicateBuilder::new(&ordering)
            .build(&cursor(2, Some(5)), Direction::After)
            .unwrap();
        assert_eq!(selected(&condition, &rows), [1, 3, 5]);

        let condition = PredicateBuilder::new(&ordering)
            .build(&cursor(2, Some(5)), Direction::Before)
            .unwrap();
        assert_eq!(selected(&condition, &rows), [4]);
    }

    #[test]
    fn nulls_last_with_null_cursor() {
        let ordering =
            KeysetOrdering::new(vec![value(Nullable::NullsLast), id(SortOrder::Asc)]).unwrap();
        let rows = [row(1, None), row(2, Some(5)), row(3, None), row(4, Some(2))];

        let after = PredicateBuilder::new(&ordering)
            .build(&cursor(1, None), Direction::After)
            .unwrap();
        assert_eq!(selected(&after, &rows), [3]);

        let before = PredicateBuilder::new(&ordering)
            .build(&cursor(3, None), Direction::Before)
            .unwrap();
        assert_eq!(selected(&before, &rows), [1, 2, 4]);
    }

    #[test]
    fn nulls_first_with_null_cursor() {
        let ordering =
            KeysetOrdering::new(vec![value(Nullable::NullsFirst), id(SortOrder::Asc)]).unwrap();
        let rows = [row(1, None), row(2, Some(5)), row(3, None), row(4, Some(2))];

        let after = PredicateBuilder::new(&ordering)
            .build(&cursor(1, None), Direction::After)
            .unwrap();
        assert_eq!(selected(&after, &rows), [2, 3, 4]);

        let before = PredicateBuilder::new(&ordering)
            .build(&cursor(3, None), Direction::Before)
            .unwrap();
        assert_eq!(selected(&before, &rows), [1]);
    }

    #[test]
    fn missing_attribute_is_invalid() {
        let ordering =
            KeysetOrdering::new(vec![value(Nullable::NullsLast), id(SortOrder::Asc)]).unwrap();
        let values: CursorValues = [("id", Value::Int(1))].into_iter().collect();
        assert!(matches!(
            PredicateBuilder::new(&ordering).build(&values, Direction::After),
            Err(Error::InvalidCursor(_))
        ));
    }

    #[test]
    fn null_for_non_nullable_column_is_invalid() {
        let ordering = KeysetOrdering::new(vec![id(SortOrder::Asc)]).unwrap();
        let values: CursorValues = [("id", Value::Null)].into_iter().collect();
        assert!(matches!(
            PredicateBuilder::new(&ordering).build(&values, Direction::Before),
            Err(Error::InvalidCursor(_))
        ));
    }
}
