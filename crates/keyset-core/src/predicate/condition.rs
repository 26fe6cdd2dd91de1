//! Boolean filter trees over sort expressions.

use std::cmp::Ordering;

use crate::ordering::ValueExpression;
use crate::types::{Record, Value};

/// Comparison operator used between a sort expression and a cursor value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    /// `<`
    Lt,
    /// `=`
    Eq,
    /// `>`
    Gt,
}

impl Comparison {
    /// Returns the SQL operator.
    #[inline]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Eq => "=",
            Self::Gt => ">",
        }
    }

    fn accepts(self, ordering: Ordering) -> bool {
        matches!(
            (self, ordering),
            (Self::Lt, Ordering::Less) | (Self::Eq, Ordering::Equal) | (Self::Gt, Ordering::Greater)
        )
    }
}

/// A boolean predicate over the ordered source.
///
/// Storage adapters render the tree into their own query language; the
/// in-memory source evaluates it directly with [`Condition::matches`].
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Always true or always false.
    Const(bool),
    /// `operand <op> value`; unknown (false) when either side is null.
    Compare {
        /// The sort expression.
        operand: ValueExpression,
        /// Comparison operator.
        op: Comparison,
        /// The cursor value.
        value: Value,
    },
    /// `operand IS NULL`, or `IS NOT NULL` when negated.
    IsNull {
        /// The sort expression.
        operand: ValueExpression,
        /// Whether the check is `IS NOT NULL`.
        negated: bool,
    },
    /// Conjunction of all branches.
    And(Vec<Condition>),
    /// Disjunction of all branches.
    Or(Vec<Condition>),
}

impl Condition {
    /// Creates a comparison.
    pub fn compare(operand: &ValueExpression, op: Comparison, value: &Value) -> Self {
        Self::Compare {
            operand: operand.clone(),
            op,
            value: value.clone(),
        }
    }

    /// Creates an `IS NULL` check.
    pub fn is_null(operand: &ValueExpression) -> Self {
        Self::IsNull {
            operand: operand.clone(),
            negated: false,
        }
    }

    /// Creates an `IS NOT NULL` check.
    pub fn is_not_null(operand: &ValueExpression) -> Self {
        Self::IsNull {
            operand: operand.clone(),
            negated: true,
        }
    }

    /// Conjunction that folds constants and flattens nested `And`s.
    pub fn and(branches: impl IntoIterator<Item = Condition>) -> Self {
        let mut flattened = Vec::new();
        for branch in branches {
            match branch {
                Self::Const(true) => {}
                Self::Const(false) => return Self::Const(false),
                Self::And(inner) => flattened.extend(inner),
                other => flattened.push(other),
            }
        }
        match flattened.len() {
            0 => Self::Const(true),
            1 => flattened.remove(0),
            _ => Self::And(flattened),
        }
    }

    /// Disjunction that folds constants and flattens nested `Or`s.
    pub fn or(branches: impl IntoIterator<Item = Condition>) -> Self {
        let mut flattened = Vec::new();
        for branch in branches {
            match branch {
                Self::Const(false) => {}
                Self::Const(true) => return Self::Const(true),
                Self::Or(inner) => flattened.extend(inner),
                other => flattened.push(other),
            }
        }
        match flattened.len() {
            0 => Self::Const(false),
            1 => flattened.remove(0),
            _ => Self::Or(flattened),
        }
    }

    /// Evaluates the predicate against a record.
    ///
    /// Unknown results (comparisons involving null or a missing field) count
    /// as not matching, as in a SQL `WHERE` clause.
    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        match self {
            Self::Const(value) => *value,
            Self::Compare { operand, op, value } => operand
                .evaluate(record)
                .and_then(|actual| actual.sql_cmp(value))
                .is_some_and(|ordering| op.accepts(ordering)),
            Self::IsNull { operand, negated } => operand
                .evaluate(record)
                .is_some_and(|actual| actual.is_null() != *negated),
            Self::And(branches) => branches.iter().all(|branch| branch.matches(record)),
            Self::Or(branches) => branches.iter().any(|branch| branch.matches(record)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::ordering::ColumnRef;

    fn column(name: &str) -> ValueExpression {
        ValueExpression::Column(ColumnRef::parse(name))
    }

    #[test]
    fn constants_fold_away() {
        let id = column("id");
        let compare = Condition::compare(&id, Comparison::Gt, &Value::Int(1));

        assert_eq!(Condition::or([Condition::Const(false), compare.clone()]), compare);
        assert_eq!(Condition::and([Condition::Const(true), compare.clone()]), compare);
        assert_eq!(
            Condition::and([Condition::Const(false), compare.clone()]),
            Condition::Const(false)
        );
        assert_eq!(Condition::or(Vec::new()), Condition::Const(false));
    }

    #[test]
    fn null_comparisons_never_match() {
        let mut row = BTreeMap::new();
        row.insert("merged_at".to_owned(), Value::Null);

        let merged_at = column("merged_at");
        assert!(!Condition::compare(&merged_at, Comparison::Lt, &Value::Int(5)).matches(&row));
        assert!(!Condition::compare(&merged_at, Comparison::Gt, &Value::Int(5)).matches(&row));
        assert!(Condition::is_null(&merged_at).matches(&row));
        assert!(!Condition::is_not_null(&merged_at).matches(&row));
    }

    #[test]
    fn missing_field_never_matches() {
        let row: BTreeMap<String, Value> = BTreeMap::new();
        assert!(!Condition::is_null(&column("id")).matches(&row));
        assert!(!Condition::is_not_null(&column("id")).matches(&row));
    }
}
