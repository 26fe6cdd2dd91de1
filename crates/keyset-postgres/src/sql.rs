//! Rendering of keyset reads as PostgreSQL statements.
//!
//! Cursor values never appear in the SQL text. Every comparison value is
//! emitted as a `$n` placeholder and collected into [`SqlStatement::binds`].

use std::fmt::Write;

use keyset_core::ordering::{KeysetOrdering, ValueExpression};
use keyset_core::predicate::Condition;
use keyset_core::source::SliceQuery;
use keyset_core::types::Value;

/// Alias of the wrapped base query.
pub const SOURCE_ALIAS: &str = "keyset_source";

/// A rendered statement and its bind values, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    /// SQL text with `$n` placeholders.
    pub sql: String,
    /// Values for every placeholder, base query binds first.
    pub binds: Vec<Value>,
}

impl SqlStatement {
    /// Renders a bounded read over `base`.
    ///
    /// `base` may use placeholders `$1..=$n` for `base_binds`; the keyset
    /// predicate continues numbering after them.
    pub fn render(base: &str, base_binds: &[Value], query: &SliceQuery) -> Self {
        let mut binds = base_binds.to_vec();
        let mut sql = format!("SELECT * FROM ({base}) AS {SOURCE_ALIAS}");

        if let Some(condition) = &query.condition {
            sql.push_str(" WHERE ");
            render_condition(&mut sql, &mut binds, condition);
        }

        sql.push_str(" ORDER BY ");
        sql.push_str(&order_by(&query.ordering));
        let _ = write!(sql, " LIMIT {}", query.limit);

        Self { sql, binds }
    }
}

/// Renders the `ORDER BY` list with explicit null placement.
pub fn order_by(ordering: &KeysetOrdering) -> String {
    ordering
        .iter()
        .map(|descriptor| {
            format!(
                "{} {} {}",
                operand(descriptor.value_expression()),
                descriptor.sort_direction().as_sql(),
                descriptor.effective_nulls().as_sql(),
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders the SQL operand for a sort expression over the wrapped source.
pub fn operand(expression: &ValueExpression) -> String {
    match expression {
        ValueExpression::Column(column) => quote_ident(&column.name),
        ValueExpression::Transformed { column, transform } => {
            transform.wrap_sql(&quote_ident(&column.name))
        }
        ValueExpression::Computed { alias, .. } => quote_ident(alias),
    }
}

fn render_condition(sql: &mut String, binds: &mut Vec<Value>, condition: &Condition) {
    match condition {
        Condition::Const(true) => sql.push_str("TRUE"),
        Condition::Const(false) => sql.push_str("FALSE"),
        Condition::Compare { operand: expr, op, value } => {
            binds.push(value.clone());
            let _ = write!(sql, "{} {} ${}", operand(expr), op.as_sql(), binds.len());
        }
        Condition::IsNull { operand: expr, negated } => {
            let check = if *negated { "IS NOT NULL" } else { "IS NULL" };
            let _ = write!(sql, "{} {check}", operand(expr));
        }
        Condition::And(branches) => render_branches(sql, binds, branches, " AND "),
        Condition::Or(branches) => render_branches(sql, binds, branches, " OR "),
    }
}

fn render_branches(sql: &mut String, binds: &mut Vec<Value>, branches: &[Condition], joiner: &str) {
    sql.push('(');
    for (index, branch) in branches.iter().enumerate() {
        if index > 0 {
            sql.push_str(joiner);
        }
        render_condition(sql, binds, branch);
    }
    sql.push(')');
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
