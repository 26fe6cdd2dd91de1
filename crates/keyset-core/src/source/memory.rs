//! In-memory ordered source.

use std::convert::Infallible;

use super::{OrderedSource, SliceQuery};
use crate::ordering::{OrderClause, TableSchema};
use crate::types::Record;

/// An in-process source over already materialized rows.
#[derive(Debug, Clone)]
pub struct MemorySource<R> {
    rows: Vec<R>,
    schema: TableSchema,
    declared: Vec<OrderClause>,
}

impl<R> MemorySource<R> {
    /// Creates a source over `rows` with the given schema and ordering.
    pub fn new(rows: Vec<R>, schema: TableSchema, declared: Vec<OrderClause>) -> Self {
        Self {
            rows,
            schema,
            declared,
        }
    }

    /// Returns the stored rows, in insertion order.
    #[inline]
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    /// Adds a row.
    pub fn push(&mut self, row: R) {
        self.rows.push(row);
    }

    /// Removes every row for which `keep` returns false.
    pub fn retain(&mut self, keep: impl FnMut(&R) -> bool) {
        self.rows.retain(keep);
    }
}

impl<R> OrderedSource for MemorySource<R>
where
    R: Record + Clone + Send + Sync,
{
    type Error = Infallible;
    type Item = R;

    fn schema(&self) -> &TableSchema {
        &self.schema
    }

    fn declared_order(&self) -> &[OrderClause] {
        &self.declared
    }

    async fn fetch(&self, query: &SliceQuery) -> Result<Vec<R>, Infallible> {
        let mut matching: Vec<&R> = self
            .rows
            .iter()
            .filter(|row| {
                query
                    .condition
                    .as_ref()
                    .is_none_or(|condition| condition.matches(*row))
            })
            .collect();

        matching.sort_by(|a, b| query.ordering.compare(*a, *b));
        Ok(matching.into_iter().take(query.limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::ordering::{KeysetOrdering, OrderDescriptor, SortExpr, SortOrder};
    use crate::predicate::{Comparison, Condition};
    use crate::types::Value;

    fn row(id: i64) -> BTreeMap<String, Value> {
        BTreeMap::from([("id".to_owned(), Value::Int(id))])
    }

    #[tokio::test]
    async fn fetch_filters_sorts_and_limits() {
        let source = MemorySource::new(
            vec![row(3), row(1), row(4), row(2)],
            TableSchema::new("id"),
            vec![OrderClause::asc(SortExpr::column("id"))],
        );
        let ordering = KeysetOrdering::new(vec![
            OrderDescriptor::column("id", SortOrder::Desc).with_distinct(true),
        ])
        .unwrap();

        let query = SliceQuery {
            condition: Some(Condition::compare(
                ordering[0].value_expression(),
                Comparison::Lt,
                &Value::Int(4),
            )),
            ordering,
            limit: 2,
        };

        let rows = source.fetch(&query).await.unwrap();
        let ids: Vec<_> = rows.iter().map(|row| row["id"].clone()).collect();
        assert_eq!(ids, [Value::Int(3), Value::Int(2)]);
    }
}
