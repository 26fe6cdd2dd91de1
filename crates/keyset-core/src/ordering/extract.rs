//! Turning declared orderings into validated keyset orderings.

use std::collections::BTreeSet;

use super::{
    Classified, KeysetOrdering, Nullable, NullsOrder, OrderClause, OrderDescriptor, SortExpr,
    SortOrder, ValueExpression,
};
use crate::TRACING_TARGET_ORDERING;
use crate::error::OrderingError;

/// What the extractor needs to know about the source's columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    primary_key: String,
    nullable: BTreeSet<String>,
}

impl TableSchema {
    /// Creates a schema whose columns are all non-nullable.
    pub fn new(primary_key: impl Into<String>) -> Self {
        Self {
            primary_key: primary_key.into(),
            nullable: BTreeSet::new(),
        }
    }

    /// Marks columns as nullable.
    pub fn with_nullable<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nullable.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Returns the unique, non-nullable primary key column.
    #[inline]
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Returns whether the column may hold nulls.
    #[inline]
    pub fn is_nullable(&self, column: &str) -> bool {
        self.nullable.contains(column)
    }
}

/// Turns a declared ordering into a validated [`KeysetOrdering`].
#[derive(Debug, Clone)]
pub struct OrderExtractor<'a> {
    schema: &'a TableSchema,
    strict: bool,
}

impl<'a> OrderExtractor<'a> {
    /// Creates a lenient extractor that drops unclassifiable entries.
    pub fn new(schema: &'a TableSchema) -> Self {
        Self {
            schema,
            strict: false,
        }
    }

    /// Fails extraction on unclassifiable entries instead of dropping them.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Returns `declared` with `primary_key DESC` appended, unless the last
    /// classifiable entry already orders by the primary key.
    pub fn with_tie_breaker(&self, declared: &[OrderClause]) -> Vec<OrderClause> {
        let primary_key = self.schema.primary_key();
        let has_tie_breaker = declared
            .iter()
            .map(Classified::classify)
            .filter(|classified| !matches!(classified, Classified::Unsupported(_)))
            .last()
            .is_some_and(|classified| classified.is_column(primary_key));

        let mut clauses = declared.to_vec();
        if !has_tie_breaker {
            tracing::debug!(
                target: TRACING_TARGET_ORDERING,
                primary_key,
                "Appending primary key tie-breaker to ordering"
            );
            clauses.push(OrderClause::desc(SortExpr::column(primary_key)));
        }
        clauses
    }

    /// Classifies and validates a declared ordering.
    #[tracing::instrument(
        skip_all,
        target = TRACING_TARGET_ORDERING,
        fields(entries = declared.len())
    )]
    pub fn extract(&self, declared: &[OrderClause]) -> Result<KeysetOrdering, OrderingError> {
        let mut descriptors = Vec::with_capacity(declared.len());

        for (position, clause) in declared.iter().enumerate() {
            match Classified::classify(clause) {
                Classified::Unsupported(reason) if self.strict => {
                    return Err(OrderingError::Unclassified { position, reason });
                }
                Classified::Unsupported(reason) => {
                    tracing::warn!(
                        target: TRACING_TARGET_ORDERING,
                        position,
                        reason = %reason,
                        "Dropping unsupported ordering entry"
                    );
                }
                classified => descriptors.extend(self.describe(classified)),
            }
        }

        let ordering = match KeysetOrdering::new(descriptors) {
            Err(OrderingError::TieBreakerNotLast { attribute, .. }) => {
                Err(OrderingError::TieBreakerNotLast {
                    attribute,
                    expected: self.schema.primary_key().to_owned(),
                })
            }
            other => other,
        }?;

        tracing::debug!(
            target: TRACING_TARGET_ORDERING,
            fields = ordering.len(),
            fingerprint = %ordering.fingerprint(),
            "Extracted keyset ordering"
        );

        Ok(ordering)
    }

    fn describe(&self, classified: Classified) -> Option<OrderDescriptor> {
        let descriptor = match classified {
            Classified::ColumnRef {
                column,
                direction,
                nulls,
            } => {
                let distinct = column.name == self.schema.primary_key();
                let nullable = self.column_nullability(&column.name, direction, nulls);
                OrderDescriptor::new(
                    column.name.clone(),
                    ValueExpression::Column(column),
                    direction,
                )
                    .with_nullable(nullable)
                    .with_distinct(distinct)
            }
            Classified::Transformed {
                column,
                transform,
                direction,
                nulls,
            } => {
                let nullable = self.column_nullability(&column.name, direction, nulls);
                OrderDescriptor::new(
                    column.name.clone(),
                    ValueExpression::Transformed { column, transform },
                    direction,
                )
                .with_nullable(nullable)
            }
            Classified::Computed {
                alias,
                sql,
                direction,
                nulls,
            } => OrderDescriptor::new(
                alias.clone(),
                ValueExpression::Computed { alias, sql },
                direction,
            )
            .with_nullable(nulls.map_or(Nullable::None, Nullable::from)),
            Classified::Unsupported(_) => return None,
        };
        Some(descriptor)
    }

    /// An explicit `NULLS` modifier wins; otherwise a nullable column gets the
    /// storage default for its direction.
    fn column_nullability(
        &self,
        column: &str,
        direction: SortOrder,
        nulls: Option<NullsOrder>,
    ) -> Nullable {
        match nulls {
            Some(nulls) => nulls.into(),
            None if self.schema.is_nullable(column) => direction.default_nulls().into(),
            None => Nullable::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ordering::Transform;

    fn schema() -> TableSchema {
        TableSchema::new("id").with_nullable(["merged_at", "title"])
    }

    #[test]
    fn extracts_plain_columns() {
        let schema = schema();
        let ordering = OrderExtractor::new(&schema)
            .extract(&[
                OrderClause::desc(SortExpr::column("created_at")),
                OrderClause::desc(SortExpr::column("issues.id")),
            ])
            .unwrap();

        let [primary, tie_breaker] = ordering.descriptors() else {
            panic!("expected two descriptors");
        };
        assert_eq!(primary.attribute_name(), "created_at");
        assert!(!primary.is_nullable());
        assert!(tie_breaker.is_distinct());
    }

    #[test]
    fn captures_raw_nulls_modifier() {
        let schema = schema();
        let ordering = OrderExtractor::new(&schema)
            .extract(&[
                OrderClause::asc(SortExpr::raw("merged_at ASC NULLS FIRST")),
                OrderClause::asc(SortExpr::column("id")),
            ])
            .unwrap();
        assert_eq!(ordering[0].nullable(), Nullable::NullsFirst);
    }

    #[test]
    fn nullable_column_gets_storage_default() {
        let schema = schema();
        let ordering = OrderExtractor::new(&schema)
            .extract(&[
                OrderClause::desc(SortExpr::column("merged_at")),
                OrderClause::asc(SortExpr::column("id")),
            ])
            .unwrap();
        assert_eq!(ordering[0].effective_nulls(), NullsOrder::First);
        assert!(ordering[0].is_nullable());
    }

    #[test]
    fn transformed_column_keeps_attribute_name() {
        let schema = schema();
        let ordering = OrderExtractor::new(&schema)
            .extract(&[
                OrderClause::asc(SortExpr::lower("title")).nulls_last(),
                OrderClause::asc(SortExpr::column("id")),
            ])
            .unwrap();
        assert_eq!(ordering[0].attribute_name(), "title");
        assert!(matches!(
            ordering[0].value_expression(),
            ValueExpression::Transformed { transform: Transform::CaseFold, .. }
        ));
    }

    #[test]
    fn drops_unsupported_entries_when_lenient() {
        let schema = schema();
        let ordering = OrderExtractor::new(&schema)
            .extract(&[
                OrderClause::asc(SortExpr::raw("RANDOM()")),
                OrderClause::asc(SortExpr::column("id")),
            ])
            .unwrap();
        assert_eq!(ordering.len(), 1);
    }

    #[test]
    fn rejects_unsupported_entries_when_strict() {
        let schema = schema();
        let result = OrderExtractor::new(&schema)
            .with_strict(true)
            .extract(&[
                OrderClause::asc(SortExpr::raw("RANDOM()")),
                OrderClause::asc(SortExpr::column("id")),
            ]);
        assert!(matches!(result, Err(OrderingError::Unclassified { position: 0, .. })));
    }

    #[test]
    fn rejects_missing_primary_key() {
        let schema = schema();
        let declared = [OrderClause::asc(SortExpr::column("created_at"))];
        let result = OrderExtractor::new(&schema).extract(&declared);
        assert_eq!(
            result,
            Err(OrderingError::TieBreakerNotLast {
                attribute: "created_at".into(),
                expected: "id".into(),
            })
        );
    }

    #[test]
    fn appends_tie_breaker_once() {
        let schema = schema();
        let extractor = OrderExtractor::new(&schema);

        let declared = [OrderClause::asc(SortExpr::column("created_at"))];
        let clauses = extractor.with_tie_breaker(&declared);
        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[1], OrderClause::desc(SortExpr::column("id")));

        let again = extractor.with_tie_breaker(&clauses);
        assert_eq!(again.len(), 2);

        let ordering = extractor.extract(&again).unwrap();
        assert_eq!(ordering.tie_breaker().sort_direction(), SortOrder::Desc);
    }

    #[test]
    fn empty_ordering_fails() {
        let schema = schema();
        assert_eq!(OrderExtractor::new(&schema).extract(&[]), Err(OrderingError::Empty));
    }
}
