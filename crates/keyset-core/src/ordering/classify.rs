//! Single-pass classification of declared ordering entries.

use std::borrow::Cow;

use super::{ColumnRef, NullsOrder, OrderClause, SortExpr, SortOrder, Transform};

/// Alias under which `CASE` orderings are exposed by rows.
pub const CASE_ORDER_ALIAS: &str = "case_order_value";

/// Function names whose result is captured as an opaque computed sort key.
const COMPUTED_FUNCTIONS: &[&str] = &["similarity", "array_position"];

/// The shape of one declared ordering entry, decided in a single pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    /// A plain stored column.
    ColumnRef {
        /// The referenced column.
        column: ColumnRef,
        /// Direction, possibly parsed out of a raw fragment.
        direction: SortOrder,
        /// Null placement, possibly parsed out of a raw fragment.
        nulls: Option<NullsOrder>,
    },
    /// A known transform over a stored column.
    Transformed {
        /// The referenced column.
        column: ColumnRef,
        /// The recognized transform.
        transform: Transform,
        /// Sort direction.
        direction: SortOrder,
        /// Declared null placement.
        nulls: Option<NullsOrder>,
    },
    /// An opaque computed expression.
    Computed {
        /// Name rows expose the computed value under.
        alias: String,
        /// SQL text of the expression.
        sql: String,
        /// Sort direction.
        direction: SortOrder,
        /// Declared null placement.
        nulls: Option<NullsOrder>,
    },
    /// Anything else; never becomes a sort descriptor.
    Unsupported(Cow<'static, str>),
}

impl Classified {
    /// Classifies one declared ordering entry.
    pub fn classify(clause: &OrderClause) -> Self {
        let direction = clause.direction;
        let nulls = clause.nulls;

        match &clause.expr {
            SortExpr::Column(column) => Self::ColumnRef {
                column: column.clone(),
                direction,
                nulls,
            },
            SortExpr::Function { name, args } => {
                if let Some(transform) = Transform::from_function(name) {
                    return match args.as_slice() {
                        [SortExpr::Column(column)] => Self::Transformed {
                            column: column.clone(),
                            transform,
                            direction,
                            nulls,
                        },
                        _ => Self::Unsupported(
                            format!("`{name}` must wrap exactly one column").into(),
                        ),
                    };
                }

                let lowered = name.to_ascii_lowercase();
                if COMPUTED_FUNCTIONS.contains(&lowered.as_str()) {
                    Self::Computed {
                        alias: lowered,
                        sql: clause.expr.to_sql(),
                        direction,
                        nulls,
                    }
                } else {
                    Self::Unsupported(format!("unsupported ordering function `{name}`").into())
                }
            }
            SortExpr::Case { sql } => Self::Computed {
                alias: CASE_ORDER_ALIAS.to_owned(),
                sql: sql.clone(),
                direction,
                nulls,
            },
            SortExpr::Raw(sql) => Self::parse_nulls_modifier(sql),
            SortExpr::Literal(_) => {
                Self::Unsupported("ordering by a literal is meaningless".into())
            }
        }
    }

    /// Parses `<column> <asc|desc> nulls <first|last>`; anything else is
    /// unsupported.
    fn parse_nulls_modifier(sql: &str) -> Self {
        let tokens: Vec<&str> = sql.split_whitespace().collect();

        let [column, direction, nulls, placement] = tokens.as_slice() else {
            return Self::Unsupported(format!("unrecognized ordering fragment `{sql}`").into());
        };
        if !nulls.eq_ignore_ascii_case("nulls") {
            return Self::Unsupported(format!("unrecognized ordering fragment `{sql}`").into());
        }

        // Keywords are case-insensitive; the column keeps its spelling.
        let direction = match direction.to_ascii_lowercase().as_str() {
            "asc" => SortOrder::Asc,
            "desc" => SortOrder::Desc,
            _ => return Self::Unsupported(format!("unknown direction in `{sql}`").into()),
        };
        let nulls = match placement.to_ascii_lowercase().as_str() {
            "first" => NullsOrder::First,
            "last" => NullsOrder::Last,
            _ => return Self::Unsupported(format!("unknown null placement in `{sql}`").into()),
        };

        Self::ColumnRef {
            column: ColumnRef::parse(column),
            direction,
            nulls: Some(nulls),
        }
    }

    /// Returns the attribute name the entry would be keyed by.
    pub fn attribute_name(&self) -> Option<&str> {
        match self {
            Self::ColumnRef { column, .. } | Self::Transformed { column, .. } => Some(&column.name),
            Self::Computed { alias, .. } => Some(alias),
            Self::Unsupported(_) => None,
        }
    }

    /// Returns whether the entry is a plain reference to `column`.
    pub fn is_column(&self, name: &str) -> bool {
        matches!(self, Self::ColumnRef { column, .. } if column.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_column() {
        let classified = Classified::classify(&OrderClause::asc(SortExpr::column("issues.id")));
        assert!(classified.is_column("id"));
    }

    #[test]
    fn lower_is_unwrapped() {
        let classified = Classified::classify(&OrderClause::asc(SortExpr::lower("title")));
        assert!(matches!(
            classified,
            Classified::Transformed { ref column, transform: Transform::CaseFold, .. }
                if column.name == "title"
        ));
    }

    #[test]
    fn raw_nulls_modifier_is_captured() {
        let classified =
            Classified::classify(&OrderClause::asc(SortExpr::raw("merged_at DESC NULLS LAST")));
        assert_eq!(
            classified,
            Classified::ColumnRef {
                column: ColumnRef::parse("merged_at"),
                direction: SortOrder::Desc,
                nulls: Some(NullsOrder::Last),
            }
        );
    }

    #[test]
    fn raw_fragment_keeps_column_case() {
        let classified = Classified::classify(&OrderClause::asc(SortExpr::raw(
            "\"issues\".\"mergedAt\" desc Nulls FIRST",
        )));
        assert_eq!(classified.attribute_name(), Some("mergedAt"));
        assert_eq!(
            classified,
            Classified::ColumnRef {
                column: ColumnRef {
                    table: Some("issues".to_owned()),
                    name: "mergedAt".to_owned(),
                },
                direction: SortOrder::Desc,
                nulls: Some(NullsOrder::First),
            }
        );
    }

    #[test]
    fn computed_expressions_use_fixed_aliases() {
        let case = Classified::classify(&OrderClause::desc(SortExpr::case(
            "CASE WHEN state = 'open' THEN 0 ELSE 1 END",
        )));
        assert_eq!(case.attribute_name(), Some(CASE_ORDER_ALIAS));

        let similarity = Classified::classify(&OrderClause::desc(SortExpr::function(
            "SIMILARITY",
            [SortExpr::column("name"), SortExpr::Literal("gitlab".into())],
        )));
        assert_eq!(similarity.attribute_name(), Some("similarity"));
    }

    #[test]
    fn unrecognized_shapes_are_unsupported() {
        let shapes = [
            SortExpr::raw("RANDOM()"),
            SortExpr::raw("id desc nulls sometimes"),
            SortExpr::Literal(1.into()),
            SortExpr::function("coalesce", [SortExpr::column("a"), SortExpr::column("b")]),
            SortExpr::function("lower", [SortExpr::Literal("x".into())]),
        ];
        for expr in shapes {
            let classified = Classified::classify(&OrderClause::asc(expr));
            assert!(matches!(classified, Classified::Unsupported(_)), "{classified:?}");
        }
    }
}
