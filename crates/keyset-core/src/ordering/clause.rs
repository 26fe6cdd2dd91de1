//! Declared sort orders, as configured on a source.

use std::fmt;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::Value;

/// Sort order direction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Ascending order (A-Z, oldest first, smallest first).
    Asc,
    /// Descending order (Z-A, newest first, largest first).
    #[default]
    Desc,
}

impl SortOrder {
    /// Returns whether the sort order is ascending.
    #[inline]
    pub fn is_asc(self) -> bool {
        matches!(self, Self::Asc)
    }

    /// Returns whether the sort order is descending.
    #[inline]
    pub fn is_desc(self) -> bool {
        matches!(self, Self::Desc)
    }

    /// Returns the opposite direction.
    #[inline]
    pub fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// Returns where PostgreSQL places nulls when no modifier is given.
    #[inline]
    pub fn default_nulls(self) -> NullsOrder {
        match self {
            Self::Asc => NullsOrder::Last,
            Self::Desc => NullsOrder::First,
        }
    }

    /// Returns the SQL keyword for this direction.
    #[inline]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Placement of `NULL` values relative to all non-null values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum NullsOrder {
    /// Nulls come before every non-null value.
    First,
    /// Nulls come after every non-null value.
    Last,
}

impl NullsOrder {
    /// Returns the opposite placement.
    #[inline]
    pub fn reversed(self) -> Self {
        match self {
            Self::First => Self::Last,
            Self::Last => Self::First,
        }
    }

    /// Returns the SQL modifier for this placement.
    #[inline]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::First => "NULLS FIRST",
            Self::Last => "NULLS LAST",
        }
    }
}

/// A reference to a stored column, optionally qualified by its table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    /// Table or alias qualifier.
    pub table: Option<String>,
    /// Column name. Used as the cursor attribute name.
    pub name: String,
}

impl ColumnRef {
    /// Parses a possibly qualified and quoted column reference like
    /// `issues.id` or `"issues"."id"`.
    pub fn parse(reference: &str) -> Self {
        let unquote = |part: &str| part.trim().trim_matches('"').to_owned();
        match reference.rsplit_once('.') {
            Some((table, name)) => Self {
                table: Some(unquote(table)),
                name: unquote(name),
            },
            None => Self {
                table: None,
                name: unquote(reference),
            },
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table {
            Some(table) => write!(f, "{table}.{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// The expression part of one declared ordering entry.
#[derive(Debug, Clone, PartialEq)]
pub enum SortExpr {
    /// A stored column.
    Column(ColumnRef),
    /// A function call such as `lower(title)` or `similarity(name, 'abc')`.
    Function {
        /// Function name, compared case-insensitively.
        name: String,
        /// Function arguments.
        args: Vec<SortExpr>,
    },
    /// A `CASE ... END` mapping, kept as SQL text.
    Case {
        /// The full `CASE` expression.
        sql: String,
    },
    /// A literal argument.
    Literal(Value),
    /// An unparsed SQL ordering fragment, e.g. `merged_at DESC NULLS LAST`.
    Raw(String),
}

impl SortExpr {
    /// Creates a column reference expression.
    pub fn column(reference: &str) -> Self {
        Self::Column(ColumnRef::parse(reference))
    }

    /// Creates a `lower(column)` expression.
    pub fn lower(reference: &str) -> Self {
        Self::function("lower", [Self::column(reference)])
    }

    /// Creates a function call expression.
    pub fn function(name: impl Into<String>, args: impl IntoIterator<Item = SortExpr>) -> Self {
        Self::Function {
            name: name.into(),
            args: args.into_iter().collect(),
        }
    }

    /// Creates a `CASE` expression from its SQL text.
    pub fn case(sql: impl Into<String>) -> Self {
        Self::Case { sql: sql.into() }
    }

    /// Creates a raw SQL ordering fragment.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::Raw(sql.into())
    }

    /// Renders the expression as SQL text.
    pub fn to_sql(&self) -> String {
        match self {
            Self::Column(column) => column.to_string(),
            Self::Function { name, args } => {
                let args: Vec<String> = args.iter().map(Self::to_sql).collect();
                format!("{name}({})", args.join(", "))
            }
            Self::Case { sql } | Self::Raw(sql) => sql.clone(),
            Self::Literal(value) => literal_sql(value),
        }
    }
}

fn literal_sql(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_owned(),
        Value::Bool(value) => value.to_string().to_uppercase(),
        Value::Int(value) => value.to_string(),
        Value::Float(value) => value.to_string(),
        Value::Text(text) => format!("'{}'", text.replace('\'', "''")),
        Value::Timestamp(timestamp) => format!("'{timestamp:.9}'"),
        Value::Uuid(uuid) => format!("'{uuid}'"),
    }
}

/// One entry of a source's declared ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderClause {
    /// What is being sorted on.
    pub expr: SortExpr,
    /// The sort direction.
    pub direction: SortOrder,
    /// Explicit null placement, if declared.
    pub nulls: Option<NullsOrder>,
}

impl OrderClause {
    /// Creates a new clause with the given expression and direction.
    #[inline]
    pub fn new(expr: SortExpr, direction: SortOrder) -> Self {
        Self {
            expr,
            direction,
            nulls: None,
        }
    }

    /// Creates a new clause with ascending order.
    #[inline]
    pub fn asc(expr: SortExpr) -> Self {
        Self::new(expr, SortOrder::Asc)
    }

    /// Creates a new clause with descending order.
    #[inline]
    pub fn desc(expr: SortExpr) -> Self {
        Self::new(expr, SortOrder::Desc)
    }

    /// Places nulls before every non-null value.
    #[inline]
    pub fn nulls_first(mut self) -> Self {
        self.nulls = Some(NullsOrder::First);
        self
    }

    /// Places nulls after every non-null value.
    #[inline]
    pub fn nulls_last(mut self) -> Self {
        self.nulls = Some(NullsOrder::Last);
        self
    }
}
