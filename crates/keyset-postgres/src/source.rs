//! Ordered source backed by a PostgreSQL query.

use std::fmt;
use std::marker::PhantomData;

use diesel::QueryableByName;
use diesel::pg::Pg;
use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::sql_types::{BigInt, Bool, Double, Nullable, Text, Timestamptz, Uuid};
use diesel_async::RunQueryDsl;
use keyset_core::ordering::{OrderClause, TableSchema};
use keyset_core::source::{OrderedSource, SliceQuery};
use keyset_core::types::{Record, Value};

use crate::sql::SqlStatement;
use crate::{ConnectionPool, PgError, PgResult, PooledConnection, TRACING_TARGET_QUERY};

/// A keyset source reading rows of type `R` from a base `SELECT`.
///
/// The base query is wrapped as a subquery, so it may join, filter and
/// project freely. It must expose every sort column, and every computed sort
/// expression under its alias.
pub struct PgSource<R> {
    pool: ConnectionPool,
    base: String,
    base_binds: Vec<Value>,
    schema: TableSchema,
    declared: Vec<OrderClause>,
    row: PhantomData<fn() -> R>,
}

impl<R> PgSource<R> {
    /// Creates a source over `base` with the given schema and ordering.
    pub fn new(
        pool: ConnectionPool,
        base: impl Into<String>,
        schema: TableSchema,
        declared: Vec<OrderClause>,
    ) -> Self {
        Self {
            pool,
            base: base.into(),
            base_binds: Vec::new(),
            schema,
            declared,
            row: PhantomData,
        }
    }

    /// Sets the values for the base query's own `$n` placeholders.
    pub fn with_binds(mut self, binds: impl IntoIterator<Item = Value>) -> Self {
        self.base_binds = binds.into_iter().collect();
        self
    }

    /// Returns the base query.
    #[inline]
    pub fn base_query(&self) -> &str {
        &self.base
    }

    /// Renders the statement a slice query would execute.
    pub fn statement(&self, query: &SliceQuery) -> SqlStatement {
        SqlStatement::render(&self.base, &self.base_binds, query)
    }

    async fn connection(&self) -> PgResult<PooledConnection> {
        self.pool.get().await.map_err(|e| {
            tracing::error!(target: TRACING_TARGET_QUERY, error = %e, "Failed to acquire connection from pool");
            PgError::from(e)
        })
    }
}

impl<R> fmt::Debug for PgSource<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgSource")
            .field("base", &self.base)
            .field("base_binds", &self.base_binds.len())
            .field("schema", &self.schema)
            .field("declared", &self.declared)
            .finish_non_exhaustive()
    }
}

impl<R> OrderedSource for PgSource<R>
where
    R: QueryableByName<Pg> + Record + Send + 'static,
{
    type Error = PgError;
    type Item = R;

    fn schema(&self) -> &TableSchema {
        &self.schema
    }

    fn declared_order(&self) -> &[OrderClause] {
        &self.declared
    }

    async fn fetch(&self, query: &SliceQuery) -> PgResult<Vec<R>> {
        let statement = self.statement(query);
        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            sql = %statement.sql,
            binds = statement.binds.len(),
            "Executing keyset query"
        );

        let mut conn = self.connection().await?;
        let sql_query = statement
            .binds
            .into_iter()
            .fold(diesel::sql_query(statement.sql).into_boxed::<Pg>(), bind_value);

        let rows = sql_query.load::<R>(&mut *conn).await.map_err(|e| {
            tracing::error!(target: TRACING_TARGET_QUERY, error = %e, "Keyset query failed");
            PgError::from(e)
        })?;

        tracing::debug!(target: TRACING_TARGET_QUERY, rows = rows.len(), "Keyset query completed");
        Ok(rows)
    }
}

/// Binds one value with the SQL type matching its kind.
fn bind_value(
    query: BoxedSqlQuery<'static, Pg, SqlQuery>,
    value: Value,
) -> BoxedSqlQuery<'static, Pg, SqlQuery> {
    match value {
        Value::Null => query.bind::<Nullable<Text>, _>(None::<String>),
        Value::Bool(value) => query.bind::<Bool, _>(value),
        Value::Int(value) => query.bind::<BigInt, _>(value),
        Value::Float(value) => query.bind::<Double, _>(value),
        Value::Text(value) => query.bind::<Text, _>(value),
        Value::Timestamp(value) => {
            query.bind::<Timestamptz, _>(jiff_diesel::Timestamp::from(value))
        }
        Value::Uuid(value) => query.bind::<Uuid, _>(value),
    }
}
