//! Ordered sources the engine pages over.
//!
//! A source declares its ordering and schema, and executes one bounded read
//! per request: filter by a [`Condition`], sort by the given descriptors,
//! take at most `limit` rows.

mod memory;

use std::future::Future;

pub use memory::MemorySource;

use crate::ordering::{KeysetOrdering, OrderClause, TableSchema};
use crate::predicate::Condition;
use crate::types::Record;

/// One bounded read against an ordered source.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceQuery {
    /// Ordering to return rows in; reversed when paging from the tail.
    pub ordering: KeysetOrdering,
    /// Additional predicate intersected with the source, if any.
    pub condition: Option<Condition>,
    /// Maximum number of rows to return.
    pub limit: usize,
}

/// An ordered collection of records supporting keyset reads.
pub trait OrderedSource: Send + Sync {
    /// Row type produced by the source.
    type Item: Record + Send;

    /// Storage error type, passed through to callers untouched.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the primary key and column nullability.
    fn schema(&self) -> &TableSchema;

    /// Returns the ordering the source was configured with.
    fn declared_order(&self) -> &[OrderClause];

    /// Executes one bounded, ordered, filtered read.
    fn fetch(
        &self,
        query: &SliceQuery,
    ) -> impl Future<Output = Result<Vec<Self::Item>, Self::Error>> + Send;
}
