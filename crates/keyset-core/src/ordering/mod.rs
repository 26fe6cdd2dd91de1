//! Sort orderings: declared clauses, their classification, and the validated
//! descriptor list keyset pagination runs on.
//!
//! A source declares its ordering as a list of [`OrderClause`]s. The
//! [`OrderExtractor`] classifies each clause, drops (or rejects) entries it
//! cannot page over, and validates the result into a [`KeysetOrdering`].

mod classify;
mod clause;
mod descriptor;
mod extract;

use std::cmp::Ordering;

use derive_more::Deref;
use sha2::{Digest, Sha256};

pub use self::classify::{CASE_ORDER_ALIAS, Classified};
pub use self::clause::{ColumnRef, NullsOrder, OrderClause, SortExpr, SortOrder};
pub use self::descriptor::{Nullable, OrderDescriptor, Transform, ValueExpression};
pub use self::extract::{OrderExtractor, TableSchema};
use crate::error::OrderingError;
use crate::types::{Record, Value};

/// A validated, total ordering of one or two sort descriptors.
///
/// The final descriptor is always the non-nullable, distinct tie-breaker,
/// so no two rows ever compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deref)]
pub struct KeysetOrdering {
    descriptors: Vec<OrderDescriptor>,
}

impl KeysetOrdering {
    /// Maximum number of sort descriptors.
    pub const MAX_FIELDS: usize = 2;

    /// Validates a descriptor list.
    pub fn new(descriptors: Vec<OrderDescriptor>) -> Result<Self, OrderingError> {
        let Some(last) = descriptors.last() else {
            return Err(OrderingError::Empty);
        };

        if descriptors.len() > Self::MAX_FIELDS {
            return Err(OrderingError::TooManyFields {
                count: descriptors.len(),
                max: Self::MAX_FIELDS,
            });
        }

        if last.is_nullable() {
            return Err(OrderingError::NullableTieBreaker {
                attribute: last.attribute_name().to_owned(),
            });
        }

        if !last.is_distinct() {
            return Err(OrderingError::TieBreakerNotLast {
                attribute: last.attribute_name().to_owned(),
                expected: "a distinct column".to_owned(),
            });
        }

        Ok(Self { descriptors })
    }

    /// Returns the descriptors in sort priority order.
    #[inline]
    pub fn descriptors(&self) -> &[OrderDescriptor] {
        &self.descriptors
    }

    /// Returns the final, distinct descriptor.
    pub fn tie_breaker(&self) -> &OrderDescriptor {
        // Non-empty by construction.
        &self.descriptors[self.descriptors.len() - 1]
    }

    /// Returns the ordering that visits rows in exactly the opposite order.
    pub fn reversed(&self) -> Self {
        Self {
            descriptors: self.descriptors.iter().map(OrderDescriptor::reversed).collect(),
        }
    }

    /// Returns a short, stable fingerprint of the ordering.
    ///
    /// Cursors embed it so that a token issued under one ordering is rejected
    /// by a connection configured with another.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for descriptor in &self.descriptors {
            hasher.update(descriptor.attribute_name().as_bytes());
            hasher.update([0]);
            hasher.update(descriptor.sort_direction().as_sql().as_bytes());
            hasher.update([0]);
            hasher.update(descriptor.effective_nulls().as_sql().as_bytes());
            hasher.update([0xff]);
        }
        hex::encode(&hasher.finalize()[..8])
    }

    /// Orders two records under this ordering.
    pub fn compare<A, B>(&self, a: &A, b: &B) -> Ordering
    where
        A: Record + ?Sized,
        B: Record + ?Sized,
    {
        self.descriptors
            .iter()
            .map(|descriptor| {
                let left = descriptor.evaluate(a).unwrap_or(Value::Null);
                let right = descriptor.evaluate(b).unwrap_or(Value::Null);
                descriptor.compare_values(&left, &right)
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}
