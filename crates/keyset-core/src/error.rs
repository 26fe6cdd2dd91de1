//! Error types for keyset pagination.
//!
//! Errors fall into three caller-facing groups: configuration errors raised
//! while an ordering is extracted, request errors (invalid cursors and
//! conflicting arguments) that must be reported to the client instead of
//! producing an empty page, and storage errors passed through untouched.

use std::borrow::Cow;

use strum::{AsRefStr, IntoStaticStr};

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with the crate's [`Error`] type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Reasons a declared ordering cannot be used for keyset pagination.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderingError {
    /// No usable ordering entry remained after classification.
    #[error("A minimum of 1 ordering field is required")]
    Empty,

    /// More sort columns than the engine can page over.
    #[error("A maximum of {max} ordering fields are allowed, got {count}")]
    TooManyFields {
        /// Number of classified entries.
        count: usize,
        /// Maximum supported.
        max: usize,
    },

    /// The final column may hold nulls, so it cannot break ties.
    #[error("Column `{attribute}` must not allow NULL")]
    NullableTieBreaker {
        /// Attribute name of the offending descriptor.
        attribute: String,
    },

    /// The final column is not the unique tie-breaker.
    #[error("Last ordering field must be the primary key `{expected}`, got `{attribute}`")]
    TieBreakerNotLast {
        /// Attribute name of the final descriptor.
        attribute: String,
        /// The source's primary key.
        expected: String,
    },

    /// An entry could not be classified and strict mode is enabled.
    #[error("Ordering entry {position} is not supported: {reason}")]
    Unclassified {
        /// Zero-based position in the declared ordering.
        position: usize,
        /// Why classification failed.
        reason: Cow<'static, str>,
    },
}

/// Categories of errors that can occur while paginating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The ordering is unusable for keyset pagination.
    Configuration,
    /// A `before`/`after` cursor is malformed or does not fit the ordering.
    InvalidCursor,
    /// `first` and `last` were both supplied.
    ConflictingArguments,
    /// A record does not expose a field the ordering needs.
    MissingAttribute,
    /// A cursor payload could not be serialized.
    Serialization,
    /// The underlying source failed.
    Source,
}

/// Comprehensive error type for keyset pagination.
#[derive(Debug, thiserror::Error)]
#[must_use = "pagination errors should be handled appropriately"]
pub enum Error {
    /// The declared ordering cannot be paged over.
    ///
    /// Raised when the engine is configured, before any request is served.
    #[error("Configuration error: {0}")]
    Configuration(#[from] OrderingError),

    /// A supplied cursor failed to decode or does not match the ordering.
    ///
    /// This is distinct from a valid cursor that matches no rows.
    #[error("Invalid cursor: {0}")]
    InvalidCursor(Cow<'static, str>),

    /// Both `first` and `last` were supplied.
    #[error("Can only provide either `first` or `last`, not both")]
    ConflictingArguments,

    /// A record does not expose a sort field.
    #[error("Record does not expose sort attribute `{0}`")]
    MissingAttribute(String),

    /// Cursor payload serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The underlying source failed; the original error is kept as the source.
    #[error("Source error: {0}")]
    Source(#[source] BoxedError),
}

impl Error {
    /// Creates an invalid cursor error with the given reason.
    pub fn invalid_cursor(reason: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidCursor(reason.into())
    }

    /// Wraps a storage error without altering it.
    pub fn from_source(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Source(Box::new(error))
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::InvalidCursor(_) => ErrorKind::InvalidCursor,
            Self::ConflictingArguments => ErrorKind::ConflictingArguments,
            Self::MissingAttribute(_) => ErrorKind::MissingAttribute,
            Self::Serialization(_) => ErrorKind::Serialization,
            Self::Source(_) => ErrorKind::Source,
        }
    }

    /// Returns whether the request itself was malformed.
    ///
    /// Client errors should be reported as rejected requests, never as an
    /// empty page.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidCursor | ErrorKind::ConflictingArguments
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_are_flagged() {
        assert!(Error::ConflictingArguments.is_client_error());
        assert!(Error::invalid_cursor("bad").is_client_error());
        assert!(!Error::from(OrderingError::Empty).is_client_error());
    }

    #[test]
    fn kind_names_are_snake_case() {
        assert_eq!(Error::invalid_cursor("bad").kind().as_ref(), "invalid_cursor");
        let kind: &'static str = ErrorKind::ConflictingArguments.into();
        assert_eq!(kind, "conflicting_arguments");
    }

    #[test]
    fn source_keeps_original_error() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "slow");
        let Error::Source(inner) = Error::from_source(io) else {
            panic!("expected source error");
        };
        assert!(inner.downcast_ref::<std::io::Error>().is_some());
    }
}
