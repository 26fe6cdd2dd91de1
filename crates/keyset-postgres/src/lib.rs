#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging.

/// Tracing target for keyset query operations.
///
/// Use this target for logging rendered statements, row counts and query errors.
pub const TRACING_TARGET_QUERY: &str = "keyset_postgres::queries";

/// Tracing target for database connection operations.
///
/// Use this target for logging pool creation and connection acquisition.
pub const TRACING_TARGET_CONNECTION: &str = "keyset_postgres::connection";

mod config;
mod error;
mod source;
pub mod sql;

use deadpool::managed::{Object, Pool};
use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;

pub use crate::config::PgSourceConfig;
pub use crate::error::{PgError, PgResult};
pub use crate::source::PgSource;
pub use crate::sql::SqlStatement;

/// Type alias for the connection pool sources read through.
pub type ConnectionPool = Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;

/// Type alias for a connection object from the pool.
pub type PooledConnection = Object<AsyncDieselConnectionManager<AsyncPgConnection>>;
