#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging.

/// Tracing target for ordering extraction.
///
/// Use this target for logging classification of declared ordering entries,
/// dropped entries and validation failures.
pub const TRACING_TARGET_ORDERING: &str = "keyset_core::ordering";

/// Tracing target for cursor encoding and decoding.
///
/// Cursor contents are never logged, only why a token was rejected.
pub const TRACING_TARGET_CURSOR: &str = "keyset_core::cursor";

/// Tracing target for page window resolution.
pub const TRACING_TARGET_WINDOW: &str = "keyset_core::window";

mod config;
mod error;

pub mod cursor;
pub mod ordering;
pub mod predicate;
pub mod prelude;
pub mod source;
pub mod types;
pub mod window;

pub use crate::config::KeysetConfig;
pub use crate::error::{BoxedError, Error, ErrorKind, OrderingError, Result};
pub use crate::window::{Anchor, Edge, PageInfo, Paginator, Window, WindowRequest};
