//! Convenient re-exports for common use.

pub use crate::config::KeysetConfig;
pub use crate::cursor::CursorCodec;
pub use crate::error::{Error, ErrorKind, OrderingError, Result};
pub use crate::ordering::{
    KeysetOrdering, NullsOrder, OrderClause, OrderExtractor, SortExpr, SortOrder, TableSchema,
};
pub use crate::source::{MemorySource, OrderedSource, SliceQuery};
pub use crate::types::{Record, Value};
pub use crate::window::{PageInfo, Paginator, Window, WindowRequest};
