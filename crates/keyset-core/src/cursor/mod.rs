//! Opaque cursor tokens.
//!
//! A cursor encodes the sort-key values of one record under one ordering.
//! Unlike an offset, it keeps pointing at the same position when rows are
//! inserted or deleted elsewhere in the source.

mod codec;
mod values;

pub use codec::CursorCodec;
pub use values::CursorValues;
