//! Primitive values and the record abstraction shared by every component.

mod record;
mod value;

pub use record::Record;
pub use value::Value;
