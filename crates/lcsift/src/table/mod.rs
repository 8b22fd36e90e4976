//! In-memory tables: typed columns plus table-level metadata.

mod column;
mod frame;
mod value;

pub use column::Column;
pub use frame::{Metadata, Table};
pub use value::{Value, ValueType};

pub(crate) use value::parse_bool;
