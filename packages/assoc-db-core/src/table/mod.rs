//! Table schema, constraints, and committed snapshot management.

mod column;
mod constraint;
mod query;
mod row;
#[allow(clippy::module_inception)]
mod table;

pub use column::{Column, ColumnType};
pub use constraint::{ForeignKey, ReferentialAction, UniqueKey};
pub use row::{Row, Value};
pub use table::{Schema, Table, TableData};
