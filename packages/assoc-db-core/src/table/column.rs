//! Column definition within a table.

use serde::{Deserialize, Serialize};

/// Value type a column can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    /// Unsigned 64-bit integer (also the type of all key columns)
    U64,
    /// UTF-8 string
    Str,
    /// Boolean flag
    Bool,
}

impl ColumnType {
    /// Returns the type name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            ColumnType::U64 => "u64",
            ColumnType::Str => "str",
            ColumnType::Bool => "bool",
        }
    }
}

/// Column definition within a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Value type for this column
    pub ty: ColumnType,
}

impl Column {
    /// Creates a new column with the given name and type.
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// Shorthand for a `u64` column.
    pub fn u64(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::U64)
    }

    /// Shorthand for a string column.
    pub fn str(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Str)
    }

    /// Shorthand for a boolean column.
    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Bool)
    }
}
