//! Storage engine error types.

use thiserror::Error;

/// Storage engine operation errors.
#[derive(Error, Debug, Clone)]
pub enum EngineError {
    /// Table not found
    #[error("Table '{table}' not found")]
    TableNotFound { table: String },

    /// Table already exists
    #[error("Table '{0}' already exists")]
    TableAlreadyExists(String),

    /// Column not found in table
    #[error("Column '{column}' not found in table '{table}'")]
    ColumnNotFound { table: String, column: String },

    /// Duplicate column name in a table definition
    #[error("Column '{column}' declared twice in table '{table}'")]
    DuplicateColumn { table: String, column: String },

    /// Row value count does not match the table's column count
    #[error("Table '{table}' expects {expected} values, got {got}")]
    ArityMismatch {
        table: String,
        expected: usize,
        got: usize,
    },

    /// Value type does not match the column type
    #[error("Type mismatch for column '{column}' in table '{table}': expected {expected}, got {got}")]
    TypeMismatch {
        table: String,
        column: String,
        expected: String,
        got: String,
    },

    /// Foreign key references a row that does not exist
    #[error(
        "Foreign key violation: {table}.{column} = {value} has no matching row in '{ref_table}'"
    )]
    ForeignKeyViolation {
        table: String,
        column: String,
        value: u64,
        ref_table: String,
    },

    /// Deleting a row that other rows still reference
    #[error(
        "Foreign key violation: row {id} in '{table}' is still referenced by '{ref_table}.{ref_column}'"
    )]
    RestrictedDelete {
        table: String,
        id: u64,
        ref_table: String,
        ref_column: String,
    },

    /// Unique constraint violated
    #[error("Unique violation on {table}({columns}): duplicate value")]
    UniqueViolation { table: String, columns: String },

    /// Row not found
    #[error("Row {id} not found in table '{table}'")]
    RowNotFound { table: String, id: u64 },

    /// Transaction conflict
    #[error("Transaction conflict: {0}")]
    TransactionConflict(String),

    /// Operation timeout
    #[error("Operation timeout")]
    Timeout,

    /// Lock poisoned (RwLock poisoned)
    #[error("Lock poisoned")]
    LockPoisoned,
}
