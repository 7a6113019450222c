use crate::table::Row;

/// Represents a single change to a table's row set.
#[derive(Debug, Clone)]
pub enum Change {
    /// Insert a new row
    Insert {
        /// Id assigned to the inserted row
        id: u64,
    },
    /// Delete an existing row
    Delete {
        /// Id of the deleted row
        id: u64,
        /// Original row (kept for diagnostics and conflict analysis)
        original: Row,
    },
}
