//! Query methods over committed snapshots.

use super::row::{Row, Value};
use super::table::{Table, TableData};
use crate::error::EngineError;

impl TableData {
    /// Returns references to rows whose value at `index` equals `value`,
    /// in row id order.
    pub fn scan_eq(&self, index: usize, value: &Value) -> Vec<&Row> {
        self.rows
            .values()
            .filter(|row| row.get(index) == Some(value))
            .collect()
    }
}

impl Table {
    /// Scans committed rows with a single column equality filter.
    ///
    /// # Arguments
    /// * `column` - Column name to filter on
    /// * `value` - Value the column must equal
    ///
    /// # Returns
    /// `Result<Vec<Row>, EngineError>` containing matching rows in id order.
    ///
    /// # Performance
    /// - O(n) where n is the number of committed rows
    /// - Reads a single snapshot; never blocks writers
    pub fn scan_eq(&self, column: &str, value: &Value) -> Result<Vec<Row>, EngineError> {
        let index = self.column_index(column)?;
        let snapshot = self.snapshot();
        Ok(snapshot
            .scan_eq(index, value)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Returns all committed rows in id order.
    pub fn rows(&self) -> Vec<Row> {
        self.snapshot().rows.values().cloned().collect()
    }

    /// Returns whether a committed row with the given id exists.
    pub fn contains_id(&self, id: u64) -> bool {
        self.snapshot().contains_id(id)
    }
}
