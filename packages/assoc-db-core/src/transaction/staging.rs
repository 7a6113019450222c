use std::collections::BTreeMap;

use crate::error::EngineError;
use crate::table::{Row, Table, TableData, Value};

use super::change::Change;

/// Holds the staged working copy of a single table.
///
/// Changes are isolated from the committed snapshot until commit and
/// provide read-your-writes within the owning transaction.
#[derive(Debug)]
pub struct StagingTable {
    /// Name of the table this staging copy belongs to
    pub table_name: String,
    /// Version of the committed snapshot this copy started from
    pub base_version: u64,
    /// Working copy of the table rows with staged changes applied
    pub rows: BTreeMap<u64, Row>,
    /// List of changes staged in this transaction
    pub changes: Vec<Change>,
}

impl StagingTable {
    /// Creates a staging copy from a table's current committed snapshot.
    ///
    /// # Arguments
    /// * `table` - The table to create a staging copy for
    ///
    /// # Returns
    /// A new `StagingTable` instance.
    pub fn new(table: &Table) -> Self {
        let snapshot = table.snapshot();
        Self {
            table_name: table.name.clone(),
            base_version: snapshot.version,
            rows: snapshot.rows.clone(),
            changes: Vec::new(),
        }
    }

    /// Stages a row insertion.
    ///
    /// The caller has already validated the row against the schema and
    /// allocated its id from the table's sequence.
    pub fn stage_insert(&mut self, row: Row) {
        let id = row.id;
        self.rows.insert(id, row);
        self.changes.push(Change::Insert { id });
    }

    /// Stages a row deletion.
    ///
    /// # Arguments
    /// * `id` - Id of the row to delete
    ///
    /// # Returns
    /// `Result<(), EngineError>` indicating success or failure.
    pub fn stage_delete(&mut self, id: u64) -> Result<(), EngineError> {
        match self.rows.remove(&id) {
            Some(original) => {
                self.changes.push(Change::Delete { id, original });
                Ok(())
            }
            None => Err(EngineError::RowNotFound {
                table: self.table_name.clone(),
                id,
            }),
        }
    }

    /// Returns ids of working rows whose value at `index` equals `value`,
    /// in row id order.
    pub fn ids_matching(&self, index: usize, value: &Value) -> Vec<u64> {
        self.rows
            .values()
            .filter(|row| row.get(index) == Some(value))
            .map(|row| row.id)
            .collect()
    }

    /// Returns whether a working row with the given id exists.
    pub fn contains_id(&self, id: u64) -> bool {
        self.rows.contains_key(&id)
    }

    /// Returns the number of rows in the working copy.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Converts the working copy into the snapshot to install at commit.
    pub fn to_table_data(&self) -> TableData {
        TableData {
            rows: self.rows.clone(),
            version: self.base_version + 1,
        }
    }
}
