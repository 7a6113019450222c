//! Table schema and committed snapshot management.
//!
//! Each table has:
//! - Fixed schema with column definitions and declared constraints
//! - ArcSwap snapshot for lock-free committed reads
//! - Row ID sequence generator
//! - Snapshot version counter for commit conflict detection

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::error::EngineError;

use super::column::{Column, ColumnType};
use super::constraint::{ForeignKey, UniqueKey};
use super::row::Row;

/// Table schema: columns plus declared constraints.
#[derive(Debug, Clone)]
pub struct Schema {
    /// Column definitions in declaration order
    pub columns: Vec<Column>,
    /// Foreign keys from columns of this table to other tables
    pub foreign_keys: Vec<ForeignKey>,
    /// Uniqueness constraints
    pub unique_keys: Vec<UniqueKey>,
}

impl Schema {
    /// Creates a schema with no constraints.
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            foreign_keys: Vec::new(),
            unique_keys: Vec::new(),
        }
    }

    /// Adds a foreign key to the schema.
    pub fn with_foreign_key(mut self, fk: ForeignKey) -> Self {
        self.foreign_keys.push(fk);
        self
    }

    /// Adds a uniqueness constraint to the schema.
    pub fn with_unique_key(mut self, key: UniqueKey) -> Self {
        self.unique_keys.push(key);
        self
    }

    /// Returns the index of the named column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Validates column names and constraint references.
    ///
    /// # Arguments
    /// * `table` - Table name used in error reporting
    ///
    /// # Returns
    /// `Result<(), EngineError>` indicating success or validation failure.
    pub(crate) fn validate(&self, table: &str) -> Result<(), EngineError> {
        let mut seen_names = HashSet::new();
        for column in &self.columns {
            if !seen_names.insert(&column.name) {
                return Err(EngineError::DuplicateColumn {
                    table: table.to_string(),
                    column: column.name.clone(),
                });
            }
        }

        for fk in &self.foreign_keys {
            match self.column_index(&fk.column) {
                Some(index) => {
                    // Foreign keys reference row ids, so the column must be u64
                    let column = &self.columns[index];
                    if column.ty != ColumnType::U64 {
                        return Err(EngineError::TypeMismatch {
                            table: table.to_string(),
                            column: column.name.clone(),
                            expected: ColumnType::U64.name().to_string(),
                            got: column.ty.name().to_string(),
                        });
                    }
                }
                None => {
                    return Err(EngineError::ColumnNotFound {
                        table: table.to_string(),
                        column: fk.column.clone(),
                    });
                }
            }
        }

        for key in &self.unique_keys {
            for column in &key.columns {
                if self.column_index(column).is_none() {
                    return Err(EngineError::ColumnNotFound {
                        table: table.to_string(),
                        column: column.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Immutable committed snapshot of a table's rows.
///
/// Readers hold an `Arc<TableData>` and are never blocked by writers;
/// commits install a new snapshot with an incremented version.
#[derive(Debug, Clone)]
pub struct TableData {
    /// Rows keyed by surrogate id, iterated in id order
    pub rows: BTreeMap<u64, Row>,
    /// Snapshot version, incremented on every commit
    pub version: u64,
}

impl TableData {
    /// Creates an empty snapshot at version 0.
    pub fn empty() -> Self {
        Self {
            rows: BTreeMap::new(),
            version: 0,
        }
    }

    /// Returns whether a row with the given id exists in this snapshot.
    pub fn contains_id(&self, id: u64) -> bool {
        self.rows.contains_key(&id)
    }
}

/// Table schema and snapshot management.
#[derive(Debug)]
pub struct Table {
    /// Table name
    pub name: String,
    /// Schema with columns and constraints
    schema: Schema,
    /// Committed snapshot, swapped atomically on commit
    data: ArcSwap<TableData>,
    /// Next row ID to assign (atomic counter)
    next_id: AtomicU64,
}

impl Table {
    /// Creates a new empty table with the given name and schema.
    ///
    /// # Arguments
    /// * `name` - Table name
    /// * `schema` - Column definitions and constraints
    ///
    /// # Returns
    /// `Result<Table, EngineError>` containing the created table or an error.
    pub fn create(name: String, schema: Schema) -> Result<Self, EngineError> {
        schema.validate(&name)?;

        Ok(Self {
            name,
            schema,
            data: ArcSwap::from_pointee(TableData::empty()),
            next_id: AtomicU64::new(1), // Start IDs at 1
        })
    }

    /// Returns the table schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the index of the named column.
    ///
    /// # Arguments
    /// * `column` - Column name
    ///
    /// # Returns
    /// `Result<usize, EngineError>` containing the column index or an error.
    pub fn column_index(&self, column: &str) -> Result<usize, EngineError> {
        self.schema
            .column_index(column)
            .ok_or_else(|| EngineError::ColumnNotFound {
                table: self.name.clone(),
                column: column.to_string(),
            })
    }

    /// Loads the current committed snapshot.
    pub fn snapshot(&self) -> Arc<TableData> {
        self.data.load_full()
    }

    /// Atomically installs a new committed snapshot.
    pub(crate) fn install_snapshot(&self, data: TableData) {
        self.data.store(Arc::new(data));
    }

    /// Allocates and returns the next row ID.
    pub fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Returns the next row ID without allocating it.
    pub fn current_next_id(&self) -> u64 {
        self.next_id.load(Ordering::SeqCst)
    }

    /// Returns the number of committed rows.
    pub fn row_count(&self) -> usize {
        self.data.load().rows.len()
    }
}
