//! Database container managing tables and transaction commit.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use crate::error::EngineError;
use crate::table::{Row, Schema, Table, Value};
use crate::transaction::TransactionHandle;

/// Database container holding all tables and serializing commits.
#[derive(Debug)]
pub struct Database {
    /// Map of table name to table instance
    tables: RwLock<HashMap<String, Table>>,
    /// Serializes commit validation and snapshot installation
    commit_lock: Mutex<()>,
}

impl Database {
    /// Creates a new empty database.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            commit_lock: Mutex::new(()),
        }
    }

    /// Creates a new table with the given name and schema.
    ///
    /// Foreign keys must reference tables that already exist (or the table
    /// being created).
    ///
    /// # Arguments
    /// * `name` - Table name
    /// * `schema` - Column definitions and constraints
    ///
    /// # Returns
    /// `Result<(), EngineError>` indicating success or failure.
    pub fn create_table(&self, name: String, schema: Schema) -> Result<(), EngineError> {
        let mut tables = self.tables.write().map_err(|_| EngineError::LockPoisoned)?;
        if tables.contains_key(&name) {
            return Err(EngineError::TableAlreadyExists(name));
        }
        for fk in &schema.foreign_keys {
            if fk.ref_table != name && !tables.contains_key(&fk.ref_table) {
                return Err(EngineError::TableNotFound {
                    table: fk.ref_table.clone(),
                });
            }
        }
        let table = Table::create(name.clone(), schema)?;
        tracing::debug!("Created table '{}'", name);
        tables.insert(name, table);
        Ok(())
    }

    /// Deletes a table by name.
    ///
    /// # Arguments
    /// * `name` - Table name
    ///
    /// # Returns
    /// `Result<(), EngineError>` indicating success or failure.
    pub fn delete_table(&self, name: &str) -> Result<(), EngineError> {
        let mut tables = self.tables.write().map_err(|_| EngineError::LockPoisoned)?;
        tables
            .remove(name)
            .ok_or_else(|| EngineError::TableNotFound {
                table: name.to_string(),
            })?;
        Ok(())
    }

    /// Gets a reference to a table by name.
    ///
    /// # Arguments
    /// * `name` - Table name
    ///
    /// # Returns
    /// `Result<TableRef, EngineError>` containing a read-only table reference.
    pub fn get_table(&self, name: &str) -> Result<TableRef<'_>, EngineError> {
        let tables = self.tables.read().map_err(|_| EngineError::LockPoisoned)?;
        // Verify table exists
        if !tables.contains_key(name) {
            return Err(EngineError::TableNotFound {
                table: name.to_string(),
            });
        }
        Ok(TableRef {
            inner: tables,
            key: name.to_string(),
        })
    }

    /// Returns the names of all tables.
    pub fn table_names(&self) -> Result<Vec<String>, EngineError> {
        let tables = self.tables.read().map_err(|_| EngineError::LockPoisoned)?;
        Ok(tables.keys().cloned().collect())
    }

    /// Returns the number of tables in the database.
    pub fn table_count(&self) -> Result<usize, EngineError> {
        let tables = self.tables.read().map_err(|_| EngineError::LockPoisoned)?;
        Ok(tables.len())
    }

    /// Executes a closure with a map of table references.
    ///
    /// This method locks the tables for reading and provides a HashMap
    /// of table references to the closure. The lock is held for the
    /// duration of the closure execution.
    ///
    /// # Arguments
    /// * `f` - Closure to execute with the table map
    ///
    /// # Returns
    /// `Result<R, EngineError>` containing the result of the closure.
    pub fn with_tables_map<F, R>(&self, f: F) -> Result<R, EngineError>
    where
        F: FnOnce(&HashMap<String, &Table>) -> R,
    {
        let tables = self.tables.read().map_err(|_| EngineError::LockPoisoned)?;
        let mut map = HashMap::with_capacity(tables.len());
        for (name, table) in tables.iter() {
            map.insert(name.clone(), table as &Table);
        }
        Ok(f(&map))
    }

    /// Stages a row insertion in the given transaction.
    ///
    /// # Arguments
    /// * `tx` - Transaction handle to stage into
    /// * `table` - Table to insert into
    /// * `values` - Cell values in column declaration order
    ///
    /// # Returns
    /// `Result<u64, EngineError>` containing the assigned row id.
    pub fn insert(
        &self,
        tx: &mut TransactionHandle,
        table: &str,
        values: Vec<Value>,
    ) -> Result<u64, EngineError> {
        self.with_tables_map(|tables| tx.transaction_mut().insert(tables, table, values))?
    }

    /// Stages deletion of every row whose `column` equals `value`.
    ///
    /// # Arguments
    /// * `tx` - Transaction handle to stage into
    /// * `table` - Table to delete from
    /// * `column` - Column name for the equality predicate
    /// * `value` - Value the column must equal
    ///
    /// # Returns
    /// `Result<usize, EngineError>` containing the number of rows deleted.
    pub fn delete_where(
        &self,
        tx: &mut TransactionHandle,
        table: &str,
        column: &str,
        value: &Value,
    ) -> Result<usize, EngineError> {
        self.with_tables_map(|tables| {
            tx.transaction_mut().delete_where(tables, table, column, value)
        })?
    }

    /// Stages deletion of a single row by id.
    ///
    /// # Arguments
    /// * `tx` - Transaction handle to stage into
    /// * `table` - Table to delete from
    /// * `id` - Row id
    ///
    /// # Returns
    /// `Result<(), EngineError>` indicating success or failure.
    pub fn delete_row(
        &self,
        tx: &mut TransactionHandle,
        table: &str,
        id: u64,
    ) -> Result<(), EngineError> {
        self.with_tables_map(|tables| tx.transaction_mut().delete_row(tables, table, id))?
    }

    /// Reads the transaction's view of a table, in row id order.
    ///
    /// # Arguments
    /// * `tx` - Transaction handle providing the view
    /// * `table` - Table to read
    ///
    /// # Returns
    /// `Result<Vec<Row>, EngineError>` containing the visible rows.
    pub fn transaction_rows(
        &self,
        tx: &TransactionHandle,
        table: &str,
    ) -> Result<Vec<Row>, EngineError> {
        self.with_tables_map(|tables| tx.transaction().rows(tables, table))?
    }

    /// Returns whether a row with the given id is visible in the
    /// transaction's view of a table.
    ///
    /// # Arguments
    /// * `tx` - Transaction handle providing the view
    /// * `table` - Table to probe
    /// * `id` - Row id
    ///
    /// # Returns
    /// `Result<bool, EngineError>` indicating visibility.
    pub fn transaction_contains(
        &self,
        tx: &TransactionHandle,
        table: &str,
        id: u64,
    ) -> Result<bool, EngineError> {
        self.with_tables_map(|tables| tx.transaction().contains_id(tables, table, id))?
    }

    /// Commits a transaction using this database's tables.
    ///
    /// Commits are serialized under the commit lock so version validation
    /// and snapshot installation are atomic with respect to each other.
    ///
    /// # Arguments
    /// * `tx` - Transaction handle to commit
    ///
    /// # Returns
    /// `Result<(), EngineError>` indicating success or failure.
    pub fn commit_transaction(&self, tx: &mut TransactionHandle) -> Result<(), EngineError> {
        let _commit = self
            .commit_lock
            .lock()
            .map_err(|_| EngineError::LockPoisoned)?;
        self.with_tables_map(|tables| tx.commit_with_tables(tables))?
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only reference to a table within the database.
pub struct TableRef<'a> {
    inner: std::sync::RwLockReadGuard<'a, HashMap<String, Table>>,
    key: String,
}

impl<'a> std::ops::Deref for TableRef<'a> {
    type Target = Table;

    fn deref(&self) -> &Self::Target {
        // SAFETY: The table exists because we just looked it up and the lock guard ensures
        // the HashMap is not mutated. The key is the same as used in lookup.
        self.inner
            .get(&self.key)
            .expect("Table should exist in HashMap")
    }
}
