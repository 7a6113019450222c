use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::EngineError;
use crate::table::{ReferentialAction, Row, Table, Value};

use super::staging::StagingTable;

/// Transaction context holding staged changes across multiple tables.
///
/// Statements validate constraints against the transaction's own view
/// (staged working copies where touched, committed snapshots otherwise),
/// so a transaction reads its own writes. Changes stay invisible to
/// other readers until commit.
#[derive(Debug)]
pub struct Transaction {
    /// Map of table name to staging copy
    staging: HashMap<String, StagingTable>,
    /// Whether the transaction has been committed
    committed: AtomicBool,
    /// Whether the transaction has been aborted
    aborted: AtomicBool,
}

impl Transaction {
    /// Creates a new empty transaction.
    pub fn new() -> Self {
        Self {
            staging: HashMap::new(),
            committed: AtomicBool::new(false),
            aborted: AtomicBool::new(false),
        }
    }

    fn ensure_active(&self) -> Result<(), EngineError> {
        if self.is_committed() {
            return Err(EngineError::TransactionConflict(
                "transaction already committed".to_string(),
            ));
        }

        if self.is_aborted() {
            return Err(EngineError::TransactionConflict(
                "transaction aborted".to_string(),
            ));
        }

        Ok(())
    }

    /// Gets or creates the staging copy for the given table.
    ///
    /// # Arguments
    /// * `table` - The table to get/create a staging copy for
    ///
    /// # Returns
    /// `Result<&mut StagingTable, EngineError>` containing the staging copy.
    pub fn get_or_create_staging(
        &mut self,
        table: &Table,
    ) -> Result<&mut StagingTable, EngineError> {
        self.ensure_active()?;

        Ok(self
            .staging
            .entry(table.name.clone())
            .or_insert_with(|| StagingTable::new(table)))
    }

    fn lookup<'a>(
        tables: &'a HashMap<String, &Table>,
        table_name: &str,
    ) -> Result<&'a Table, EngineError> {
        tables
            .get(table_name)
            .copied()
            .ok_or_else(|| EngineError::TableNotFound {
                table: table_name.to_string(),
            })
    }

    /// Returns whether a row with the given id exists in the transaction's
    /// view of a table.
    fn view_contains_id(
        &self,
        tables: &HashMap<String, &Table>,
        table_name: &str,
        id: u64,
    ) -> Result<bool, EngineError> {
        if let Some(staging) = self.staging.get(table_name) {
            return Ok(staging.contains_id(id));
        }
        Ok(Self::lookup(tables, table_name)?.snapshot().contains_id(id))
    }

    /// Returns ids of rows in the transaction's view of `table` whose value
    /// at `index` equals `value`.
    fn view_ids_matching(&self, table: &Table, index: usize, value: &Value) -> Vec<u64> {
        match self.staging.get(&table.name) {
            Some(staging) => staging.ids_matching(index, value),
            None => table
                .snapshot()
                .scan_eq(index, value)
                .into_iter()
                .map(|row| row.id)
                .collect(),
        }
    }

    /// Returns whether the transaction's view of `table` already holds a row
    /// matching `candidate` at the given column indices.
    fn view_unique_conflict(&self, table: &Table, indices: &[usize], candidate: &[&Value]) -> bool {
        let matches = |row: &Row| {
            indices
                .iter()
                .zip(candidate)
                .all(|(&index, value)| row.get(index) == Some(value))
        };
        match self.staging.get(&table.name) {
            Some(staging) => staging.rows.values().any(|row| matches(row)),
            None => table.snapshot().rows.values().any(|row| matches(row)),
        }
    }

    /// Reads the transaction's view of a table, in row id order.
    ///
    /// # Arguments
    /// * `tables` - Map of table name to Table reference
    /// * `table_name` - Table to read
    ///
    /// # Returns
    /// `Result<Vec<Row>, EngineError>` containing the visible rows.
    pub fn rows(
        &self,
        tables: &HashMap<String, &Table>,
        table_name: &str,
    ) -> Result<Vec<Row>, EngineError> {
        if let Some(staging) = self.staging.get(table_name) {
            return Ok(staging.rows.values().cloned().collect());
        }
        Ok(Self::lookup(tables, table_name)?.rows())
    }

    /// Returns whether a row with the given id is visible in the
    /// transaction's view of a table.
    ///
    /// # Arguments
    /// * `tables` - Map of table name to Table reference
    /// * `table_name` - Table to probe
    /// * `id` - Row id
    ///
    /// # Returns
    /// `Result<bool, EngineError>` indicating visibility.
    pub fn contains_id(
        &self,
        tables: &HashMap<String, &Table>,
        table_name: &str,
        id: u64,
    ) -> Result<bool, EngineError> {
        self.view_contains_id(tables, table_name, id)
    }

    /// Stages a row insertion after validating schema and constraints.
    ///
    /// Foreign keys are checked against the transaction's view of the
    /// referenced tables; uniqueness against the view of the target table.
    ///
    /// # Arguments
    /// * `tables` - Map of table name to Table reference
    /// * `table_name` - Table to insert into
    /// * `values` - Cell values in column declaration order
    ///
    /// # Returns
    /// `Result<u64, EngineError>` containing the assigned row id.
    pub fn insert(
        &mut self,
        tables: &HashMap<String, &Table>,
        table_name: &str,
        values: Vec<Value>,
    ) -> Result<u64, EngineError> {
        self.ensure_active()?;
        let table = Self::lookup(tables, table_name)?;
        let schema = table.schema();

        if values.len() != schema.columns.len() {
            return Err(EngineError::ArityMismatch {
                table: table.name.clone(),
                expected: schema.columns.len(),
                got: values.len(),
            });
        }

        for (column, value) in schema.columns.iter().zip(&values) {
            if !value.matches(column.ty) {
                return Err(EngineError::TypeMismatch {
                    table: table.name.clone(),
                    column: column.name.clone(),
                    expected: column.ty.name().to_string(),
                    got: value.type_name().to_string(),
                });
            }
        }

        for fk in &schema.foreign_keys {
            let index = table.column_index(&fk.column)?;
            // Schema validation pinned foreign-key columns to u64
            let Some(ref_id) = values[index].as_u64() else {
                return Err(EngineError::TypeMismatch {
                    table: table.name.clone(),
                    column: fk.column.clone(),
                    expected: "u64".to_string(),
                    got: values[index].type_name().to_string(),
                });
            };
            if !self.view_contains_id(tables, &fk.ref_table, ref_id)? {
                return Err(EngineError::ForeignKeyViolation {
                    table: table.name.clone(),
                    column: fk.column.clone(),
                    value: ref_id,
                    ref_table: fk.ref_table.clone(),
                });
            }
        }

        for key in &schema.unique_keys {
            let indices = key
                .columns
                .iter()
                .map(|column| table.column_index(column))
                .collect::<Result<Vec<_>, _>>()?;
            let candidate: Vec<&Value> = indices.iter().map(|&index| &values[index]).collect();
            if self.view_unique_conflict(table, &indices, &candidate) {
                return Err(EngineError::UniqueViolation {
                    table: table.name.clone(),
                    columns: key.columns.join(", "),
                });
            }
        }

        let id = table.next_id();
        let staging = self.get_or_create_staging(table)?;
        staging.stage_insert(Row::new(id, values));
        Ok(id)
    }

    /// Stages deletion of every row whose `column` equals `value`.
    ///
    /// Matching zero rows is success, not an error.
    ///
    /// # Arguments
    /// * `tables` - Map of table name to Table reference
    /// * `table_name` - Table to delete from
    /// * `column` - Column name for the equality predicate
    /// * `value` - Value the column must equal
    ///
    /// # Returns
    /// `Result<usize, EngineError>` containing the number of rows deleted
    /// from the named table (cascaded deletes are not counted).
    pub fn delete_where(
        &mut self,
        tables: &HashMap<String, &Table>,
        table_name: &str,
        column: &str,
        value: &Value,
    ) -> Result<usize, EngineError> {
        self.ensure_active()?;
        let table = Self::lookup(tables, table_name)?;
        let index = table.column_index(column)?;

        let ids = self.view_ids_matching(table, index, value);
        let affected = ids.len();
        self.delete_ids(tables, table_name, &ids)?;
        Ok(affected)
    }

    /// Stages deletion of a single row by id.
    ///
    /// # Arguments
    /// * `tables` - Map of table name to Table reference
    /// * `table_name` - Table to delete from
    /// * `id` - Row id
    ///
    /// # Returns
    /// `Result<(), EngineError>` indicating success or failure.
    pub fn delete_row(
        &mut self,
        tables: &HashMap<String, &Table>,
        table_name: &str,
        id: u64,
    ) -> Result<(), EngineError> {
        self.ensure_active()?;
        if !self.view_contains_id(tables, table_name, id)? {
            return Err(EngineError::RowNotFound {
                table: table_name.to_string(),
                id,
            });
        }
        self.delete_ids(tables, table_name, &[id])
    }

    /// Deletes the given rows, applying each inbound foreign key's declared
    /// referential action: Restrict refuses, Cascade stages dependent
    /// deletes in the same transaction.
    fn delete_ids(
        &mut self,
        tables: &HashMap<String, &Table>,
        table_name: &str,
        ids: &[u64],
    ) -> Result<(), EngineError> {
        if ids.is_empty() {
            return Ok(());
        }

        let table = Self::lookup(tables, table_name)?;

        // Stage the deletes first so self-referential cascades terminate
        let staging = self.get_or_create_staging(table)?;
        for &id in ids {
            staging.stage_delete(id)?;
        }

        // Visit referencing tables in sorted name order for deterministic
        // cascade ordering
        let mut names: Vec<&String> = tables.keys().collect();
        names.sort();

        for name in names {
            let referencing = Self::lookup(tables, name)?;
            for fk in &referencing.schema().foreign_keys {
                if fk.ref_table != table_name {
                    continue;
                }
                let index = referencing.column_index(&fk.column)?;

                let mut dependents = Vec::new();
                for &id in ids {
                    let matches = self.view_ids_matching(referencing, index, &Value::U64(id));
                    if matches.is_empty() {
                        continue;
                    }
                    match fk.on_delete {
                        ReferentialAction::Restrict => {
                            return Err(EngineError::RestrictedDelete {
                                table: table_name.to_string(),
                                id,
                                ref_table: referencing.name.clone(),
                                ref_column: fk.column.clone(),
                            });
                        }
                        ReferentialAction::Cascade => dependents.extend(matches),
                    }
                }

                if !dependents.is_empty() {
                    self.delete_ids(tables, &referencing.name, &dependents)?;
                }
            }
        }

        Ok(())
    }

    /// Commits all staged changes atomically.
    ///
    /// Every staged table's base version is validated against the live
    /// table before any snapshot is installed; a mismatch fails the whole
    /// commit with `TransactionConflict` and nothing is applied. Callers
    /// serialize commits (`Database::commit_transaction` holds the commit
    /// lock).
    ///
    /// # Arguments
    /// * `tables` - Map of table name to Table reference
    ///
    /// # Returns
    /// `Result<(), EngineError>` indicating success or failure.
    pub fn commit(&mut self, tables: &HashMap<String, &Table>) -> Result<(), EngineError> {
        self.ensure_active()?;

        // Sort staged tables by name so commits apply in a stable order
        let mut staged: Vec<&StagingTable> = self.staging.values().collect();
        staged.sort_by(|a, b| a.table_name.cmp(&b.table_name));

        // Validate every staged table before touching any of them
        for staging in &staged {
            let table = Self::lookup(tables, &staging.table_name)?;
            let current = table.snapshot();
            if current.version != staging.base_version {
                return Err(EngineError::TransactionConflict(format!(
                    "table '{}' changed since transaction start (version {}, expected {})",
                    staging.table_name, current.version, staging.base_version
                )));
            }
        }

        // Apply the new snapshots
        for staging in &staged {
            let table = Self::lookup(tables, &staging.table_name)?;
            table.install_snapshot(staging.to_table_data());
        }

        tracing::debug!("Committed {} staged table(s)", staged.len());

        // Mark as committed
        self.committed.store(true, Ordering::Release);
        Ok(())
    }

    /// Aborts the transaction, discarding all staged changes.
    pub fn abort(&mut self) {
        if !self.is_committed() && !self.is_aborted() {
            self.aborted.store(true, Ordering::Release);
            self.staging.clear();
        }
    }

    /// Returns whether the transaction has been committed.
    pub fn is_committed(&self) -> bool {
        self.committed.load(Ordering::Acquire)
    }

    /// Returns whether the transaction has been aborted.
    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }

    /// Returns whether the transaction is still active (not committed or aborted).
    pub fn is_active(&self) -> bool {
        !self.is_committed() && !self.is_aborted()
    }

    /// Returns the number of tables with staged changes.
    pub fn staged_table_count(&self) -> usize {
        self.staging.len()
    }

    /// Returns whether any changes have been staged.
    pub fn has_staged_changes(&self) -> bool {
        !self.staging.is_empty()
    }
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}
