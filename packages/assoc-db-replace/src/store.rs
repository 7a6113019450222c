//! Association store: the caller-facing replace and read-back surface.

use std::sync::Arc;
use std::time::Duration;

use assoc_db_core::table::Value;
use assoc_db_core::Database;
use parking_lot::Mutex;

use crate::config::ReplaceConfig;
use crate::error::ReplaceError;
use crate::executor;
use crate::executor::ReplaceSummary;
use crate::relation::{RelationDef, RelationRegistry};
use crate::statement::{StatementSink, TracingSink};
use crate::unit_of_work::UnitOfWork;

/// Caller-facing store for transactional association replacement.
///
/// Wraps an engine database, a registry of relations, and an injected
/// statement sink. At most one unit of work is active per store.
pub struct AssociationStore {
    /// Engine holding the entity and join tables
    engine: Arc<Database>,
    /// Registered relations, in processing order
    relations: RelationRegistry,
    /// Retry configuration
    config: ReplaceConfig,
    /// Injected sink receiving issued statements
    sink: Arc<dyn StatementSink>,
    /// Gate keeping at most one unit of work active
    active: Mutex<()>,
}

impl AssociationStore {
    /// Creates a store over the given engine with default configuration
    /// and the tracing statement sink.
    pub fn new(engine: Arc<Database>) -> Self {
        Self {
            engine,
            relations: RelationRegistry::new(),
            config: ReplaceConfig::default(),
            sink: Arc::new(TracingSink),
            active: Mutex::new(()),
        }
    }

    /// Replaces the retry configuration.
    pub fn with_config(mut self, config: ReplaceConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the statement sink.
    pub fn with_statement_sink(mut self, sink: Arc<dyn StatementSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Registers a relation. Registration order is the processing order
    /// for multi-relation replace operations.
    ///
    /// # Arguments
    /// * `def` - The relation definition
    ///
    /// # Returns
    /// `Result<(), ReplaceError>` failing if the name is already taken.
    pub fn register_relation(&mut self, def: RelationDef) -> Result<(), ReplaceError> {
        self.relations.register(def)
    }

    /// Returns the engine this store operates on.
    pub fn engine(&self) -> &Arc<Database> {
        &self.engine
    }

    /// Begins a unit of work.
    ///
    /// # Returns
    /// `Result<UnitOfWork, ReplaceError>` failing with `AlreadyActive`
    /// if one is already open on this store.
    pub fn begin(&self) -> Result<UnitOfWork<'_>, ReplaceError> {
        let guard = self.active.try_lock().ok_or(ReplaceError::AlreadyActive)?;
        Ok(UnitOfWork::new(&self.engine, guard))
    }

    /// Atomically replaces the full membership of one relation.
    ///
    /// # Arguments
    /// * `owner` - Owner key whose membership is replaced
    /// * `relation` - Registered relation name
    /// * `desired` - Desired final set of target keys
    ///
    /// # Returns
    /// `Result<ReplaceSummary, ReplaceError>`; on failure the membership
    /// is unchanged.
    pub fn replace_associations(
        &self,
        owner: u64,
        relation: &str,
        desired: &[u64],
    ) -> Result<ReplaceSummary, ReplaceError> {
        self.replace_many(owner, &[(relation, desired)])
    }

    /// Atomically replaces the memberships of several relations in one
    /// unit of work.
    ///
    /// Relations are processed in registration order regardless of the
    /// order given here. The first failure rolls back every relation in
    /// the call; there is no per-relation partial success.
    ///
    /// # Arguments
    /// * `owner` - Owner key whose memberships are replaced
    /// * `relations` - Pairs of registered relation name and desired set
    ///
    /// # Returns
    /// `Result<ReplaceSummary, ReplaceError>` with one summary per
    /// relation in processing order.
    pub fn replace_many(
        &self,
        owner: u64,
        relations: &[(&str, &[u64])],
    ) -> Result<ReplaceSummary, ReplaceError> {
        // Resolve every relation before issuing any statement
        let mut resolved: Vec<(usize, &RelationDef, &[u64])> = Vec::with_capacity(relations.len());
        for &(name, desired) in relations {
            let (index, def) =
                self.relations
                    .resolve(name)
                    .ok_or_else(|| ReplaceError::RelationNotFound {
                        relation: name.to_string(),
                    })?;
            resolved.push((index, def, desired));
        }
        resolved.sort_by_key(|(index, ..)| *index);

        let mut uow = self.begin()?;
        let mut summaries = Vec::with_capacity(resolved.len());

        for (_, def, desired) in resolved {
            match executor::replace_all(&mut uow, def, owner, desired, self.sink.as_ref()) {
                Ok(summary) => summaries.push(summary),
                Err(error) => {
                    tracing::warn!(
                        "Replace for owner {} rolled back: {}",
                        owner,
                        error
                    );
                    uow.rollback();
                    return Err(error);
                }
            }
        }

        uow.commit().map_err(|error| {
            tracing::warn!("Replace commit for owner {} failed: {}", owner, error);
            error
        })?;

        tracing::info!(
            "Replaced {} relation(s) for owner {}",
            summaries.len(),
            owner
        );
        Ok(ReplaceSummary {
            relations: summaries,
        })
    }

    /// Replaces one relation's membership, retrying the whole operation
    /// when the failure is retryable.
    ///
    /// Safe because replace is a full-set operation: after a clean
    /// rollback, retrying with the same desired set converges on the
    /// same end state.
    ///
    /// # Arguments
    /// * `owner` - Owner key whose membership is replaced
    /// * `relation` - Registered relation name
    /// * `desired` - Desired final set of target keys
    ///
    /// # Returns
    /// `Result<ReplaceSummary, ReplaceError>` from the final attempt.
    pub fn replace_associations_with_retry(
        &self,
        owner: u64,
        relation: &str,
        desired: &[u64],
    ) -> Result<ReplaceSummary, ReplaceError> {
        let mut attempt = 0;
        loop {
            match self.replace_associations(owner, relation, desired) {
                Ok(summary) => return Ok(summary),
                Err(error) => {
                    attempt += 1;
                    if attempt > self.config.max_retries {
                        return Err(error);
                    }

                    // Only retry failures a fresh attempt can fix
                    if error.is_retryable() {
                        tracing::warn!(
                            "Retryable failure replacing '{}' for owner {} (attempt {}/{}): {}",
                            relation,
                            owner,
                            attempt,
                            self.config.max_retries,
                            error
                        );

                        if self.config.retry_delay_ms > 0 {
                            std::thread::sleep(Duration::from_millis(self.config.retry_delay_ms));
                        }

                        continue;
                    }

                    // Non-retryable error, return immediately
                    return Err(error);
                }
            }
        }
    }

    /// Reads the committed membership of one relation for an owner.
    ///
    /// Always loads a fresh committed snapshot, outside any transaction;
    /// target keys are returned in ascending order.
    ///
    /// # Arguments
    /// * `owner` - Owner key
    /// * `relation` - Registered relation name
    ///
    /// # Returns
    /// `Result<Vec<u64>, ReplaceError>` containing the target keys.
    pub fn membership(&self, owner: u64, relation: &str) -> Result<Vec<u64>, ReplaceError> {
        let def = self
            .relations
            .get(relation)
            .ok_or_else(|| ReplaceError::RelationNotFound {
                relation: relation.to_string(),
            })?;

        let table = self.engine.get_table(&def.join_table)?;
        let target_index = table.column_index(&def.target_column)?;
        let rows = table.scan_eq(&def.owner_column, &Value::U64(owner))?;

        let mut targets: Vec<u64> = rows
            .iter()
            .filter_map(|row| row.get(target_index).and_then(Value::as_u64))
            .collect();
        targets.sort_unstable();
        Ok(targets)
    }
}
