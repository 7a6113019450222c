//! Statement descriptions and the injected statement sink.
//!
//! Statement reporting is an injected capability, not global logging
//! state: the store is built with a sink, and the executor reports every
//! statement it issues to that sink before executing it.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// One storage statement issued by the replace executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Statement {
    /// Bulk delete of a relation's join rows for one owner
    DeleteByOwner {
        /// Join table the delete targets
        join_table: String,
        /// Owner key the predicate matches
        owner: u64,
    },
    /// Insert of a single join row
    InsertJoinRow {
        /// Join table the insert targets
        join_table: String,
        /// Owner key of the new row
        owner: u64,
        /// Target key of the new row
        target: u64,
    },
}

/// Injected sink receiving every statement the executor issues.
pub trait StatementSink: Send + Sync {
    /// Records one issued statement.
    fn record(&self, statement: Statement);
}

/// Default sink forwarding statements to `tracing` at debug level.
#[derive(Debug, Default)]
pub struct TracingSink;

impl StatementSink for TracingSink {
    fn record(&self, statement: Statement) {
        match statement {
            Statement::DeleteByOwner { join_table, owner } => {
                tracing::debug!("Deleting all '{}' rows for owner {}", join_table, owner);
            }
            Statement::InsertJoinRow {
                join_table,
                owner,
                target,
            } => {
                tracing::debug!(
                    "Inserting '{}' row (owner {}, target {})",
                    join_table,
                    owner,
                    target
                );
            }
        }
    }
}

/// Sink collecting statements in memory for later inspection.
#[derive(Debug, Default)]
pub struct RecordingSink {
    statements: Mutex<Vec<Statement>>,
}

impl RecordingSink {
    /// Creates an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the statements recorded so far.
    pub fn statements(&self) -> Vec<Statement> {
        self.statements.lock().clone()
    }
}

impl StatementSink for RecordingSink {
    fn record(&self, statement: Statement) {
        self.statements.lock().push(statement);
    }
}
