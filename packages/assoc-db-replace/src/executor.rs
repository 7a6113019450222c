//! Delete-then-insert replacement of a relation's membership.

use assoc_db_core::table::Value;
use assoc_db_core::EngineError;
use serde::{Deserialize, Serialize};

use crate::classify::classify;
use crate::error::{ReplaceError, ReplacePhase};
use crate::relation::RelationDef;
use crate::statement::{Statement, StatementSink};
use crate::unit_of_work::UnitOfWork;

/// Outcome of replacing one relation's membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationSummary {
    /// Relation that was replaced
    pub relation: String,
    /// Join rows removed in the delete phase
    pub deleted: usize,
    /// Join rows created in the insert phase
    pub inserted: usize,
}

/// Outcome of a committed replace operation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReplaceSummary {
    /// Per-relation outcomes in processing order
    pub relations: Vec<RelationSummary>,
}

/// Replaces the full membership of one relation inside the caller's
/// unit of work.
///
/// Two deterministic phases: delete every join row for the owner (zero
/// affected rows is success), then insert the desired keys in ascending
/// order. Every statement is reported to the sink before it is issued.
/// On any statement failure the executor returns immediately; committing
/// or rolling back the unit of work is the caller's responsibility.
///
/// # Arguments
/// * `uow` - Unit of work the statements are staged in
/// * `relation` - Relation to replace
/// * `owner` - Owner key whose membership is replaced
/// * `desired` - Desired final set of target keys
/// * `sink` - Sink receiving each issued statement
///
/// # Returns
/// `Result<RelationSummary, ReplaceError>` with counts per phase.
pub fn replace_all(
    uow: &mut UnitOfWork<'_>,
    relation: &RelationDef,
    owner: u64,
    desired: &[u64],
    sink: &dyn StatementSink,
) -> Result<RelationSummary, ReplaceError> {
    let statement_error = |phase: ReplacePhase, source: EngineError| ReplaceError::Statement {
        relation: relation.name.clone(),
        phase,
        kind: classify(&source),
        source,
    };

    let db = uow.db;

    // Replacing membership of a missing owner must fail, not silently
    // delete nothing
    let owner_exists = db
        .transaction_contains(&uow.handle, &relation.owner_table, owner)
        .map_err(|source| statement_error(ReplacePhase::Delete, source))?;
    if !owner_exists {
        return Err(statement_error(
            ReplacePhase::Delete,
            EngineError::ForeignKeyViolation {
                table: relation.join_table.clone(),
                column: relation.owner_column.clone(),
                value: owner,
                ref_table: relation.owner_table.clone(),
            },
        ));
    }

    // Delete phase: clear the owner's current membership
    sink.record(Statement::DeleteByOwner {
        join_table: relation.join_table.clone(),
        owner,
    });
    let deleted = db
        .delete_where(
            &mut uow.handle,
            &relation.join_table,
            &relation.owner_column,
            &Value::U64(owner),
        )
        .map_err(|source| statement_error(ReplacePhase::Delete, source))?;

    // Insert phase: ascending key order keeps the statement log stable
    let mut targets: Vec<u64> = desired.to_vec();
    targets.sort_unstable();

    let mut inserted = 0;
    for target in targets {
        sink.record(Statement::InsertJoinRow {
            join_table: relation.join_table.clone(),
            owner,
            target,
        });
        db.insert(
            &mut uow.handle,
            &relation.join_table,
            vec![Value::U64(owner), Value::U64(target)],
        )
        .map_err(|source| statement_error(ReplacePhase::Insert, source))?;
        inserted += 1;
    }

    tracing::debug!(
        "Replaced relation '{}' for owner {}: {} deleted, {} inserted",
        relation.name,
        owner,
        deleted,
        inserted
    );

    Ok(RelationSummary {
        relation: relation.name.clone(),
        deleted,
        inserted,
    })
}
