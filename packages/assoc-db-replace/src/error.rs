//! Association layer error types.

use std::fmt;

use assoc_db_core::EngineError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classify::FailureKind;

/// Phase of a replace operation in which a statement failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplacePhase {
    /// Clearing the owner's current membership
    Delete,
    /// Inserting the desired membership
    Insert,
}

impl fmt::Display for ReplacePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplacePhase::Delete => f.write_str("delete"),
            ReplacePhase::Insert => f.write_str("insert"),
        }
    }
}

/// Association layer operation errors.
#[derive(Error, Debug)]
pub enum ReplaceError {
    /// A unit of work is already open on this store
    #[error("A unit of work is already active on this store")]
    AlreadyActive,

    /// Relation name is not registered
    #[error("Relation '{relation}' not registered")]
    RelationNotFound { relation: String },

    /// Relation name registered twice
    #[error("Relation '{relation}' already registered")]
    RelationAlreadyRegistered { relation: String },

    /// A delete or insert statement failed; the operation was rolled back
    #[error("Replace of relation '{relation}' failed in {phase} phase ({kind}): {source}")]
    Statement {
        relation: String,
        phase: ReplacePhase,
        kind: FailureKind,
        #[source]
        source: EngineError,
    },

    /// Commit failed; durable state is equivalent to rollback
    #[error("Commit failed ({kind}): {source}")]
    Commit {
        kind: FailureKind,
        #[source]
        source: EngineError,
    },

    /// A read or setup statement failed outside a replace operation
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl ReplaceError {
    /// Classification of the underlying engine failure, if any.
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            ReplaceError::Statement { kind, .. } | ReplaceError::Commit { kind, .. } => Some(*kind),
            ReplaceError::Engine(source) => Some(crate::classify::classify(source)),
            _ => None,
        }
    }

    /// Returns whether retrying the whole operation from scratch can
    /// succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), Some(kind) if kind.is_retryable())
    }
}
