//! Classification of storage engine errors into broad failure categories.

use std::fmt;

use assoc_db_core::EngineError;
use serde::{Deserialize, Serialize};

/// Broad failure category of a storage engine error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// A foreign key referenced a missing row, or a delete was restricted
    ReferentialIntegrity,
    /// A uniqueness constraint was violated
    Uniqueness,
    /// The engine timed out or lost a commit race
    Timeout,
    /// The engine session is unusable (poisoned lock)
    ConnectionLost,
    /// Anything the classifier cannot categorize
    Unknown,
}

impl FailureKind {
    /// Returns whether retrying the whole operation from scratch can
    /// succeed.
    ///
    /// Replace is a full-set operation, so retrying with the same desired
    /// set after a clean rollback is safe.
    pub fn is_retryable(self) -> bool {
        matches!(self, FailureKind::Timeout | FailureKind::ConnectionLost)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::ReferentialIntegrity => "referential-integrity violation",
            FailureKind::Uniqueness => "uniqueness violation",
            FailureKind::Timeout => "timeout",
            FailureKind::ConnectionLost => "connection lost",
            FailureKind::Unknown => "unknown failure",
        };
        f.write_str(name)
    }
}

/// Classifies a storage engine error into a broad failure category.
///
/// Pure and deterministic given the same error payload. Used for
/// diagnostics and retry decisions only; rollback happens on any failure
/// regardless of the classification.
pub fn classify(error: &EngineError) -> FailureKind {
    match error {
        EngineError::ForeignKeyViolation { .. } | EngineError::RestrictedDelete { .. } => {
            FailureKind::ReferentialIntegrity
        }
        EngineError::UniqueViolation { .. } => FailureKind::Uniqueness,
        // A lost commit race is retried the same way a timeout is
        EngineError::Timeout | EngineError::TransactionConflict(_) => FailureKind::Timeout,
        EngineError::LockPoisoned => FailureKind::ConnectionLost,
        _ => FailureKind::Unknown,
    }
}
