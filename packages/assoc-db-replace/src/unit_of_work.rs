//! Scoped unit of work over one engine transaction.

use assoc_db_core::transaction::TransactionHandle;
use assoc_db_core::Database;
use parking_lot::MutexGuard;

use crate::classify::classify;
use crate::error::ReplaceError;

/// One engine transaction driven to commit or rollback.
///
/// Holds the store's active-transaction gate for its lifetime, so at
/// most one unit of work is open per store. Dropping without commit
/// rolls back: the underlying transaction handle aborts on drop.
pub struct UnitOfWork<'a> {
    /// Engine the transaction runs against
    pub(crate) db: &'a Database,
    /// The wrapped engine transaction
    pub(crate) handle: TransactionHandle,
    /// Gate keeping this the only active unit of work on the store
    _active: MutexGuard<'a, ()>,
}

impl<'a> UnitOfWork<'a> {
    pub(crate) fn new(db: &'a Database, active: MutexGuard<'a, ()>) -> Self {
        Self {
            db,
            handle: TransactionHandle::new(),
            _active: active,
        }
    }

    /// Returns the engine this unit of work runs against.
    pub fn database(&self) -> &'a Database {
        self.db
    }

    /// Gets a mutable reference to the wrapped transaction handle,
    /// for composing statements beyond the replace executor.
    pub fn handle_mut(&mut self) -> &mut TransactionHandle {
        &mut self.handle
    }

    /// Commits the unit of work.
    ///
    /// On failure nothing was applied; durable state is equivalent to
    /// rollback.
    ///
    /// # Returns
    /// `Result<(), ReplaceError>` indicating success or failure.
    pub fn commit(mut self) -> Result<(), ReplaceError> {
        self.db
            .commit_transaction(&mut self.handle)
            .map_err(|source| ReplaceError::Commit {
                kind: classify(&source),
                source,
            })
    }

    /// Rolls back the unit of work, discarding all staged statements.
    pub fn rollback(self) {
        self.handle.abort();
    }

    /// Returns whether the wrapped transaction is still active.
    pub fn is_active(&self) -> bool {
        self.handle.is_active()
    }
}
