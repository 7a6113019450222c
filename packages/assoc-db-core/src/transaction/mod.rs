//! Transaction isolation, staged working copies, and atomic commit.

mod change;
mod staging;
#[allow(clippy::module_inception)]
mod transaction;
mod transaction_handle;

pub use change::Change;
pub use staging::StagingTable;
pub use transaction::Transaction;
pub use transaction_handle::TransactionHandle;
