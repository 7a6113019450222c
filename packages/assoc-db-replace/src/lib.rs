//! Transactional replacement of many-to-many association memberships.
//!
//! Replacing a relation's membership is always a full-set operation:
//! delete every join row for the owner, insert the desired row set, all
//! inside one unit of work. Any failure in any phase rolls the whole
//! operation back, so durable state is either the pre-operation
//! membership or the fully-applied one, never a mixture.

pub mod classify;
pub mod config;
pub mod error;
pub mod executor;
pub mod relation;
pub mod statement;
pub mod store;
pub mod unit_of_work;

pub use classify::{classify, FailureKind};
pub use config::ReplaceConfig;
pub use error::{ReplaceError, ReplacePhase};
pub use executor::{RelationSummary, ReplaceSummary};
pub use relation::{RelationDef, RelationRegistry};
pub use statement::{RecordingSink, Statement, StatementSink, TracingSink};
pub use store::AssociationStore;
pub use unit_of_work::UnitOfWork;
