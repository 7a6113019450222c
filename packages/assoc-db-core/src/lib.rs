//! Embedded relational store for association-heavy workloads.
//!
//! Provides schema-first tables with enforced foreign-key and uniqueness
//! constraints, lock-free snapshot reads, and staged transactions with
//! atomic all-or-nothing commit.

pub mod database;
pub mod error;
pub mod table;
pub mod transaction;

pub use database::Database;
pub use error::EngineError;
