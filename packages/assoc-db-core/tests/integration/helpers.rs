//! Shared schema fixtures for the integration suite.

use assoc_db_core::table::{Column, ForeignKey, Schema, UniqueKey, Value};
use assoc_db_core::transaction::TransactionHandle;
use assoc_db_core::Database;

/// Creates a database with `users`, `tags`, and a `user_tags` join table
/// (restrict on both foreign keys, unique membership).
pub fn membership_db() -> Database {
    let db = Database::new();
    db.create_table("users".to_string(), Schema::new(vec![Column::str("name")]))
        .unwrap();
    db.create_table("tags".to_string(), Schema::new(vec![Column::str("label")]))
        .unwrap();
    db.create_table(
        "user_tags".to_string(),
        Schema::new(vec![Column::u64("user_id"), Column::u64("tag_id")])
            .with_foreign_key(ForeignKey::new("user_id", "users"))
            .with_foreign_key(ForeignKey::new("tag_id", "tags"))
            .with_unique_key(UniqueKey::new(["user_id", "tag_id"])),
    )
    .unwrap();
    db
}

/// Commits a user row and returns its id.
pub fn seed_user(db: &Database, name: &str) -> u64 {
    let mut tx = TransactionHandle::new();
    let id = db
        .insert(&mut tx, "users", vec![Value::from(name)])
        .unwrap();
    db.commit_transaction(&mut tx).unwrap();
    id
}

/// Commits a tag row and returns its id.
pub fn seed_tag(db: &Database, label: &str) -> u64 {
    let mut tx = TransactionHandle::new();
    let id = db
        .insert(&mut tx, "tags", vec![Value::from(label)])
        .unwrap();
    db.commit_transaction(&mut tx).unwrap();
    id
}

/// Commits a membership row linking a user and a tag.
pub fn seed_membership(db: &Database, user: u64, tag: u64) -> u64 {
    let mut tx = TransactionHandle::new();
    let id = db
        .insert(&mut tx, "user_tags", vec![Value::U64(user), Value::U64(tag)])
        .unwrap();
    db.commit_transaction(&mut tx).unwrap();
    id
}
