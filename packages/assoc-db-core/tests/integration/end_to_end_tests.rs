//! End-to-end engine tests over the public `Database` API.

use assoc_db_core::error::EngineError;
use assoc_db_core::table::{Column, ForeignKey, Schema, Value};
use assoc_db_core::transaction::TransactionHandle;
use assoc_db_core::Database;
use ntest::timeout;

use super::helpers::{membership_db, seed_membership, seed_tag, seed_user};

#[timeout(5000)]
#[test]
fn test_schema_requires_referenced_tables() {
    let db = Database::new();
    let result = db.create_table(
        "user_tags".to_string(),
        Schema::new(vec![Column::u64("user_id")])
            .with_foreign_key(ForeignKey::new("user_id", "users")),
    );

    assert!(matches!(result, Err(EngineError::TableNotFound { .. })));
}

#[timeout(5000)]
#[test]
fn test_create_table_twice_fails() {
    let db = Database::new();
    db.create_table("users".to_string(), Schema::new(vec![Column::str("name")]))
        .unwrap();
    let result = db.create_table("users".to_string(), Schema::new(vec![Column::str("name")]));

    assert!(matches!(result, Err(EngineError::TableAlreadyExists(_))));
}

#[timeout(5000)]
#[test]
fn test_insert_commit_read_back() -> anyhow::Result<()> {
    let db = membership_db();
    let user = seed_user(&db, "u1");
    let tag = seed_tag(&db, "a");
    seed_membership(&db, user, tag);

    let table = db.get_table("user_tags")?;
    let rows = table.scan_eq("user_id", &Value::U64(user))?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get(1), Some(&Value::U64(tag)));

    assert!(db.get_table("tags")?.contains_id(tag));
    assert!(!db.get_table("tags")?.contains_id(999));
    Ok(())
}

#[timeout(5000)]
#[test]
fn test_table_registry_management() {
    let db = membership_db();
    assert_eq!(db.table_count().unwrap(), 3);

    let mut names = db.table_names().unwrap();
    names.sort();
    assert_eq!(names, vec!["tags", "user_tags", "users"]);

    db.delete_table("user_tags").unwrap();
    assert_eq!(db.table_count().unwrap(), 2);
    assert!(matches!(
        db.delete_table("user_tags"),
        Err(EngineError::TableNotFound { .. })
    ));
}

#[timeout(5000)]
#[test]
fn test_transaction_view_reads_staged_rows() {
    let db = membership_db();
    let user = seed_user(&db, "u1");
    let tag = seed_tag(&db, "a");

    let mut tx = TransactionHandle::new();
    db.insert(&mut tx, "user_tags", vec![Value::U64(user), Value::U64(tag)])
        .unwrap();

    // The transaction sees its own staged row; the probe sees seeded parents
    let rows = db.transaction_rows(&tx, "user_tags").unwrap();
    assert_eq!(rows.len(), 1);
    assert!(db.transaction_contains(&tx, "users", user).unwrap());
    assert!(!db.transaction_contains(&tx, "users", 999).unwrap());
}

#[timeout(5000)]
#[test]
fn test_foreign_key_enforced_across_commits() {
    let db = membership_db();
    let user = seed_user(&db, "u1");

    let mut tx = TransactionHandle::new();
    let result = db.insert(&mut tx, "user_tags", vec![Value::U64(user), Value::U64(999)]);

    assert!(matches!(result, Err(EngineError::ForeignKeyViolation { .. })));
}

#[timeout(5000)]
#[test]
fn test_restrict_blocks_referenced_tag_delete() {
    let db = membership_db();
    let user = seed_user(&db, "u1");
    let tag = seed_tag(&db, "a");
    seed_membership(&db, user, tag);

    let mut tx = TransactionHandle::new();
    let result = db.delete_row(&mut tx, "tags", tag);
    assert!(matches!(result, Err(EngineError::RestrictedDelete { .. })));
    drop(tx);

    // The tag and its membership survive
    assert_eq!(db.get_table("tags").unwrap().row_count(), 1);
    assert_eq!(db.get_table("user_tags").unwrap().row_count(), 1);
}

#[timeout(5000)]
#[test]
fn test_snapshot_isolation_until_commit() {
    let db = membership_db();
    let user = seed_user(&db, "u1");
    let tag = seed_tag(&db, "a");

    let mut tx = TransactionHandle::new();
    db.insert(&mut tx, "user_tags", vec![Value::U64(user), Value::U64(tag)])
        .unwrap();

    // A concurrent reader sees the committed state only
    assert_eq!(db.get_table("user_tags").unwrap().row_count(), 0);

    db.commit_transaction(&mut tx).unwrap();
    assert_eq!(db.get_table("user_tags").unwrap().row_count(), 1);
}

#[timeout(5000)]
#[test]
fn test_uncommitted_transaction_rolls_back_on_drop() {
    let db = membership_db();
    let user = seed_user(&db, "u1");
    let tag = seed_tag(&db, "a");

    {
        let mut tx = TransactionHandle::new();
        db.insert(&mut tx, "user_tags", vec![Value::U64(user), Value::U64(tag)])
            .unwrap();
    } // dropped without commit

    assert_eq!(db.get_table("user_tags").unwrap().row_count(), 0);
}

#[timeout(5000)]
#[test]
fn test_concurrent_commit_conflict() {
    let db = membership_db();
    let user = seed_user(&db, "u1");
    let tag_a = seed_tag(&db, "a");
    let tag_b = seed_tag(&db, "b");

    let mut tx1 = TransactionHandle::new();
    db.insert(&mut tx1, "user_tags", vec![Value::U64(user), Value::U64(tag_a)])
        .unwrap();

    let mut tx2 = TransactionHandle::new();
    db.insert(&mut tx2, "user_tags", vec![Value::U64(user), Value::U64(tag_b)])
        .unwrap();

    db.commit_transaction(&mut tx1).unwrap();
    let result = db.commit_transaction(&mut tx2);

    assert!(matches!(result, Err(EngineError::TransactionConflict(_))));
    assert_eq!(db.get_table("user_tags").unwrap().row_count(), 1);
}

#[timeout(5000)]
#[test]
fn test_multi_table_commit_is_atomic() {
    let db = membership_db();

    let mut tx = TransactionHandle::new();
    let user = db.insert(&mut tx, "users", vec![Value::from("u1")]).unwrap();
    let tag = db.insert(&mut tx, "tags", vec![Value::from("a")]).unwrap();
    db.insert(&mut tx, "user_tags", vec![Value::U64(user), Value::U64(tag)])
        .unwrap();
    db.commit_transaction(&mut tx).unwrap();

    assert_eq!(db.get_table("users").unwrap().row_count(), 1);
    assert_eq!(db.get_table("tags").unwrap().row_count(), 1);
    assert_eq!(db.get_table("user_tags").unwrap().row_count(), 1);
}

#[timeout(5000)]
#[test]
fn test_bulk_delete_then_reinsert_in_one_transaction() {
    let db = membership_db();
    let user = seed_user(&db, "u1");
    let tag_a = seed_tag(&db, "a");
    let tag_b = seed_tag(&db, "b");
    let tag_c = seed_tag(&db, "c");
    seed_membership(&db, user, tag_a);
    seed_membership(&db, user, tag_b);

    // Replace the full membership in one transaction
    let mut tx = TransactionHandle::new();
    let affected = db
        .delete_where(&mut tx, "user_tags", "user_id", &Value::U64(user))
        .unwrap();
    assert_eq!(affected, 2);
    db.insert(&mut tx, "user_tags", vec![Value::U64(user), Value::U64(tag_c)])
        .unwrap();
    db.commit_transaction(&mut tx).unwrap();

    let rows = db
        .get_table("user_tags")
        .unwrap()
        .scan_eq("user_id", &Value::U64(user))
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get(1), Some(&Value::U64(tag_c)));
}
