//! Foreign-key and uniqueness constraints.

use serde::{Deserialize, Serialize};

/// What happens to referencing rows when a referenced row is deleted.
///
/// The action is a declared schema choice; there is no implicit cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReferentialAction {
    /// Refuse the delete while referencing rows exist
    #[default]
    Restrict,
    /// Delete referencing rows in the same transaction
    Cascade,
}

/// Foreign key from a column of this table to the `id` of another table.
///
/// The declaring column must be `u64` typed; every committed value must
/// match the id of an existing row in the referenced table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Column in the declaring table
    pub column: String,
    /// Name of the referenced table
    pub ref_table: String,
    /// Delete behavior for the referenced row
    pub on_delete: ReferentialAction,
}

impl ForeignKey {
    /// Creates a foreign key with `Restrict` delete behavior.
    pub fn new(column: impl Into<String>, ref_table: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ref_table: ref_table.into(),
            on_delete: ReferentialAction::Restrict,
        }
    }

    /// Creates a foreign key with `Cascade` delete behavior.
    pub fn cascade(column: impl Into<String>, ref_table: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ref_table: ref_table.into(),
            on_delete: ReferentialAction::Cascade,
        }
    }
}

/// Uniqueness constraint over one or more columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniqueKey {
    /// Columns whose combined values must be unique within the table
    pub columns: Vec<String>,
}

impl UniqueKey {
    /// Creates a uniqueness constraint over the given columns.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}
