//! Relation definitions binding names to join tables.

use serde::{Deserialize, Serialize};

use crate::error::ReplaceError;

/// Binds a relation name to its join table and the owner/target tables
/// it links.
///
/// The join table is expected to carry foreign keys from `owner_column`
/// and `target_column` to the owner and target tables, and a uniqueness
/// constraint over the pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDef {
    /// Relation name used by callers
    pub name: String,
    /// Table holding the owning entities
    pub owner_table: String,
    /// Table holding the relation targets
    pub target_table: String,
    /// Join table holding one row per membership
    pub join_table: String,
    /// Join table column referencing the owner
    pub owner_column: String,
    /// Join table column referencing the target
    pub target_column: String,
}

impl RelationDef {
    /// Creates a relation definition.
    pub fn new(
        name: impl Into<String>,
        owner_table: impl Into<String>,
        target_table: impl Into<String>,
        join_table: impl Into<String>,
        owner_column: impl Into<String>,
        target_column: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            owner_table: owner_table.into(),
            target_table: target_table.into(),
            join_table: join_table.into(),
            owner_column: owner_column.into(),
            target_column: target_column.into(),
        }
    }
}

/// Ordered registry of relation definitions.
///
/// Registration order is the processing order for multi-relation replace
/// operations.
#[derive(Debug, Default)]
pub struct RelationRegistry {
    relations: Vec<RelationDef>,
}

impl RelationRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a relation definition.
    ///
    /// # Arguments
    /// * `def` - The relation definition
    ///
    /// # Returns
    /// `Result<(), ReplaceError>` failing if the name is already taken.
    pub fn register(&mut self, def: RelationDef) -> Result<(), ReplaceError> {
        if self.relations.iter().any(|r| r.name == def.name) {
            return Err(ReplaceError::RelationAlreadyRegistered { relation: def.name });
        }
        self.relations.push(def);
        Ok(())
    }

    /// Looks up a relation with its registration index.
    pub fn resolve(&self, name: &str) -> Option<(usize, &RelationDef)> {
        self.relations
            .iter()
            .enumerate()
            .find(|(_, r)| r.name == name)
    }

    /// Looks up a relation by name.
    pub fn get(&self, name: &str) -> Option<&RelationDef> {
        self.resolve(name).map(|(_, def)| def)
    }

    /// Iterates relations in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &RelationDef> {
        self.relations.iter()
    }

    /// Returns the number of registered relations.
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    /// Returns whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}
