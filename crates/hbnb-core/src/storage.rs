//! Storage contract shared by both backends
//!
//! The console only ever talks to `dyn Storage`; which backend sits behind it
//! is decided once at startup by the store crate's factory.

use std::fmt;
use std::str::FromStr;

use crate::errors::ExError;
use crate::model::{Entity, EntityKind};

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, ExError>;

/// Which persistence implementation is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// Whole registry serialized to one JSON file
    #[default]
    File,
    /// One table per entity kind in SQLite
    Db,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::File => "file",
            Backend::Db => "db",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(Backend::File),
            "db" => Ok(Backend::Db),
            other => Err(format!("unknown storage backend: {}", other)),
        }
    }
}

/// Uniform contract over the live-entity registry and its persistence
///
/// Mutations (`register`, `get_mut`, `delete`) only touch the registry; they
/// become durable on the next `save`.
pub trait Storage {
    fn backend(&self) -> Backend;

    /// Entity kinds this backend can hold
    fn catalog(&self) -> &[EntityKind];

    /// Every registered entity, or only those of `kind`, in key order
    fn all(&self, kind: Option<EntityKind>) -> Vec<&Entity>;

    fn get(&self, key: &str) -> Option<&Entity>;

    /// Mutable access; the entity is written on the next `save`
    fn get_mut(&mut self, key: &str) -> Option<&mut Entity>;

    /// Add a freshly constructed entity to the registry (no persistence yet)
    fn register(&mut self, entity: Entity);

    /// Remove an entity and its cascade dependents from the registry
    ///
    /// Returns the removed entities, the requested one first; empty if the
    /// key is unknown.
    fn delete(&mut self, key: &str) -> Vec<Entity>;

    /// Durably persist the current registry state
    ///
    /// # Errors
    ///
    /// Returns an `ExError` if the backend cannot write.
    fn save(&mut self) -> StorageResult<()>;

    /// Replace the registry with the durable state; no prior state is empty
    ///
    /// # Errors
    ///
    /// Returns an `ExError` if durable state exists but cannot be read.
    fn reload(&mut self) -> StorageResult<()>;

    /// Release the backend, flushing pending work
    ///
    /// # Errors
    ///
    /// Returns an `ExError` if the final flush fails.
    fn close(&mut self) -> StorageResult<()> {
        Ok(())
    }

    fn count(&self, kind: Option<EntityKind>) -> usize {
        self.all(kind).len()
    }

    /// Resolve a type name against this backend's catalog
    fn kind_named(&self, name: &str) -> Option<EntityKind> {
        self.catalog().iter().copied().find(|k| k.name() == name)
    }
}
