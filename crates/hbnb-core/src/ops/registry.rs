use std::collections::BTreeMap;

use crate::errors::{HbnbError, Result};
use crate::model::{Entity, EntityKind};

/// In-memory registry of live entities
///
/// Maps composite keys (`"<Type>.<id>"`) to entities. Iteration follows key
/// order, so `all` output is deterministic. Single-threaded by design: the
/// owning storage backend is the only writer.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entities: BTreeMap<String, Entity>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            entities: BTreeMap::new(),
        }
    }

    /// Every entity, or only those of `kind`, in key order
    pub fn all(&self, kind: Option<EntityKind>) -> Vec<&Entity> {
        self.entities
            .values()
            .filter(|e| kind.map_or(true, |k| e.kind == k))
            .collect()
    }

    pub fn count(&self, kind: Option<EntityKind>) -> usize {
        self.entities
            .values()
            .filter(|e| kind.map_or(true, |k| e.kind == k))
            .count()
    }

    pub fn get(&self, key: &str) -> Option<&Entity> {
        self.entities.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Entity> {
        self.entities.get_mut(key)
    }

    /// Look up an entity that must exist
    ///
    /// # Errors
    ///
    /// Returns `InstanceNotFound` if the key is not registered.
    pub fn require(&self, key: &str) -> Result<&Entity> {
        self.entities
            .get(key)
            .ok_or_else(|| HbnbError::InstanceNotFound {
                key: key.to_string(),
            })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entities.contains_key(key)
    }

    /// Insert or replace an entity under its composite key
    pub fn insert(&mut self, entity: Entity) {
        self.entities.insert(entity.key(), entity);
    }

    pub fn remove(&mut self, key: &str) -> Option<Entity> {
        self.entities.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entities.keys()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }
}
