//! JSON file backend
//!
//! The whole registry is one JSON object mapping `"<Type>.<id>"` to the
//! entity's serialized map (including `__class__`). Every save rewrites the
//! file atomically; a missing file loads as an empty registry.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use hbnb_core::ops::relations::{cascade_keys, detach_amenity};
use hbnb_core::storage::{Backend, Storage, StorageResult};
use hbnb_core::{log_op_end, log_op_error, log_op_start};
use hbnb_core::{Entity, EntityKind, ExError, Registry};
use serde_json::{Map, Value};

use crate::atomic::atomic_write;
use crate::errors::{io_error, serialization_error, Result};

/// Registry persisted as a single JSON document
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    registry: Registry,
}

impl FileStorage {
    /// Bind to a file path without touching the filesystem
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            registry: Registry::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_document(&self) -> Result<usize> {
        let document: Map<String, Value> = self
            .registry
            .all(None)
            .into_iter()
            .map(|e| (e.key(), Value::Object(e.to_map())))
            .collect();

        let bytes = serde_json::to_vec_pretty(&Value::Object(document))
            .map_err(|e| serialization_error("file_save", e))?;
        atomic_write(&self.path, &bytes)?;

        Ok(self.registry.len())
    }

    fn read_document(&self) -> Result<Registry> {
        let mut registry = Registry::new();

        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(registry),
            Err(e) => return Err(io_error("file_reload", e)),
        };

        let document: Map<String, Value> =
            serde_json::from_slice(&bytes).map_err(|e| serialization_error("file_reload", e))?;

        for (key, value) in document {
            let Value::Object(map) = value else {
                tracing::warn!(entity_key = %key, "skipping non-object entry");
                continue;
            };

            let class_name = map
                .get("__class__")
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| key.split_once('.').map(|(class, _)| class.to_string()))
                .unwrap_or_default();

            let kind = match class_name.parse::<EntityKind>() {
                Ok(kind) => kind,
                Err(_) => {
                    tracing::warn!(entity_key = %key, class_name = %class_name, "skipping unknown class");
                    continue;
                }
            };

            let entity = Entity::from_map(kind, map)
                .map_err(|e| ExError::from(e).with_op("file_reload"))?;
            registry.insert(entity);
        }

        Ok(registry)
    }
}

impl Storage for FileStorage {
    fn backend(&self) -> Backend {
        Backend::File
    }

    fn catalog(&self) -> &[EntityKind] {
        &EntityKind::ALL
    }

    fn all(&self, kind: Option<EntityKind>) -> Vec<&Entity> {
        self.registry.all(kind)
    }

    fn get(&self, key: &str) -> Option<&Entity> {
        self.registry.get(key)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut Entity> {
        self.registry.get_mut(key)
    }

    fn register(&mut self, entity: Entity) {
        self.registry.insert(entity);
    }

    fn delete(&mut self, key: &str) -> Vec<Entity> {
        if !self.registry.contains(key) {
            return Vec::new();
        }
        let dependents = cascade_keys(&self.registry, key);

        let removed: Vec<Entity> = std::iter::once(key.to_string())
            .chain(dependents)
            .filter_map(|k| self.registry.remove(&k))
            .collect();
        for entity in removed.iter().filter(|e| e.kind == EntityKind::Amenity) {
            detach_amenity(&mut self.registry, &entity.id);
        }
        removed
    }

    fn save(&mut self) -> StorageResult<()> {
        log_op_start!("file_save", path = %self.path.display());
        let start = std::time::Instant::now();

        let written = self.write_document().map_err(|e| {
            log_op_error!(
                "file_save",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "file_save",
            duration_ms = start.elapsed().as_millis() as u64,
            entity_count = written
        );
        Ok(())
    }

    fn reload(&mut self) -> StorageResult<()> {
        log_op_start!("file_reload", path = %self.path.display());
        let start = std::time::Instant::now();

        let registry = self.read_document().map_err(|e| {
            log_op_error!(
                "file_reload",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;
        self.registry = registry;

        log_op_end!(
            "file_reload",
            duration_ms = start.elapsed().as_millis() as u64,
            entity_count = self.registry.len()
        );
        Ok(())
    }
}
