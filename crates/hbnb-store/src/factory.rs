//! Backend selection
//!
//! Exactly one backend is active per process; it is chosen here from
//! configuration and loaded before the console sees it.

use std::path::PathBuf;

use hbnb_core::storage::{Backend, Storage};

use crate::errors::Result;
use crate::file_store::FileStorage;
use crate::sqlite_store::SqliteStorage;

/// Where and how to persist
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: Backend,
    /// JSON document used by the file backend
    pub file_path: PathBuf,
    /// Database file used by the db backend
    pub db_path: PathBuf,
    /// Drop and recreate the db schema on open (test environments)
    pub reset: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: Backend::File,
            file_path: PathBuf::from("file.json"),
            db_path: PathBuf::from("hbnb.db"),
            reset: false,
        }
    }
}

/// Open the configured backend and load its durable state
///
/// # Errors
///
/// Returns an `ExError` if the database cannot be opened or migrated, or the
/// persisted state cannot be read.
pub fn open_storage(config: &StorageConfig) -> Result<Box<dyn Storage>> {
    let mut storage: Box<dyn Storage> = match config.backend {
        Backend::File => Box::new(FileStorage::new(&config.file_path)),
        Backend::Db => Box::new(SqliteStorage::open(&config.db_path, config.reset)?),
    };
    storage.reload()?;

    tracing::info!(
        backend = %config.backend,
        entity_count = storage.count(None),
        "storage ready"
    );
    Ok(storage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir, backend: Backend) -> StorageConfig {
        StorageConfig {
            backend,
            file_path: dir.path().join("file.json"),
            db_path: dir.path().join("hbnb.db"),
            reset: false,
        }
    }

    #[test]
    fn test_default_config() {
        let config = StorageConfig::default();
        assert_eq!(config.backend, Backend::File);
        assert_eq!(config.file_path, PathBuf::from("file.json"));
    }

    #[test]
    fn test_open_file_backend() {
        let dir = TempDir::new().unwrap();
        let storage = open_storage(&config_in(&dir, Backend::File)).unwrap();
        assert_eq!(storage.backend(), Backend::File);
        assert_eq!(storage.count(None), 0);
    }

    #[test]
    fn test_open_db_backend_creates_database() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir, Backend::Db);

        let storage = open_storage(&config).unwrap();

        assert_eq!(storage.backend(), Backend::Db);
        assert!(config.db_path.exists());
    }
}
