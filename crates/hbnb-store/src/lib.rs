//! hbnb Store - the two persistence backends behind `Storage`
//!
//! Provides:
//! - `FileStorage`: whole registry as one JSON document, atomically rewritten
//! - `SqliteStorage`: one table per entity kind plus the place/amenity link table
//! - SQLite schema with a checksummed migrations framework
//! - `open_storage`, the factory that turns configuration into a backend

pub mod atomic;
pub mod db;
pub mod errors;
pub mod factory;
pub mod file_store;
pub mod migrations;
pub mod sqlite_store;

// Re-export key types
pub use errors::Result;
pub use factory::{open_storage, StorageConfig};
pub use file_store::FileStorage;
pub use sqlite_store::SqliteStorage;
