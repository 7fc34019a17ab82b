//! hbnb Core - entity model, registry and console language
//!
//! This crate provides:
//! - The entity model (seven kinds, schema, attribute bag, rendering)
//! - The in-memory registry and relationship traversal
//! - The `Storage` contract both backends implement
//! - The console command parser, value coercion and dictionary literals
//! - Error and structured logging facilities

pub mod commands;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod ops;
pub mod parse;
pub mod render;
pub mod storage;

pub use hbnb_core_types as core_types;

// Re-export commonly used types
pub use commands::{parse_line, Command, UpdatePayload};
pub use errors::{ExError, ExErrorKind, HbnbError, Result};
pub use model::{entity_key, Attributes, Entity, EntityKind};
pub use ops::Registry;
pub use storage::{Backend, Storage, StorageResult};
