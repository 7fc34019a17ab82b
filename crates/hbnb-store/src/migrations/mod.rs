//! Migration framework
//!
//! Provides:
//! - Migration runner with checksum verification
//! - Idempotent application
//! - Embedded SQL migrations
//! - Schema reset for disposable test databases

mod checksums;
mod embedded;
mod runner;

pub use runner::{apply_migrations, reset_schema};
