//! hbnb Engine - the console that drives a storage backend
//!
//! Provides:
//! - `Console`: executes parsed commands against an injected `Storage`
//! - `run_session`: the read-line loop over any reader and writer

pub mod commands;
pub mod session;

pub use commands::console::{Console, Control};
pub use session::run_session;
