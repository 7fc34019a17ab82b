//! Error handling for hbnb-store
//!
//! Wraps hbnb-core ExError with store-specific helpers

use hbnb_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::ConstraintViolation)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Create a database error from rusqlite::Error
///
/// Constraint failures (NOT NULL, FOREIGN KEY) get their own kind so the
/// console can tell bad input from a broken database.
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    let kind = match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            ExErrorKind::ConstraintViolation
        }
        _ => ExErrorKind::Persistence,
    };
    ExError::new(kind)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create a serialization error for a persisted artifact
pub fn serialization_error(operation: &str, err: impl std::fmt::Display) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}
