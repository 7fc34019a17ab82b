//! Migration runner
//!
//! Applies embedded migrations in order, each in its own transaction, and
//! refuses to start if an applied migration's SQL has changed since.

use crate::errors::{checksum_mismatch, from_rusqlite, migration_error, Result};
use crate::migrations::checksums::compute_checksum;
use crate::migrations::embedded::{get_migrations, MANAGED_TABLES};
use rusqlite::{Connection, OptionalExtension};

/// Apply all pending migrations to the database
pub fn apply_migrations(conn: &mut Connection) -> Result<()> {
    create_schema_version_table(conn)?;

    for migration in get_migrations() {
        apply_migration(conn, migration.id, migration.sql)?;
    }

    Ok(())
}

/// Drop every managed table and re-apply migrations from scratch
///
/// Used when the process runs against a disposable test database.
pub fn reset_schema(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction().map_err(from_rusqlite)?;
    for table in MANAGED_TABLES {
        tx.execute_batch(&format!("DROP TABLE IF EXISTS {};", table))
            .map_err(from_rusqlite)?;
    }
    tx.execute_batch("DROP TABLE IF EXISTS schema_version;")
        .map_err(from_rusqlite)?;
    tx.commit().map_err(from_rusqlite)?;

    tracing::info!(tables = MANAGED_TABLES.len(), "schema reset");
    apply_migrations(conn)
}

fn create_schema_version_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY,
            migration_id TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL,
            checksum TEXT
        )",
        [],
    )
    .map_err(from_rusqlite)?;

    Ok(())
}

/// Apply a single migration if not already applied
fn apply_migration(conn: &mut Connection, migration_id: &str, sql: &str) -> Result<()> {
    let checksum = compute_checksum(sql);

    let recorded: Option<Option<String>> = conn
        .query_row(
            "SELECT checksum FROM schema_version WHERE migration_id = ?",
            [migration_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(from_rusqlite)?;

    if let Some(recorded) = recorded {
        return match recorded {
            Some(expected) if expected != checksum => {
                Err(checksum_mismatch(migration_id, &expected, &checksum))
            }
            _ => Ok(()),
        };
    }

    let tx = conn.transaction().map_err(from_rusqlite)?;

    tx.execute_batch(sql)
        .map_err(|e| migration_error(migration_id, &e.to_string()))?;

    let now = chrono::Utc::now().timestamp();
    tx.execute(
        "INSERT INTO schema_version (migration_id, applied_at, checksum) VALUES (?, ?, ?)",
        rusqlite::params![migration_id, now, checksum],
    )
    .map_err(from_rusqlite)?;

    tx.commit().map_err(from_rusqlite)?;

    tracing::debug!(migration_id, "migration applied");
    Ok(())
}
