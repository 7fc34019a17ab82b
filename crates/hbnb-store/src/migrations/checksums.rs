//! Migration checksums
//!
//! SHA-256 over the migration SQL with line endings normalised, so a CRLF
//! checkout produces the same digest as the recorded one.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of migration SQL
pub fn compute_checksum(sql: &str) -> String {
    let normalised = sql.replace("\r\n", "\n");
    hex::encode(Sha256::digest(normalised.as_bytes()))
}
