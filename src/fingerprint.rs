//! Content fingerprints for audit correlation.
//!
//! Compilation is deterministic, so equal inputs give equal fingerprints and
//! callers can key caches and audit logs on them.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// SHA-256 of a serializable value's JSON form, as 64 lowercase hex chars.
///
/// # Errors
/// Returns an error if the value cannot be serialized to JSON.
pub fn compute_hash<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(value)?;
    Ok(sql_fingerprint(&json))
}

/// SHA-256 of a statement's text, as 64 lowercase hex chars.
pub fn sql_fingerprint(sql: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(sql.as_bytes());
    format!("{:x}", hasher.finalize())
}
