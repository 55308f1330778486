//! Row-limit enforcement on already-produced SQL.
//!
//! These are plain text operations for statements that were sanitized or
//! compiled earlier (cache hits, audit replays); they do not re-check safety.

use once_cell::sync::Lazy;
use regex::Regex;

static LIMIT_CLAUSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\blimit\s+(\d+)\b").expect("static regex is valid"));

/// Whether the statement has a numeric `LIMIT` clause.
pub fn has_limit(sql: &str) -> bool {
    LIMIT_CLAUSE.is_match(sql)
}

/// Replace every `LIMIT n` with `LIMIT ceiling`, or append one.
///
/// The result ends with exactly one `;`.
pub fn enforce_limit(sql: &str, ceiling: u64) -> String {
    let body = strip_terminator(sql);
    let limit = format!("LIMIT {}", ceiling);
    if has_limit(body) {
        format!("{};", LIMIT_CLAUSE.replace_all(body, limit.as_str()))
    } else {
        format!("{}\n{};", body, limit)
    }
}

/// Append `LIMIT ceiling` only when the statement has no `LIMIT`.
pub fn ensure_limit(sql: &str, ceiling: u64) -> String {
    let body = strip_terminator(sql);
    if has_limit(body) {
        format!("{};", body)
    } else {
        format!("{}\nLIMIT {};", body, ceiling)
    }
}

fn strip_terminator(sql: &str) -> &str {
    sql.trim().trim_end_matches(';').trim_end()
}
