//! Safety policy for free-text SQL.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::UnsafeReason;

/// DDL/DML keywords rejected anywhere in a statement, as whole words.
pub const FORBIDDEN_KEYWORDS: &[&str] = &[
    "insert", "update", "delete", "drop", "alter", "truncate", "create", "grant", "revoke",
    "merge", "call", "execute",
];

static MULTI_STATEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r";\s*\S").expect("static regex is valid"));

static SELECT_OR_WITH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(?:select|with)\s").expect("static regex is valid"));

static COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"--|/\*").expect("static regex is valid"));

// `FROM` directly followed by something other than whitespace or an identifier.
static GLUED_FROM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bfrom[^\s\w"]"#).expect("static regex is valid"));

static FORBIDDEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b({})\b", FORBIDDEN_KEYWORDS.join("|")))
        .expect("static regex is valid")
});

/// Accept a single read-only `SELECT`/`WITH` statement.
///
/// Comments and a `FROM` glued to punctuation are rejected: both would hide
/// the real FROM target from whitespace tokenizing.
///
/// Keyword matching is whole-word, so `updated_at` or `created_by` pass, but
/// it does not understand string literals: `'drop'` or `'--'` inside a
/// literal is rejected too.
pub fn check_safe_select(sql: &str) -> Result<(), UnsafeReason> {
    let stmt = sql.trim();
    if stmt.is_empty() {
        return Err(UnsafeReason::Empty);
    }
    if MULTI_STATEMENT.is_match(stmt) {
        return Err(UnsafeReason::MultipleStatements);
    }
    if !SELECT_OR_WITH.is_match(stmt) {
        return Err(UnsafeReason::NotSelect);
    }
    if COMMENT.is_match(stmt) {
        return Err(UnsafeReason::Comment);
    }
    if GLUED_FROM.is_match(stmt) {
        return Err(UnsafeReason::GluedFrom);
    }
    if let Some(m) = FORBIDDEN.find(stmt) {
        return Err(UnsafeReason::ForbiddenKeyword(m.as_str().to_ascii_lowercase()));
    }
    Ok(())
}

/// Boolean form of [`check_safe_select`].
pub fn is_safe_select(sql: &str) -> bool {
    check_safe_select(sql).is_ok()
}
