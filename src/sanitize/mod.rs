//! Free-text SQL sanitizer.
//!
//! Model-written SQL is extracted from its markdown, re-spaced, checked
//! against the safety policy and then forced onto the authorized table: the
//! token after the first `FROM` is replaced whatever the model wrote there.
//!
//! Forcing is textual. A statement with a subquery, a `JOIN` or several CTEs
//! only has its first `FROM` target replaced; such statements are logged at
//! `warn` and passed through.

mod extract;
mod policy;

pub use extract::{extract_sql, normalize_sql_whitespace};
pub use policy::{check_safe_select, is_safe_select, FORBIDDEN_KEYWORDS};

use tracing::warn;

use crate::catalog::AuthorizedTable;
use crate::error::{GuardError, GuardResult, UnsafeReason};

/// Reason tag of sanitized free-text SQL.
pub const SANITIZED_REASON: &str = "llm_sql_normalized_and_forced";

/// Extract, normalize, check and force a model-written statement.
///
/// The result always ends with `;` and always reads from `table`.
pub fn sanitize_llm_sql(raw: &str, table: &AuthorizedTable) -> GuardResult<String> {
    let sql = normalize_sql_whitespace(&extract_sql(raw));

    if let Err(reason) = check_safe_select(&sql) {
        warn!(%reason, "rejected model SQL");
        return Err(reason.into());
    }

    let mut forced = force_table(&sql, table)?;
    if !forced.ends_with(';') {
        forced.push(';');
    }
    Ok(forced)
}

/// Replace the token after the first `FROM` with the authorized table,
/// keeping any `;`, `,` or `)` glued to the replaced token.
pub fn force_table(sql: &str, table: &AuthorizedTable) -> GuardResult<String> {
    let tokens: Vec<&str> = sql.split_whitespace().collect();

    let from_idx = tokens
        .iter()
        .position(|t| t.eq_ignore_ascii_case("from"))
        .ok_or(GuardError::UnsafeSqlDetected(UnsafeReason::MissingFrom))?;
    let target = *tokens
        .get(from_idx + 1)
        .ok_or(GuardError::UnsafeSqlDetected(UnsafeReason::MissingFrom))?;

    let extra_sources = tokens
        .iter()
        .filter(|t| t.eq_ignore_ascii_case("from") || t.eq_ignore_ascii_case("join"))
        .count();
    if extra_sources > 1 {
        warn!(
            sources = extra_sources,
            "model SQL reads from more than one source; only the first FROM is forced"
        );
    }

    let stem = target.trim_end_matches([';', ',', ')']);
    let suffix = &target[stem.len()..];
    let replacement = format!("{}{}", table.as_str(), suffix);

    let forced: Vec<&str> = tokens
        .iter()
        .enumerate()
        .map(|(i, t)| if i == from_idx + 1 { replacement.as_str() } else { *t })
        .collect();
    Ok(forced.join(" "))
}
