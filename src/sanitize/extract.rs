//! Recovering SQL text from model output.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)```(?:sql)?\s*(.*?)\s*```").expect("static regex is valid")
});

/// Keywords a model tends to glue onto the following identifier.
const GLUE_KEYWORDS: &[&str] = &[
    "select", "from", "where", "group", "by", "order", "having", "limit", "join", "inner",
    "left", "right", "full", "on", "union", "with",
];

static KEYWORD_GLUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r#"(?i)\b({})([a-z_".][^\s,;()]*)"#,
        GLUE_KEYWORDS.join("|")
    ))
    .expect("static regex is valid")
});

/// The body of the first code fence if there is one, else the trimmed text,
/// with stray backticks removed.
pub fn extract_sql(raw: &str) -> String {
    let text = raw.trim();
    let body = match CODE_FENCE.captures(text) {
        Some(caps) => caps.get(1).map_or("", |m| m.as_str()),
        None => text,
    };
    body.trim().trim_matches('`').trim().to_string()
}

/// Split keywords glued to identifiers (`FROMzcm.t` -> `FROM zcm.t`) and
/// collapse whitespace.
///
/// A keyword prefix is split off only when the rest is unambiguously an
/// identifier: it starts with a quote, it is a dotted name after `FROM` or
/// `JOIN`, or the keyword is upper-case and the rest starts lower-case.
/// Words such as `selection` or `orders.id` are left alone.
pub fn normalize_sql_whitespace(sql: &str) -> String {
    let fixed = KEYWORD_GLUE.replace_all(sql.trim(), |caps: &Captures| {
        let keyword = &caps[1];
        let rest = &caps[2];
        if is_glued(keyword, rest) {
            format!("{} {}", keyword, rest)
        } else {
            caps[0].to_string()
        }
    });
    fixed.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_glued(keyword: &str, rest: &str) -> bool {
    if rest.starts_with('"') {
        return true;
    }
    let lower = keyword.to_ascii_lowercase();
    if (lower == "from" || lower == "join") && rest.contains('.') {
        return true;
    }
    let all_caps = keyword.chars().all(|c| c.is_ascii_uppercase());
    all_caps && rest.starts_with(|c: char| c.is_ascii_lowercase())
}
