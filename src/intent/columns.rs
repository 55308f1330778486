//! Column detectors.
//!
//! Heuristics that pick whitelisted columns out of a question. Each returns
//! `None` when nothing matches, which makes the template planner decline.

use once_cell::sync::Lazy;
use regex::Regex;

use super::QuestionSignals;
use crate::catalog::Whitelist;

static NON_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9_]+").expect("static regex is valid"));

/// Lower-case the question and replace every run of characters outside
/// `[a-z0-9_]` with one space.
pub fn normalize_tokens(question: &str) -> String {
    NON_TOKEN
        .replace_all(&question.to_lowercase(), " ")
        .trim()
        .to_string()
}

/// Whether `needle` occurs in `text` with no token character directly before
/// or after it.
fn contains_token(text: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let pattern = format!(r"(?:^|[^a-z0-9_]){}(?:$|[^a-z0-9_])", regex::escape(needle));
    Regex::new(&pattern).map_or(false, |re| re.is_match(text))
}

/// The longest whitelisted column mentioned as a whole token.
///
/// Longer names are tried first so `nomepan` wins over `pan`.
pub fn detect_target_column<'a>(question: &str, whitelist: &'a Whitelist) -> Option<&'a str> {
    detect_mentioned_column(question, whitelist, None)
}

/// Like [`detect_target_column`], skipping the column being summed.
pub fn detect_group_column<'a>(
    question: &str,
    whitelist: &'a Whitelist,
    exclude: Option<&str>,
) -> Option<&'a str> {
    detect_mentioned_column(question, whitelist, exclude)
}

fn detect_mentioned_column<'a>(
    question: &str,
    whitelist: &'a Whitelist,
    exclude: Option<&str>,
) -> Option<&'a str> {
    let text = normalize_tokens(question);
    whitelist
        .longest_first()
        .into_iter()
        .filter(|col| Some(*col) != exclude)
        .find(|col| contains_token(&text, &col.to_lowercase()))
}

/// The column to sum, keyed on domain hint words.
///
/// An area hint picks the first column whose name contains `area`; a
/// perimeter hint picks the first containing `perimet`.
pub fn detect_sum_column<'a>(
    signals: &QuestionSignals,
    whitelist: &'a Whitelist,
) -> Option<&'a str> {
    let first_containing =
        |needle: &str| whitelist.iter().find(|col| col.to_lowercase().contains(needle));

    if signals.area_hint {
        if let Some(col) = first_containing("area") {
            return Some(col);
        }
    }
    if signals.perimeter_hint {
        if let Some(col) = first_containing("perimet") {
            return Some(col);
        }
    }
    None
}
