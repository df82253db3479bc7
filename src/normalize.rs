//! Whitespace and citation-string normalization.

use regex::Regex;
use std::sync::LazyLock;

static COMMA_GAP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",\s+(\d)").unwrap());

/// Collapses every whitespace run (newlines included) into a single space
/// and trims both ends. Pure and total.
pub fn normalize(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Prepares a citation string for parsing: folds en and em dashes to `-`
/// and removes whitespace between a comma and a following digit
/// ("Jn 1, 10-18" → "Jn 1,10-18").
///
/// Applied only to citation/subject strings. Fingerprinting never sees the
/// output of this function.
pub fn normalize_citation(s: &str) -> String {
    let folded = s.replace('\u{2013}', "-").replace('\u{2014}', "-");
    COMMA_GAP.replace_all(&folded, ",$1").into_owned()
}
