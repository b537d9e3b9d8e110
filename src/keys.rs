// src/keys.rs
//
// Join keys shared by both sides of the matcher.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::sanitize::normalize_dashes;

static TITLE_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d{4})\)\s*$").expect("title year pattern"));
static CITE_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(1[89]\d{2}|20\d{2})").expect("cite year pattern"));

/// "410 U. S. 113" → "410US113". Blank and page-less placeholder
/// citations ("592 U.S. ___", "586 U.S.") have no key.
pub fn citation_key(raw: &str) -> Option<String> {
    let key: String = normalize_dashes(raw)
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if key.is_empty() || key.ends_with("US") {
        return None;
    }
    Some(key)
}

/// "No. 70–18" → "70-18".
pub fn docket_key(raw: &str) -> Option<String> {
    let upper = normalize_dashes(raw.trim()).to_uppercase();
    let rest = upper.strip_prefix("NO.").or_else(|| upper.strip_prefix("NO ")).unwrap_or(&upper);
    let key: String = rest.chars().filter(|c| !c.is_whitespace()).collect();
    (!key.is_empty()).then_some(key)
}

/// Year hint for a wiki row: a trailing "(YYYY)" in the title, else a
/// plausible year anywhere in the raw citation.
pub fn wiki_year(title: &str, raw_cite: &str) -> Option<i32> {
    TITLE_YEAR
        .captures(title)
        .or_else(|| CITE_YEAR.captures(raw_cite))
        .and_then(|c| c[1].parse().ok())
}

/// Decision year of an SCDB row: year of `dateDecision` (M/D/YYYY), else `term`.
pub fn decision_year(date_decision: &str, term: &str) -> Option<i32> {
    let last = date_decision.trim().rsplit('/').next().unwrap_or("");
    if last.len() == 4 && last.bytes().all(|b| b.is_ascii_digit()) {
        return last.parse().ok();
    }
    let term = term.trim();
    if !term.is_empty() && term.bytes().all(|b| b.is_ascii_digit()) {
        return term.parse().ok();
    }
    None
}
