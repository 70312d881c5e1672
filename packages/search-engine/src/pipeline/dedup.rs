//! Collapse results that name the same listing.

use std::collections::HashSet;

use crate::types::result::CanonicalResult;

/// Identity of a listing: normalized `(title, provider)`.
pub fn dedup_key(result: &CanonicalResult) -> (String, String) {
    (normalize(&result.title), normalize(&result.provider))
}

/// Lower-cased, punctuation stripped, whitespace collapsed.
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keep the first occurrence of every key, preserving order.
pub fn dedup(results: Vec<CanonicalResult>) -> Vec<CanonicalResult> {
    let mut seen = HashSet::new();
    results
        .into_iter()
        .filter(|r| seen.insert(dedup_key(r)))
        .collect()
}
