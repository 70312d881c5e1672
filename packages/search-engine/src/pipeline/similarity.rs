//! String similarity used for partial keyword credit.

use std::fmt;

/// Normalized similarity between two words, in `[0, 1]`.
pub trait Similarity: Send + Sync + fmt::Debug {
    fn similarity(&self, a: &str, b: &str) -> f64;
}

/// Levenshtein distance scaled by the longer word's length.
#[derive(Debug, Default, Clone, Copy)]
pub struct NormalizedLevenshtein;

impl Similarity for NormalizedLevenshtein {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        strsim::normalized_levenshtein(a, b)
    }
}

/// Jaro-Winkler, which favours shared prefixes.
#[derive(Debug, Default, Clone, Copy)]
pub struct JaroWinkler;

impl Similarity for JaroWinkler {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        strsim::jaro_winkler(a, b)
    }
}
