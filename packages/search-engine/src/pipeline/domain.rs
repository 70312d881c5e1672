//! Suitability of a listing for people re-entering the workforce.

use crate::pipeline::canonicalize::origin_of;
use crate::types::config::ScoringConfig;
use crate::types::result::CanonicalResult;

/// Computes `domain_score` from indicator phrases and the record's origin.
#[derive(Debug, Clone)]
pub struct DomainScorer {
    config: ScoringConfig,
}

impl DomainScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Baseline, plus each positive indicator, minus each negative one, plus
    /// the origin adjustment. Clamped to `[0, 100]`.
    pub fn score(&self, result: &CanonicalResult) -> u8 {
        let text = result.combined_text();
        let count = |phrases: &[String]| phrases.iter().filter(|p| text.contains(p.as_str())).count() as i32;

        let positives = count(&self.config.positive_indicators);
        let negatives = count(&self.config.negative_indicators);
        let adjustment = origin_of(result)
            .and_then(|origin| self.config.origin_adjustments.get(&origin).copied())
            .unwrap_or(0);

        let raw = self.config.domain_baseline + positives * self.config.positive_increment
            - negatives * self.config.negative_increment
            + adjustment;

        raw.clamp(0, 100) as u8
    }

    /// Fill in `domain_score` on every result.
    pub fn apply(&self, results: &mut [CanonicalResult]) {
        for result in results.iter_mut() {
            result.domain_score = self.score(result);
        }
    }

    /// Keep only results at or above the configured threshold.
    pub fn retain_suitable(&self, results: Vec<CanonicalResult>) -> Vec<CanonicalResult> {
        let threshold = self.config.domain_filter_threshold;
        results
            .into_iter()
            .filter(|r| r.domain_score >= threshold)
            .collect()
    }
}
