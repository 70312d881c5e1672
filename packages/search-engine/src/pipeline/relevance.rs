//! Keyword relevance scoring, filtering and ranking.

use std::sync::Arc;
use tracing::debug;

use super::similarity::{NormalizedLevenshtein, Similarity};
use crate::types::config::ScoringConfig;
use crate::types::result::CanonicalResult;

/// Scores results against query tokens.
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    config: ScoringConfig,
    similarity: Arc<dyn Similarity>,
}

impl RelevanceScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self::with_similarity(config, Arc::new(NormalizedLevenshtein))
    }

    pub fn with_similarity(config: ScoringConfig, similarity: Arc<dyn Similarity>) -> Self {
        Self { config, similarity }
    }

    /// Relevance of one result.
    ///
    /// Each token earns the title, description or "elsewhere" weight for its
    /// best exact hit. Tokens of at least `partial_min_token_len` characters
    /// with no exact hit earn partial credit from the most similar word.
    /// Penalty phrases in the title subtract.
    pub fn score(&self, result: &CanonicalResult, tokens: &[String]) -> f64 {
        let title = result.title.to_lowercase();
        let description = result.description.to_lowercase();
        let combined = result.combined_text();
        let words: Vec<&str> = combined
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        let mut score = 0.0;
        for token in tokens {
            if title.contains(token.as_str()) {
                score += self.config.title_weight;
            } else if description.contains(token.as_str()) {
                score += self.config.description_weight;
            } else if combined.contains(token.as_str()) {
                score += self.config.other_weight;
            } else if token.chars().count() >= self.config.partial_min_token_len {
                let best = words
                    .iter()
                    .map(|w| self.similarity.similarity(token, w))
                    .fold(0.0_f64, f64::max);
                if best >= self.config.similarity_threshold {
                    score += self.config.partial_weight * best;
                }
            }
        }

        let penalties = self
            .config
            .penalty_phrases
            .iter()
            .filter(|p| title.contains(p.as_str()))
            .count();
        score - penalties as f64 * self.config.penalty_weight
    }

    /// Score every result and keep the relevant ones.
    ///
    /// The strict pass keeps scores at or above `min_relevance`. If it drops
    /// everything from a non-empty set, the lenient pass keeps results
    /// mentioning any token, and failing that the first results in arrival
    /// order; either way at most `lenient_cap`.
    pub fn filter(&self, mut results: Vec<CanonicalResult>, tokens: &[String]) -> Vec<CanonicalResult> {
        if results.is_empty() {
            return results;
        }

        for result in results.iter_mut() {
            result.relevance_score = self.score(result, tokens);
        }

        let min = self.config.min_relevance;
        if results.iter().any(|r| r.relevance_score >= min) {
            results.retain(|r| r.relevance_score >= min);
            return results;
        }

        let cap = self.config.lenient_cap.max(1);
        let mentioning: Vec<usize> = results
            .iter()
            .enumerate()
            .filter(|(_, r)| {
                let text = r.combined_text();
                tokens.iter().any(|t| text.contains(t.as_str()))
            })
            .map(|(i, _)| i)
            .collect();

        debug!(
            total = results.len(),
            mentioning = mentioning.len(),
            cap,
            "Strict relevance pass dropped everything, using lenient pass"
        );

        if mentioning.is_empty() {
            results.truncate(cap);
            return results;
        }

        let mut kept = Vec::with_capacity(cap.min(mentioning.len()));
        let mut mentioning = mentioning.into_iter().peekable();
        for (i, result) in results.into_iter().enumerate() {
            if kept.len() == cap {
                break;
            }
            if mentioning.peek() == Some(&i) {
                mentioning.next();
                kept.push(result);
            }
        }
        kept
    }
}

/// Stable sort by relevance, then domain score, both descending.
pub fn rank(results: &mut [CanonicalResult]) {
    results.sort_by(|a, b| {
        b.relevance_score
            .total_cmp(&a.relevance_score)
            .then_with(|| b.domain_score.cmp(&a.domain_score))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::canonical;
    use crate::types::query::tokenize;

    fn scorer() -> RelevanceScorer {
        RelevanceScorer::new(ScoringConfig::default())
    }

    #[test]
    fn test_title_beats_description_beats_elsewhere() {
        let tokens = tokenize("cook");
        let in_title = canonical("Line Cook", "Cafe X");
        let mut in_description = canonical("Kitchen Staff", "Cafe X");
        in_description.description = "Prep cook duties".into();
        let elsewhere = canonical("Kitchen Staff", "Cook County Hospital");

        let s = scorer();
        assert_eq!(s.score(&in_title, &tokens), 3.0);
        assert_eq!(s.score(&in_description, &tokens), 2.0);
        assert_eq!(s.score(&elsewhere, &tokens), 1.0);
    }

    #[test]
    fn test_partial_credit_for_similar_words() {
        let tokens = tokenize("warehousing");
        let result = canonical("Warehouse Associate", "Acme");
        let score = scorer().score(&result, &tokens);
        assert!(score > 0.7 && score < 1.0, "score was {}", score);

        // short tokens never get partial credit
        let tokens = tokenize("cok");
        assert_eq!(scorer().score(&canonical("Cook", "Cafe X"), &tokens), 0.0);
    }

    #[test]
    fn test_penalty_phrases() {
        let tokens = tokenize("sales");
        let result = canonical("Sales Rep - Commission Only", "Acme");
        assert_eq!(scorer().score(&result, &tokens), 3.0 - 4.0);
    }

    #[test]
    fn test_strict_pass_drops_penalized() {
        let tokens = tokenize("sales");
        let results = vec![
            canonical("Sales Associate", "Store"),
            canonical("Sales - Commission Only", "Acme"),
        ];
        let kept = scorer().filter(results, &tokens);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "Sales Associate");
    }

    #[test]
    fn test_lenient_pass_keeps_token_mentions() {
        let tokens = tokenize("sales");
        let results = vec![
            canonical("Be Your Own Boss", "MLM Co"),
            canonical("Sales - Commission Only", "Acme"),
            canonical("Pyramid Sales Opportunity", "Acme"),
        ];
        let kept = scorer().filter(results, &tokens);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].title, "Sales - Commission Only");
        assert_eq!(kept[1].title, "Pyramid Sales Opportunity");
    }

    #[test]
    fn test_lenient_pass_never_empties_a_non_empty_set() {
        let scoring = ScoringConfig::default().with_lenient_cap(2);
        let scorer = RelevanceScorer::new(scoring);
        let tokens = tokenize("forklift");
        let results = vec![
            canonical("MLM Opportunity", "A"),
            canonical("Pyramid Scheme", "B"),
            canonical("Be Your Own Boss", "C"),
        ];
        let kept = scorer.filter(results, &tokens);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].provider, "A");
        assert_eq!(kept[1].provider, "B");
    }

    #[test]
    fn test_lenient_pass_respects_cap() {
        let scoring = ScoringConfig::default().with_lenient_cap(1);
        let scorer = RelevanceScorer::new(scoring);
        let tokens = tokenize("sales");
        let results = vec![
            canonical("Sales - Commission Only", "A"),
            canonical("Sales - Commission Only", "B"),
        ];
        assert_eq!(scorer.filter(results, &tokens).len(), 1);
    }

    #[test]
    fn test_rank_is_stable() {
        let mut a = canonical("A", "x");
        a.relevance_score = 1.0;
        a.domain_score = 50;
        let mut b = canonical("B", "x");
        b.relevance_score = 3.0;
        b.domain_score = 10;
        let mut c = canonical("C", "x");
        c.relevance_score = 1.0;
        c.domain_score = 70;
        let mut d = canonical("D", "x");
        d.relevance_score = 1.0;
        d.domain_score = 50;

        let mut results = vec![a, b, c, d];
        rank(&mut results);
        let titles: Vec<&str> = results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "C", "A", "D"]);
    }
}
