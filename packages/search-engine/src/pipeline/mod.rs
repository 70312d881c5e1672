//! From raw records to a ranked, deduplicated result list.
//!
//! ```text
//! adapters ──► orchestrator ──► canonicalize ──► domain score ──► relevance filter
//!                                                                      │
//!                          formatter ◄── cache ◄── dedup ◄── rank ◄────┘
//! ```

pub mod canonicalize;
pub mod dedup;
pub mod domain;
pub mod formatter;
pub mod orchestrator;
pub mod relevance;
pub mod similarity;

use std::sync::Arc;
use tracing::debug;

pub use canonicalize::canonicalize;
pub use dedup::dedup;
pub use domain::DomainScorer;
pub use formatter::{format_page, paginate, window_meta};
pub use orchestrator::{Orchestrator, OrchestratorRun, SourceOutcome, WORKER_POOL_SIZE};
pub use relevance::{rank, RelevanceScorer};
pub use similarity::{JaroWinkler, NormalizedLevenshtein, Similarity};

use crate::types::config::ScoringConfig;
use crate::types::query::SearchQuery;
use crate::types::record::FetchedRecord;
use crate::types::result::CanonicalResult;

/// Scoring stages shared by both search paths.
#[derive(Debug, Clone)]
pub struct ResultPipeline {
    relevance: RelevanceScorer,
    domain: DomainScorer,
}

impl ResultPipeline {
    pub fn new(scoring: ScoringConfig) -> Self {
        Self::with_similarity(scoring, Arc::new(NormalizedLevenshtein))
    }

    pub fn with_similarity(scoring: ScoringConfig, similarity: Arc<dyn Similarity>) -> Self {
        Self {
            relevance: RelevanceScorer::with_similarity(scoring.clone(), similarity),
            domain: DomainScorer::new(scoring),
        }
    }

    /// Full treatment for a scraper run: the result is what gets cached.
    pub fn process(&self, records: Vec<FetchedRecord>, query: &SearchQuery) -> Vec<CanonicalResult> {
        let raw = records.len();
        let mut results: Vec<CanonicalResult> = records.into_iter().map(canonicalize).collect();
        self.domain.apply(&mut results);

        let tokens = query.tokens();
        let mut results = self.relevance.filter(results, &tokens);
        rank(&mut results);

        if query.domain_filter_only() {
            results = self.domain.retain_suitable(results);
        }

        let results = dedup(results);
        debug!(raw, kept = results.len(), "Processed scraper records");
        results
    }

    /// Scores for an upstream window, which is already a ranked slice.
    ///
    /// Nothing is dropped or reordered so the window stays contiguous.
    pub fn annotate(&self, records: Vec<FetchedRecord>, query: &SearchQuery) -> Vec<CanonicalResult> {
        let tokens = query.tokens();
        let mut results: Vec<CanonicalResult> = records.into_iter().map(canonicalize).collect();
        for result in results.iter_mut() {
            result.domain_score = self.domain.score(result);
            result.relevance_score = self.relevance.score(result, &tokens);
        }
        results
    }

    /// Drops results that score below the suitability threshold.
    pub fn retain_suitable(&self, results: Vec<CanonicalResult>) -> Vec<CanonicalResult> {
        self.domain.retain_suitable(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::listing;
    use crate::types::query::{QueryType, SourceId};

    fn records(items: &[(SourceId, &str, &str, &str)]) -> Vec<FetchedRecord> {
        items
            .iter()
            .map(|(source, title, company, description)| FetchedRecord::new(listing(*source, title, company, description)))
            .collect()
    }

    #[test]
    fn test_process_ranks_and_dedups() {
        let pipeline = ResultPipeline::new(ScoringConfig::default());
        let query = SearchQuery::builder("cook", QueryType::Jobs).build();

        let results = pipeline.process(
            records(&[
                (SourceId::Indeed, "Dishwasher", "Cafe X", "Assist the cook"),
                (SourceId::Indeed, "Cook", "Cafe X", "Line work"),
                (SourceId::SimplyHired, "cook", "cafe x", "Duplicate from another board"),
                (SourceId::SimplyHired, "Cook", "Diner Y", "Entry level, will train"),
            ]),
            &query,
        );

        let titles: Vec<(&str, &str)> = results.iter().map(|r| (r.title.as_str(), r.provider.as_str())).collect();
        assert_eq!(
            titles,
            vec![("Cook", "Diner Y"), ("Cook", "Cafe X"), ("Dishwasher", "Cafe X")]
        );
    }

    #[test]
    fn test_domain_filter() {
        let pipeline = ResultPipeline::new(ScoringConfig::default());
        let query = SearchQuery::builder("nurse", QueryType::Jobs)
            .domain_filter_only(true)
            .build();

        let results = pipeline.process(
            records(&[
                (SourceId::Indeed, "Registered Nurse", "Hospital", "License required, background check"),
                (SourceId::Indeed, "Nurse Aide", "Care Home", "Entry level, paid training"),
            ]),
            &query,
        );

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Nurse Aide");
    }

    #[test]
    fn test_annotate_keeps_window_order() {
        let pipeline = ResultPipeline::new(ScoringConfig::default());
        let query = SearchQuery::builder("housing", QueryType::Housing).build();

        let results = pipeline.annotate(
            records(&[
                (SourceId::Upstream, "Apartment listings", "example.org", ""),
                (SourceId::Upstream, "Reentry housing - MLM", "example.org", ""),
            ]),
            &query,
        );

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Apartment listings");
        assert!(results[1].relevance_score < 0.0);
    }
}
