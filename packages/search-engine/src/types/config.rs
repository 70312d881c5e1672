//! Configuration types for the engine and the scorer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use super::query::{QueryType, SourceId};
use crate::error::{Result, SearchError};

/// Which backend answers a query type on a cache miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Concurrent source adapters, scored and deduplicated locally.
    Scrape,
    /// Paginated upstream search API.
    Upstream,
}

/// Configuration for the search coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Budget for one adapter fetch, in seconds.
    ///
    /// Default: 20.
    pub per_source_timeout_secs: u64,

    /// Budget for a whole orchestrator run, in seconds.
    ///
    /// Default: 45.
    pub batch_timeout_secs: u64,

    /// Budget for one upstream call, in seconds.
    ///
    /// Default: 10.
    pub upstream_call_timeout_secs: u64,

    /// Lifetime of a cache entry, in seconds.
    ///
    /// Default: 3600.
    pub cache_ttl_secs: u64,

    /// Minimum gap between two requests to the same site, in milliseconds.
    ///
    /// Default: 1500.
    pub politeness_delay_ms: u64,

    /// Backend per query type.
    ///
    /// Default: jobs are scraped, everything else goes upstream.
    pub routes: BTreeMap<QueryType, Route>,

    /// Scoring weights and thresholds.
    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            per_source_timeout_secs: 20,
            batch_timeout_secs: 45,
            upstream_call_timeout_secs: 10,
            cache_ttl_secs: 3600,
            politeness_delay_ms: 1500,
            routes: BTreeMap::from([
                (QueryType::Jobs, Route::Scrape),
                (QueryType::Housing, Route::Upstream),
                (QueryType::Services, Route::Upstream),
                (QueryType::General, Route::Upstream),
            ]),
            scoring: ScoringConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn per_source_timeout(&self) -> Duration {
        Duration::from_secs(self.per_source_timeout_secs)
    }

    pub fn batch_timeout(&self) -> Duration {
        Duration::from_secs(self.batch_timeout_secs)
    }

    pub fn upstream_call_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_call_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.politeness_delay_ms)
    }

    /// Backend for a query type. Unlisted types go upstream.
    pub fn route_for(&self, query_type: QueryType) -> Route {
        self.routes
            .get(&query_type)
            .copied()
            .unwrap_or(Route::Upstream)
    }

    /// Set per-adapter and batch timeouts.
    pub fn with_timeouts(mut self, per_source_secs: u64, batch_secs: u64) -> Self {
        self.per_source_timeout_secs = per_source_secs;
        self.batch_timeout_secs = batch_secs;
        self
    }

    /// Set cache TTL.
    pub fn with_cache_ttl(mut self, secs: u64) -> Self {
        self.cache_ttl_secs = secs;
        self
    }

    /// Set politeness delay.
    pub fn with_politeness_delay(mut self, ms: u64) -> Self {
        self.politeness_delay_ms = ms;
        self
    }

    /// Route a query type to a backend.
    pub fn with_route(mut self, query_type: QueryType, route: Route) -> Self {
        self.routes.insert(query_type, route);
        self
    }

    /// Replace the scoring config.
    pub fn with_scoring(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = scoring;
        self
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        let timeouts = [
            ("per_source_timeout_secs", self.per_source_timeout_secs),
            ("batch_timeout_secs", self.batch_timeout_secs),
            ("upstream_call_timeout_secs", self.upstream_call_timeout_secs),
        ];
        if let Some((name, _)) = timeouts.iter().find(|(_, secs)| *secs == 0) {
            return Err(SearchError::Config(format!("{} must be greater than zero", name)));
        }
        if self.scoring.domain_filter_threshold > 100 {
            return Err(SearchError::Config(format!(
                "domain_filter_threshold {} is above 100",
                self.scoring.domain_filter_threshold
            )));
        }
        Ok(())
    }
}

/// Weights and thresholds for relevance and domain scoring.
///
/// The shipped values are directionally correct, not calibrated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Credit for a query token found in the title.
    pub title_weight: f64,
    /// Credit for a query token found in the description.
    pub description_weight: f64,
    /// Credit for a query token found anywhere else.
    pub other_weight: f64,
    /// Credit multiplied by similarity for a fuzzy word match.
    pub partial_weight: f64,
    /// Shortest token eligible for fuzzy matching.
    pub partial_min_token_len: usize,
    /// Similarity a word must reach to count as a fuzzy match.
    pub similarity_threshold: f64,
    /// Title phrases marking an obviously wrong category.
    pub penalty_phrases: Vec<String>,
    /// Amount subtracted per penalty phrase.
    pub penalty_weight: f64,
    /// Strict pass keeps records scoring at least this.
    pub min_relevance: f64,
    /// Upper bound on records kept by the lenient pass.
    pub lenient_cap: usize,

    /// Domain score before any indicator applies.
    pub domain_baseline: i32,
    /// Phrases that make a listing more suitable.
    pub positive_indicators: Vec<String>,
    pub positive_increment: i32,
    /// Phrases that make a listing less suitable.
    pub negative_indicators: Vec<String>,
    pub negative_increment: i32,
    /// Fixed adjustment per origin.
    pub origin_adjustments: BTreeMap<SourceId, i32>,
    /// `domain_filter_only` keeps records scoring at least this.
    pub domain_filter_threshold: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            title_weight: 3.0,
            description_weight: 2.0,
            other_weight: 1.0,
            partial_weight: 1.0,
            partial_min_token_len: 4,
            similarity_threshold: 0.7,
            penalty_phrases: strings(&[
                "commission only",
                "mlm",
                "pyramid",
                "be your own boss",
                "unpaid internship",
                "phd required",
            ]),
            penalty_weight: 4.0,
            min_relevance: 0.0,
            lenient_cap: 20,

            domain_baseline: 50,
            positive_indicators: strings(&[
                "entry level",
                "no experience",
                "training provided",
                "will train",
                "paid training",
                "on the job training",
                "second chance",
                "fair chance",
                "felony friendly",
                "background friendly",
                "warehouse",
                "general labor",
                "forklift",
                "construction",
                "kitchen",
                "cook",
                "dishwasher",
                "janitor",
                "custodian",
                "driver",
                "apprentice",
                "immediate start",
            ]),
            positive_increment: 10,
            negative_indicators: strings(&[
                "background check",
                "clean record",
                "no felonies",
                "no criminal",
                "security clearance",
                "clearance required",
                "drug test",
                "licensed",
                "license required",
                "registered nurse",
                "cpa",
                "bar admission",
            ]),
            negative_increment: 15,
            origin_adjustments: BTreeMap::from([
                (SourceId::Indeed, 0),
                (SourceId::SimplyHired, 0),
                (SourceId::Craigslist, 5),
                (SourceId::Dice, -5),
                (SourceId::UsaJobs, -10),
                (SourceId::Upstream, 0),
            ]),
            domain_filter_threshold: 50,
        }
    }
}

impl ScoringConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the lenient fallback cap.
    pub fn with_lenient_cap(mut self, cap: usize) -> Self {
        self.lenient_cap = cap;
        self
    }

    /// Replace the title penalty phrases.
    pub fn with_penalty_phrases(
        mut self,
        phrases: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.penalty_phrases = phrases.into_iter().map(|p| p.into()).collect();
        self
    }

    /// Set the strict-pass minimum relevance.
    pub fn with_min_relevance(mut self, min: f64) -> Self {
        self.min_relevance = min;
        self
    }

    /// Set the adjustment applied to every record from an origin.
    pub fn with_origin_adjustment(mut self, source: SourceId, adjustment: i32) -> Self {
        self.origin_adjustments.insert(source, adjustment);
        self
    }

    /// Set the domain filter threshold.
    pub fn with_domain_filter_threshold(mut self, threshold: u8) -> Self {
        self.domain_filter_threshold = threshold;
        self
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(EngineConfig::default().validate().is_ok());

        let err = EngineConfig::default().with_timeouts(0, 45).validate().unwrap_err();
        assert!(matches!(err, SearchError::Config(ref msg) if msg.contains("per_source_timeout_secs")));

        let config = EngineConfig::default().with_scoring(ScoringConfig::new().with_domain_filter_threshold(120));
        assert!(matches!(config.validate(), Err(SearchError::Config(_))));
    }

    #[test]
    fn test_default_routes() {
        let config = EngineConfig::default();
        assert_eq!(config.route_for(QueryType::Jobs), Route::Scrape);
        assert_eq!(config.route_for(QueryType::Housing), Route::Upstream);
        assert_eq!(config.route_for(QueryType::General), Route::Upstream);
    }

    #[test]
    fn test_scoring_overrides_from_json() {
        let scoring: ScoringConfig =
            serde_json::from_str(r#"{"lenient_cap": 5, "domain_baseline": 40}"#).unwrap();
        assert_eq!(scoring.lenient_cap, 5);
        assert_eq!(scoring.domain_baseline, 40);
        // Unspecified fields keep their defaults
        assert_eq!(scoring.similarity_threshold, 0.7);
    }

    #[test]
    fn test_scoring_builders() {
        let config = EngineConfig::new().with_scoring(
            ScoringConfig::new()
                .with_min_relevance(2.5)
                .with_penalty_phrases(["night shift"])
                .with_domain_filter_threshold(70)
                .with_origin_adjustment(SourceId::Dice, 0),
        );

        assert_eq!(config.scoring.min_relevance, 2.5);
        assert_eq!(config.scoring.penalty_phrases, vec!["night shift".to_string()]);
        assert_eq!(config.scoring.domain_filter_threshold, 70);
        assert_eq!(config.scoring.origin_adjustments.get(&SourceId::Dice), Some(&0));
    }
}
