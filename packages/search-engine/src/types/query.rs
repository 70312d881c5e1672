//! Query types and cache fingerprinting.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::SearchError;

/// Largest page size accepted at the boundary.
pub const MAX_PER_PAGE: u32 = 40;

/// Page size used when the caller does not choose one.
pub const DEFAULT_PER_PAGE: u32 = 10;

/// What kind of listing the caller is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    Jobs,
    Housing,
    Services,
    General,
}

impl QueryType {
    pub const ALL: [QueryType; 4] = [
        QueryType::Jobs,
        QueryType::Housing,
        QueryType::Services,
        QueryType::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::Jobs => "jobs",
            QueryType::Housing => "housing",
            QueryType::Services => "services",
            QueryType::General => "general",
        }
    }

    /// Sources scraped when the caller does not pick any.
    pub fn default_sources(&self) -> &'static [SourceId] {
        match self {
            QueryType::Jobs => &[SourceId::Indeed, SourceId::SimplyHired, SourceId::UsaJobs],
            QueryType::Housing | QueryType::Services => &[SourceId::Craigslist],
            QueryType::General => &[SourceId::Indeed, SourceId::Craigslist],
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryType {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jobs" | "job" => Ok(QueryType::Jobs),
            "housing" => Ok(QueryType::Housing),
            "services" | "service" => Ok(QueryType::Services),
            "general" => Ok(QueryType::General),
            other => Err(SearchError::InvalidQuery {
                reason: format!("unknown query type '{}'", other),
            }),
        }
    }
}

/// Identifier of a listing origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    Indeed,
    SimplyHired,
    /// Technology-focused job board.
    Dice,
    /// Federal government listings.
    UsaJobs,
    /// General-purpose classifieds, always included as a catch-all.
    Craigslist,
    /// The paginated upstream search API.
    Upstream,
}

impl SourceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Indeed => "indeed",
            SourceId::SimplyHired => "simplyhired",
            SourceId::Dice => "dice",
            SourceId::UsaJobs => "usajobs",
            SourceId::Craigslist => "craigslist",
            SourceId::Upstream => "upstream",
        }
    }

    /// Human-readable name shown next to results.
    pub fn display_name(&self) -> &'static str {
        match self {
            SourceId::Indeed => "Indeed",
            SourceId::SimplyHired => "SimplyHired",
            SourceId::Dice => "Dice",
            SourceId::UsaJobs => "USAJOBS",
            SourceId::Craigslist => "Craigslist",
            SourceId::Upstream => "Web Search",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "indeed" => Ok(SourceId::Indeed),
            "simplyhired" | "simply_hired" => Ok(SourceId::SimplyHired),
            "dice" => Ok(SourceId::Dice),
            "usajobs" | "usa_jobs" => Ok(SourceId::UsaJobs),
            "craigslist" => Ok(SourceId::Craigslist),
            "upstream" => Ok(SourceId::Upstream),
            other => Err(SearchError::InvalidQuery {
                reason: format!("unknown source '{}'", other),
            }),
        }
    }
}

/// A single inbound search request.
///
/// Immutable once built. Use [`SearchQuery::builder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    keywords: String,
    location: String,
    query_type: QueryType,
    sources: Option<BTreeSet<SourceId>>,
    page: u32,
    per_page: u32,
    domain_filter_only: bool,
    force_refresh: bool,
}

impl SearchQuery {
    /// Start building a query.
    pub fn builder(keywords: impl Into<String>, query_type: QueryType) -> SearchQueryBuilder {
        SearchQueryBuilder::new(keywords, query_type)
    }

    pub fn keywords(&self) -> &str {
        &self.keywords
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn query_type(&self) -> QueryType {
        self.query_type
    }

    /// Explicitly requested sources, if any.
    pub fn sources(&self) -> Option<&BTreeSet<SourceId>> {
        self.sources.as_ref()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn domain_filter_only(&self) -> bool {
        self.domain_filter_only
    }

    pub fn force_refresh(&self) -> bool {
        self.force_refresh
    }

    /// True when there is nothing to search for.
    pub fn is_blank(&self) -> bool {
        self.keywords.trim().is_empty()
    }

    /// Lower-cased keyword tokens used for relevance scoring.
    pub fn tokens(&self) -> Vec<String> {
        tokenize(&self.keywords)
    }

    /// Copy of this query with a different page size.
    ///
    /// Used at the boundary to clamp per-path limits.
    pub fn with_per_page(&self, per_page: u32) -> Self {
        Self {
            per_page: per_page.max(1),
            ..self.clone()
        }
    }

    /// Stable cache key over every cache-relevant field.
    ///
    /// `page`, `per_page` and `force_refresh` are excluded: the same ranked list
    /// serves every page of a query.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(b"v1|");
        hasher.update(self.query_type.as_str().as_bytes());
        hasher.update(b"|");
        hasher.update(normalize_text(&self.keywords).as_bytes());
        hasher.update(b"|");
        hasher.update(normalize_text(&self.location).as_bytes());
        hasher.update(b"|");
        if let Some(sources) = &self.sources {
            let names: Vec<&str> = sources.iter().map(|s| s.as_str()).collect();
            hasher.update(names.join(",").as_bytes());
        } else {
            hasher.update(b"*");
        }
        hasher.update(b"|");
        hasher.update(if self.domain_filter_only { b"1" } else { b"0" });
        hex::encode(hasher.finalize())
    }
}

/// Builder for [`SearchQuery`].
#[derive(Debug, Clone)]
pub struct SearchQueryBuilder {
    keywords: String,
    location: String,
    query_type: QueryType,
    sources: Option<BTreeSet<SourceId>>,
    page: u32,
    per_page: u32,
    domain_filter_only: bool,
    force_refresh: bool,
}

impl SearchQueryBuilder {
    fn new(keywords: impl Into<String>, query_type: QueryType) -> Self {
        Self {
            keywords: keywords.into(),
            location: String::new(),
            query_type,
            sources: None,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            domain_filter_only: false,
            force_refresh: false,
        }
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn sources(mut self, sources: impl IntoIterator<Item = SourceId>) -> Self {
        self.sources = Some(sources.into_iter().collect());
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn domain_filter_only(mut self, enabled: bool) -> Self {
        self.domain_filter_only = enabled;
        self
    }

    pub fn force_refresh(mut self, enabled: bool) -> Self {
        self.force_refresh = enabled;
        self
    }

    /// Build the query, raising `page` to 1 and clamping `per_page` into `[1, 40]`.
    pub fn build(self) -> SearchQuery {
        SearchQuery {
            keywords: self.keywords.trim().to_string(),
            location: self.location.trim().to_string(),
            query_type: self.query_type,
            sources: self.sources.filter(|s| !s.is_empty()),
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, MAX_PER_PAGE),
            domain_filter_only: self.domain_filter_only,
            force_refresh: self.force_refresh,
        }
    }
}

/// Collapse whitespace and lower-case.
pub(crate) fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split text into lower-cased alphanumeric tokens.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_clamps_boundaries() {
        let query = SearchQuery::builder("cook", QueryType::Jobs)
            .page(0)
            .per_page(500)
            .build();
        assert_eq!(query.page(), 1);
        assert_eq!(query.per_page(), MAX_PER_PAGE);

        let query = SearchQuery::builder("cook", QueryType::Jobs)
            .per_page(0)
            .build();
        assert_eq!(query.per_page(), 1);
    }

    #[test]
    fn test_fingerprint_ignores_paging_and_refresh() {
        let a = SearchQuery::builder("warehouse", QueryType::Jobs)
            .location("Los Angeles, CA")
            .page(1)
            .per_page(10)
            .build();
        let b = SearchQuery::builder("warehouse", QueryType::Jobs)
            .location("Los Angeles, CA")
            .page(3)
            .per_page(25)
            .force_refresh(true)
            .build();
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_fingerprint_normalizes_text() {
        let a = SearchQuery::builder("Warehouse  Associate", QueryType::Jobs)
            .location("los angeles, ca")
            .build();
        let b = SearchQuery::builder("  warehouse associate ", QueryType::Jobs)
            .location("Los Angeles,   CA")
            .build();
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_fingerprint_distinguishes_cache_relevant_fields() {
        let base = SearchQuery::builder("cook", QueryType::Jobs).location("Denver, CO");
        let plain = base.clone().build();

        assert_ne!(
            plain.fingerprint(),
            base.clone().domain_filter_only(true).build().fingerprint()
        );
        assert_ne!(
            plain.fingerprint(),
            base.clone().sources([SourceId::Indeed]).build().fingerprint()
        );
        assert_ne!(
            plain.fingerprint(),
            SearchQuery::builder("cook", QueryType::General)
                .location("Denver, CO")
                .build()
                .fingerprint()
        );
    }

    #[test]
    fn test_fingerprint_source_order_is_irrelevant() {
        let a = SearchQuery::builder("cook", QueryType::Jobs)
            .sources([SourceId::Indeed, SourceId::Dice])
            .build();
        let b = SearchQuery::builder("cook", QueryType::Jobs)
            .sources([SourceId::Dice, SourceId::Indeed])
            .build();
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_tokens_deduplicate_and_lowercase() {
        let query = SearchQuery::builder("Forklift forklift, Driver", QueryType::Jobs).build();
        assert_eq!(query.tokens(), vec!["forklift", "driver"]);
    }

    #[test]
    fn test_parse_query_type() {
        assert_eq!("JOBS".parse::<QueryType>().unwrap(), QueryType::Jobs);
        assert_eq!("housing".parse::<QueryType>().unwrap(), QueryType::Housing);
        assert!("boats".parse::<QueryType>().is_err());
    }
}
