//! Response envelope returned to every caller.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::result::CanonicalResult;

/// Pagination block attached to every response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub current_page: u32,
    pub per_page: u32,
    pub total_results: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    /// 1-based index of the first result on this page.
    pub start_index: u64,
    /// 1-based index of the last result on this page (inclusive).
    pub end_index: u64,
    /// Totals are an upstream estimate rather than an exact count.
    pub total_is_estimate: bool,
}

impl PaginationMeta {
    /// Well-formed block for a response with no results.
    pub fn empty(page: u32, per_page: u32) -> Self {
        crate::pipeline::formatter::paginate(0, page, per_page, false)
    }
}

/// Which path produced the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Scraper,
    Upstream,
    UpstreamSecondary,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Scraper => "scraper",
            Origin::Upstream => "upstream",
            Origin::UpstreamSecondary => "upstream-secondary",
        }
    }
}

/// Provenance tag carried by [`SearchResponse::source`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Cache,
    Fresh(Origin),
    Fallback(Origin),
    Error,
    ConfigMissing,
    EmptyQuery,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Cache => f.write_str("cache"),
            Provenance::Fresh(origin) => write!(f, "fresh:{}", origin.as_str()),
            Provenance::Fallback(origin) => write!(f, "fallback:{}", origin.as_str()),
            Provenance::Error => f.write_str("error"),
            Provenance::ConfigMissing => f.write_str("config_missing"),
            Provenance::EmptyQuery => f.write_str("empty_query"),
        }
    }
}

/// The envelope every `search` call returns, success or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub success: bool,
    pub results: Vec<CanonicalResult>,
    pub pagination: PaginationMeta,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchResponse {
    pub fn ok(results: Vec<CanonicalResult>, pagination: PaginationMeta, source: Provenance) -> Self {
        Self {
            success: true,
            results,
            pagination,
            source: source.to_string(),
            error: None,
        }
    }

    /// Zero-result envelope for a failed search.
    pub fn failure(page: u32, per_page: u32, source: Provenance, error: impl Into<String>) -> Self {
        Self {
            success: false,
            results: Vec::new(),
            pagination: PaginationMeta::empty(page, per_page),
            source: source.to_string(),
            error: Some(error.into()),
        }
    }

    /// Zero-result envelope for a query with nothing to search for.
    pub fn empty_query(page: u32, per_page: u32) -> Self {
        Self::ok(
            Vec::new(),
            PaginationMeta::empty(page, per_page),
            Provenance::EmptyQuery,
        )
    }
}
