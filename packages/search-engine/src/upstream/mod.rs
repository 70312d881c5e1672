//! Upstream search API: single-call client and window reconstruction.
//!
//! The upstream serves at most [`UPSTREAM_PAGE_SIZE`] items per call at
//! 1-based offsets and refuses offsets beyond [`UPSTREAM_MAX_START`].
//! [`PaginatedClient`] turns an arbitrary `(page, per_page)` request into a
//! short run of bounded calls.

use async_trait::async_trait;

use crate::error::UpstreamResult;
use crate::security::UpstreamCredentials;
use crate::types::record::UpstreamItem;

pub mod google;
pub mod paginator;

pub use google::GoogleSearchClient;
pub use paginator::{planned_offsets, PaginatedClient, UpstreamWindow};

/// Items served per upstream call.
pub const UPSTREAM_PAGE_SIZE: u32 = 10;

/// Largest start offset the upstream accepts.
pub const UPSTREAM_MAX_START: u32 = 100;

/// Upstream calls allowed per logical request.
pub const MAX_CALLS_PER_REQUEST: u32 = 3;

/// Largest `per_page` the upstream path can honour.
pub const UPSTREAM_MAX_PER_PAGE: u32 = UPSTREAM_PAGE_SIZE * MAX_CALLS_PER_REQUEST;

/// One page as served by the upstream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpstreamPage {
    pub items: Vec<UpstreamItem>,
    /// Upstream's estimate of the total number of matches.
    pub total_results: Option<u64>,
}

/// A single bounded call against the upstream search API.
///
/// Credentials are passed per call so one client serves both the primary
/// and the per-type secondary configuration.
#[async_trait]
pub trait UpstreamSearch: Send + Sync {
    /// Fetch up to [`UPSTREAM_PAGE_SIZE`] items starting at the 1-based `start`.
    async fn search_page(
        &self,
        credentials: &UpstreamCredentials,
        query: &str,
        start: u32,
    ) -> UpstreamResult<UpstreamPage>;
}
