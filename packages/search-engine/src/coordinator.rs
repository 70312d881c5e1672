//! The public search façade.
//!
//! ```text
//! search(query)
//!   ├─ blank keywords ─────────────────────────────► empty_query
//!   ├─ cache hit (unless force_refresh) ───────────► cache
//!   └─ miss ─► route
//!        ├─ Scrape:   orchestrator ─► pipeline ─► cache ─► fresh:scraper
//!        │              └─ empty / all failed ─► upstream once ─► fallback:upstream
//!        └─ Upstream: primary ─► fresh:upstream
//!                       └─ missing / failed / empty ─► secondary ─► fallback:upstream-secondary
//! ```
//!
//! Every path ends in a well-formed [`SearchResponse`]; no error crosses
//! this boundary.

use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::cache::{NoopCache, ResultCache};
use crate::error::UpstreamError;
use crate::pipeline::{format_page, paginate, window_meta, Orchestrator, ResultPipeline};
use crate::security::{UpstreamCredentialSet, UpstreamCredentials};
use crate::sources::{PolitenessPolicy, SiteRateLimiter, SourceRegistry};
use crate::types::config::{EngineConfig, Route};
use crate::types::query::{QueryType, SearchQuery, DEFAULT_PER_PAGE};
use crate::types::record::{FetchedRecord, RawRecord};
use crate::types::response::{Origin, Provenance, SearchResponse};
use crate::types::result::{CachePayload, CanonicalResult};
use crate::upstream::{PaginatedClient, UpstreamSearch, UpstreamWindow, UPSTREAM_MAX_PER_PAGE};

/// Cache key for one upstream window.
pub fn window_key(fingerprint: &str, page: u32, per_page: u32) -> String {
    format!("{}:p{}:n{}", fingerprint, page, per_page)
}

/// Text sent to the upstream search API.
pub fn upstream_query_text(query: &SearchQuery) -> String {
    let hint = match query.query_type() {
        QueryType::Jobs => "jobs hiring",
        QueryType::Housing => "housing rentals",
        QueryType::Services => "reentry services",
        QueryType::General => "",
    };
    [query.keywords(), hint, query.location()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Outcome of one upstream attempt, already canonicalized.
struct UpstreamAttempt {
    results: Vec<CanonicalResult>,
    estimate: u64,
    error: Option<String>,
}

/// Answers search queries from the cache, the scrapers or the upstream API.
///
/// Build with [`SearchCoordinator::builder`]. Safe to share behind an `Arc`;
/// only the cache is mutable shared state.
pub struct SearchCoordinator {
    cache: Arc<dyn ResultCache>,
    registry: SourceRegistry,
    orchestrator: Orchestrator,
    upstream: Option<PaginatedClient>,
    credentials: UpstreamCredentialSet,
    pipeline: ResultPipeline,
    config: EngineConfig,
}

impl SearchCoordinator {
    pub fn builder() -> SearchCoordinatorBuilder {
        SearchCoordinatorBuilder::default()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Search with the default page (1) and page size (10).
    pub async fn search_for(&self, keywords: &str, location: &str, query_type: QueryType) -> SearchResponse {
        let query = SearchQuery::builder(keywords, query_type)
            .location(location)
            .per_page(DEFAULT_PER_PAGE)
            .build();
        self.search(&query).await
    }

    /// Answer one query.
    #[instrument(skip_all, fields(
        query_type = %query.query_type(),
        page = query.page(),
        per_page = query.per_page(),
        force_refresh = query.force_refresh(),
    ))]
    pub async fn search(&self, query: &SearchQuery) -> SearchResponse {
        if query.is_blank() {
            debug!("Blank keywords, nothing to dispatch");
            return SearchResponse::empty_query(query.page(), query.per_page());
        }

        match self.config.route_for(query.query_type()) {
            Route::Scrape => self.search_scraped(query).await,
            Route::Upstream => {
                let query = query.with_per_page(query.per_page().min(UPSTREAM_MAX_PER_PAGE));
                self.search_upstream(&query).await
            }
        }
    }

    /// Drop the cached list for a query, if any.
    pub async fn invalidate(&self, query: &SearchQuery) {
        let fingerprint = query.fingerprint();
        if let Err(e) = self.cache.invalidate(&fingerprint).await {
            warn!(error = %e, "Failed to invalidate cache entry");
        }
    }

    /// Housekeeping: remove expired cache entries.
    pub async fn purge_expired(&self) -> usize {
        match self.cache.purge_expired().await {
            Ok(removed) => {
                debug!(removed, "Purged expired cache entries");
                removed
            }
            Err(e) => {
                warn!(error = %e, "Failed to purge expired cache entries");
                0
            }
        }
    }

    async fn search_scraped(&self, query: &SearchQuery) -> SearchResponse {
        let fingerprint = query.fingerprint();

        if !query.force_refresh() {
            if let Some(entry) = self.cache.get(&fingerprint).await {
                info!(cached = entry.payload.len(), "Cache hit");
                let (results, pagination) = format_page(&entry.payload, query.page(), query.per_page());
                return SearchResponse::ok(results, pagination, Provenance::Cache);
            }
        }

        let adapters = self.registry.select(query);
        let run = self
            .orchestrator
            .run_all(
                query.keywords(),
                query.location(),
                &adapters,
                self.config.per_source_timeout(),
                self.config.batch_timeout(),
            )
            .await;

        let all_failed = run.all_failed();
        let failure_summary = run.failure_summary();
        let ranked = self.pipeline.process(run.records, query);

        if ranked.is_empty() {
            let reason = if adapters.is_empty() {
                "no sources available for this query".to_string()
            } else if all_failed {
                format!("all sources failed: {}", failure_summary)
            } else {
                "sources returned no results".to_string()
            };
            info!(reason = %reason, "Scraper path produced nothing");
            return self.scrape_fallback(query, all_failed || adapters.is_empty(), reason).await;
        }

        self.store(&fingerprint, CachePayload::exact(ranked.clone())).await;

        let (results, pagination) = format_page(&ranked, query.page(), query.per_page());
        info!(total = ranked.len(), returned = results.len(), "Scraper search complete");
        SearchResponse::ok(results, pagination, Provenance::Fresh(Origin::Scraper))
    }

    /// One upstream attempt after the scraper path came back empty.
    ///
    /// Uses the type's secondary credentials, else the primary ones.
    async fn scrape_fallback(&self, query: &SearchQuery, failed: bool, reason: String) -> SearchResponse {
        let query = query.with_per_page(query.per_page().min(UPSTREAM_MAX_PER_PAGE));
        let credentials = self
            .credentials
            .secondary_for(query.query_type())
            .or(self.credentials.primary.as_ref());

        let attempt = match (&self.upstream, credentials) {
            (Some(client), Some(credentials)) => Some(self.attempt_upstream(client, credentials, &query).await),
            _ => None,
        };

        let attempt = attempt.map(|mut attempt| {
            if query.domain_filter_only() {
                attempt.results = self.pipeline.retain_suitable(attempt.results);
            }
            attempt
        });

        match attempt {
            Some(attempt) if !attempt.results.is_empty() => {
                info!(returned = attempt.results.len(), "Upstream fallback produced results");
                let pagination = window_meta(attempt.estimate, query.page(), query.per_page(), attempt.results.len());
                SearchResponse::ok(attempt.results, pagination, Provenance::Fallback(Origin::Upstream))
            }
            Some(UpstreamAttempt { error: Some(e), .. }) if failed => SearchResponse::failure(
                query.page(),
                query.per_page(),
                Provenance::Error,
                format!("{}; upstream fallback failed: {}", reason, e),
            ),
            _ if failed => SearchResponse::failure(query.page(), query.per_page(), Provenance::Error, reason),
            _ => SearchResponse::ok(
                Vec::new(),
                paginate(0, query.page(), query.per_page(), false),
                Provenance::Fresh(Origin::Scraper),
            ),
        }
    }

    async fn search_upstream(&self, query: &SearchQuery) -> SearchResponse {
        let key = window_key(&query.fingerprint(), query.page(), query.per_page());

        if !query.force_refresh() {
            if let Some(entry) = self.cache.get(&key).await {
                info!(cached = entry.payload.len(), "Cache hit");
                let pagination = window_meta(
                    entry.total_estimate.unwrap_or(0),
                    query.page(),
                    query.per_page(),
                    entry.payload.len(),
                );
                return SearchResponse::ok(entry.payload, pagination, Provenance::Cache);
            }
        }

        let primary = self.credentials.primary.as_ref();
        let secondary = self.credentials.secondary_for(query.query_type());

        let client = match &self.upstream {
            Some(client) if !self.credentials.is_missing_for(query.query_type()) => client,
            _ => {
                warn!("No upstream credentials for this query type");
                return SearchResponse::failure(
                    query.page(),
                    query.per_page(),
                    Provenance::ConfigMissing,
                    UpstreamError::ConfigMissing.to_string(),
                );
            }
        };

        let mut errors = Vec::new();
        let mut last_origin = Origin::Upstream;
        let mut last_estimate = 0;

        let attempts = [
            primary.map(|c| (c, Origin::Upstream)),
            secondary.map(|c| (c, Origin::UpstreamSecondary)),
        ];

        for (credentials, origin) in attempts.into_iter().flatten() {
            let attempt = self.attempt_upstream(client, credentials, query).await;

            if !attempt.results.is_empty() {
                if attempt.error.is_none() {
                    self.store(&key, CachePayload::estimated(attempt.results.clone(), attempt.estimate))
                        .await;
                }
                let provenance = match origin {
                    Origin::Upstream => Provenance::Fresh(origin),
                    _ => Provenance::Fallback(origin),
                };
                let pagination = window_meta(attempt.estimate, query.page(), query.per_page(), attempt.results.len());
                info!(source = %provenance, returned = attempt.results.len(), "Upstream search complete");
                return SearchResponse::ok(attempt.results, pagination, provenance);
            }

            if let Some(e) = attempt.error {
                errors.push(format!("{}: {}", origin.as_str(), e));
            }
            last_origin = origin;
            last_estimate = attempt.estimate;
        }

        if errors.is_empty() {
            // Nothing matched, or the page lies beyond the upstream's range
            let pagination = window_meta(last_estimate, query.page(), query.per_page(), 0);
            let provenance = match last_origin {
                Origin::Upstream => Provenance::Fresh(last_origin),
                _ => Provenance::Fallback(last_origin),
            };
            return SearchResponse::ok(Vec::new(), pagination, provenance);
        }

        SearchResponse::failure(query.page(), query.per_page(), Provenance::Error, errors.join("; "))
    }

    async fn attempt_upstream(
        &self,
        client: &PaginatedClient,
        credentials: &UpstreamCredentials,
        query: &SearchQuery,
    ) -> UpstreamAttempt {
        let text = upstream_query_text(query);
        let UpstreamWindow {
            items,
            total_results_estimate,
            error,
            ..
        } = client
            .fetch_window(credentials, &text, query.page(), query.per_page())
            .await;

        let records = items
            .into_iter()
            .map(|item| FetchedRecord::new(RawRecord::Upstream(item)))
            .collect();

        UpstreamAttempt {
            results: self.pipeline.annotate(records, query),
            estimate: total_results_estimate,
            error,
        }
    }

    async fn store(&self, key: &str, payload: CachePayload) {
        if let Err(e) = self.cache.put(key, payload, self.config.cache_ttl()).await {
            warn!(error = %e, "Failed to write cache entry");
        }
    }
}

/// Builder for [`SearchCoordinator`].
#[derive(Default)]
pub struct SearchCoordinatorBuilder {
    cache: Option<Arc<dyn ResultCache>>,
    registry: Option<SourceRegistry>,
    politeness: Option<Arc<dyn PolitenessPolicy>>,
    upstream: Option<Arc<dyn UpstreamSearch>>,
    credentials: UpstreamCredentialSet,
    config: EngineConfig,
}

impl SearchCoordinatorBuilder {
    pub fn cache(mut self, cache: Arc<dyn ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn registry(mut self, registry: SourceRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Defaults to a per-site rate limiter using the configured delay.
    pub fn politeness(mut self, politeness: Arc<dyn PolitenessPolicy>) -> Self {
        self.politeness = Some(politeness);
        self
    }

    pub fn upstream(mut self, upstream: Arc<dyn UpstreamSearch>) -> Self {
        self.upstream = Some(upstream);
        self
    }

    pub fn credentials(mut self, credentials: UpstreamCredentialSet) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> SearchCoordinator {
        let politeness = self
            .politeness
            .unwrap_or_else(|| Arc::new(SiteRateLimiter::new(self.config.politeness_delay())));

        SearchCoordinator {
            cache: self.cache.unwrap_or_else(|| Arc::new(NoopCache)),
            registry: self.registry.unwrap_or_default(),
            orchestrator: Orchestrator::new(politeness),
            upstream: self
                .upstream
                .map(|u| PaginatedClient::new(u, self.config.upstream_call_timeout())),
            credentials: self.credentials,
            pipeline: ResultPipeline::new(self.config.scoring.clone()),
            config: self.config,
        }
    }
}
