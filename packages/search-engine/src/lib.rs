//! Search Aggregation & Caching Engine
//!
//! Answers "find jobs / housing / services matching X near Y" for reentry
//! case managers by combining two backends behind one façade:
//!
//! - a concurrent multi-source scraper with relevance and suitability
//!   scoring, deduplication and a local result cache
//! - a paginated client for a rate-limited upstream search API that serves
//!   10 items per call and nothing past offset 100
//!
//! # Usage
//!
//! ```rust,ignore
//! use search_engine::{MemoryCache, QueryType, SearchCoordinator, SearchQuery, SourceRegistry};
//! use std::sync::Arc;
//!
//! let coordinator = SearchCoordinator::builder()
//!     .cache(Arc::new(MemoryCache::new()))
//!     .registry(SourceRegistry::with_defaults(client, keys))
//!     .build();
//!
//! let query = SearchQuery::builder("warehouse", QueryType::Jobs)
//!     .location("Los Angeles, CA")
//!     .build();
//! let response = coordinator.search(&query).await;
//! ```
//!
//! # Modules
//!
//! - [`coordinator`] - Public façade: cache, dispatch, fallback, format
//! - [`sources`] - Source adapters, selection and per-site politeness
//! - [`upstream`] - Upstream search client and window reconstruction
//! - [`pipeline`] - Orchestrator, canonicalizer, scorers, dedup, formatter
//! - [`cache`] - Result cache backends (memory, SQLite, no-op)
//! - [`types`] - Queries, records, results, responses and configuration
//! - [`security`] - Credential handling
//! - [`testing`] - Mock implementations for testing

pub mod cache;
pub mod coordinator;
pub mod error;
pub mod pipeline;
pub mod security;
pub mod sources;
pub mod testing;
pub mod types;
pub mod upstream;

// Re-export core types at crate root
pub use coordinator::{SearchCoordinator, SearchCoordinatorBuilder};
pub use error::{CacheError, SearchError, SourceError, UpstreamError};
pub use types::{
    config::{EngineConfig, Route, ScoringConfig},
    query::{QueryType, SearchQuery, SearchQueryBuilder, SourceId, DEFAULT_PER_PAGE, MAX_PER_PAGE},
    record::{FetchedRecord, RawRecord},
    response::{Origin, PaginationMeta, Provenance, SearchResponse},
    result::{CacheEntry, CachePayload, CanonicalResult},
};

// Re-export cache backends
pub use cache::{MemoryCache, NoopCache, ResultCache};

#[cfg(feature = "sqlite")]
pub use cache::SqliteCache;

// Re-export sources and upstream
pub use security::{SecretString, UpstreamCredentialSet, UpstreamCredentials};
pub use sources::{
    http::scraping_client, registry::SourceKeys, NoDelay, PolitenessPolicy, SiteRateLimiter,
    SourceAdapter, SourceRegistry,
};
pub use upstream::{GoogleSearchClient, PaginatedClient, UpstreamSearch, UpstreamWindow};

// Re-export pipeline components
pub use pipeline::{
    JaroWinkler, NormalizedLevenshtein, Orchestrator, OrchestratorRun, ResultPipeline, Similarity,
    SourceOutcome,
};

// Re-export testing utilities
pub use testing::{MockSource, MockUpstream, RecordingPoliteness};
