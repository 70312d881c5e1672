//! Data model for the search engine.

pub mod config;
pub mod query;
pub mod record;
pub mod response;
pub mod result;

pub use config::{EngineConfig, Route, ScoringConfig};
pub use query::{QueryType, SearchQuery, SearchQueryBuilder, SourceId};
pub use record::{
    CraigslistPosting, DiceJob, FetchedRecord, IndeedListing, RawRecord, SimplyHiredListing,
    UpstreamItem, UsaJobsPosition,
};
pub use response::{Origin, PaginationMeta, Provenance, SearchResponse};
pub use result::{CacheEntry, CachePayload, CanonicalResult};
