//! Source adapters: one per external listing site.
//!
//! Every adapter offers the same capability, `fetch(keywords, location)`,
//! and knows how to fetch and parse its own site only. Parsing lives in a
//! pure `parse_*` function per adapter so it can be tested offline.
//!
//! - `IndeedAdapter` - job board (HTML)
//! - `SimplyHiredAdapter` - job board (HTML)
//! - `DiceAdapter` - technology job board (JSON API)
//! - `UsaJobsAdapter` - federal listings (JSON API, needs a key)
//! - `CraigslistAdapter` - general classifieds, the catch-all (HTML)

use async_trait::async_trait;

use crate::error::SourceResult;
use crate::types::query::SourceId;
use crate::types::record::RawRecord;

pub mod craigslist;
pub mod dice;
pub mod http;
pub mod indeed;
pub mod politeness;
pub mod registry;
pub mod simplyhired;
pub mod usajobs;

pub use craigslist::CraigslistAdapter;
pub use dice::DiceAdapter;
pub use indeed::IndeedAdapter;
pub use politeness::{NoDelay, PolitenessPolicy, SiteRateLimiter};
pub use registry::SourceRegistry;
pub use simplyhired::SimplyHiredAdapter;
pub use usajobs::UsaJobsAdapter;

/// Fetches and parses raw listings from one external source.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Origin tag for records from this adapter.
    fn id(&self) -> SourceId;

    /// Physical site this adapter talks to; politeness is keyed on it.
    fn site(&self) -> &str;

    /// Fetch raw listings matching the keywords near the location.
    async fn fetch(&self, keywords: &str, location: &str) -> SourceResult<Vec<RawRecord>>;
}
