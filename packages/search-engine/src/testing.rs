//! Testing utilities including mock implementations.
//!
//! These let callers exercise the coordinator and the pipeline without
//! touching the network: scripted source adapters, a scripted upstream, and a
//! politeness policy that records instead of sleeping.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashSet};
use std::sync::RwLock;
use std::time::Duration;

use crate::error::{SourceError, SourceResult, UpstreamError, UpstreamResult};
use crate::security::UpstreamCredentials;
use crate::sources::{PolitenessPolicy, SourceAdapter};
use crate::types::query::SourceId;
use crate::types::record::{
    CraigslistPosting, DiceJob, IndeedListing, RawRecord, SimplyHiredListing, UpstreamItem,
    UsaJobsPosition,
};
use crate::types::result::CanonicalResult;
use crate::upstream::{UpstreamPage, UpstreamSearch, UPSTREAM_PAGE_SIZE};

fn non_empty(s: &str) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// A canonical result with placeholder text, as an Indeed listing.
pub fn canonical(title: &str, provider: &str) -> CanonicalResult {
    CanonicalResult {
        title: title.to_string(),
        provider: provider.to_string(),
        location: "Location not listed".to_string(),
        compensation_text: "Not specified".to_string(),
        description: "No description provided".to_string(),
        source_url: format!("https://example.com/{}", title.replace(' ', "-")),
        external_id: "indeed:test".to_string(),
        source_name: "Indeed".to_string(),
        scraped_at: Utc::now(),
        relevance_score: 0.0,
        domain_score: 50,
        metadata: BTreeMap::new(),
    }
}

/// A raw record for `source` with the given title, employer and description.
///
/// Fields a source has no slot for are dropped (Craigslist has no employer
/// or description).
pub fn listing(source: SourceId, title: &str, company: &str, description: &str) -> RawRecord {
    let id = Some(format!("{}-{}", title.to_lowercase().replace(' ', "-"), company.to_lowercase().replace(' ', "-")));
    match source {
        SourceId::Indeed => RawRecord::Indeed(IndeedListing {
            job_key: id,
            title: non_empty(title),
            company: non_empty(company),
            snippet: non_empty(description),
            ..Default::default()
        }),
        SourceId::SimplyHired => RawRecord::SimplyHired(SimplyHiredListing {
            job_key: id,
            title: non_empty(title),
            company: non_empty(company),
            snippet: non_empty(description),
            ..Default::default()
        }),
        SourceId::Dice => RawRecord::Dice(DiceJob {
            id,
            title: non_empty(title),
            company_name: non_empty(company),
            summary: non_empty(description),
            ..Default::default()
        }),
        SourceId::UsaJobs => RawRecord::UsaJobs(UsaJobsPosition {
            position_id: id,
            title: non_empty(title),
            organization: non_empty(company),
            summary: non_empty(description),
            ..Default::default()
        }),
        SourceId::Craigslist => RawRecord::Craigslist(CraigslistPosting {
            post_id: id,
            title: non_empty(title),
            region: "losangeles".to_string(),
            ..Default::default()
        }),
        SourceId::Upstream => RawRecord::Upstream(UpstreamItem {
            title: non_empty(title),
            link: id.map(|i| format!("https://{}/{}", company, i)),
            snippet: non_empty(description),
            display_link: non_empty(company),
        }),
    }
}

/// A scripted source adapter.
pub struct MockSource {
    id: SourceId,
    site: String,
    records: Vec<RawRecord>,
    failure: Option<String>,
    delay: Option<Duration>,
    calls: RwLock<Vec<(String, String)>>,
}

impl MockSource {
    /// An adapter that answers with nothing.
    pub fn new(id: SourceId) -> Self {
        Self {
            id,
            site: format!("{}.test", id.as_str()),
            records: Vec::new(),
            failure: None,
            delay: None,
            calls: RwLock::new(Vec::new()),
        }
    }

    pub fn with_records(mut self, records: Vec<RawRecord>) -> Self {
        self.records = records;
        self
    }

    /// Fail every fetch with a parse error carrying `reason`.
    pub fn failing(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(reason.into());
        self
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.site = site.into();
        self
    }

    /// `(keywords, location)` pairs this adapter was called with.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.read().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().map(|c| c.len()).unwrap_or_default()
    }
}

#[async_trait]
impl SourceAdapter for MockSource {
    fn id(&self) -> SourceId {
        self.id
    }

    fn site(&self) -> &str {
        &self.site
    }

    async fn fetch(&self, keywords: &str, location: &str) -> SourceResult<Vec<RawRecord>> {
        if let Ok(mut calls) = self.calls.write() {
            calls.push((keywords.to_string(), location.to_string()));
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.failure {
            Some(reason) => Err(SourceError::Parse {
                source_id: self.id,
                reason: reason.clone(),
            }),
            None => Ok(self.records.clone()),
        }
    }
}

/// Record of a call made to the mock upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamCall {
    pub engine_id: String,
    pub query: String,
    pub start: u32,
}

/// An upstream serving `total` numbered items, 10 per call.
///
/// Item `n` is titled `"Result n"` and links to `https://example.com/n`.
pub struct MockUpstream {
    total: u64,
    failing_starts: HashSet<u32>,
    failing_engines: HashSet<String>,
    delay: Option<Duration>,
    calls: RwLock<Vec<UpstreamCall>>,
}

impl MockUpstream {
    pub fn with_total(total: u64) -> Self {
        Self {
            total,
            failing_starts: HashSet::new(),
            failing_engines: HashSet::new(),
            delay: None,
            calls: RwLock::new(Vec::new()),
        }
    }

    /// Answer HTTP 500 for calls at `start`.
    pub fn failing_at(mut self, start: u32) -> Self {
        self.failing_starts.insert(start);
        self
    }

    /// Answer HTTP 403 for every call made with this engine id.
    pub fn failing_for_engine(mut self, engine_id: impl Into<String>) -> Self {
        self.failing_engines.insert(engine_id.into());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<UpstreamCall> {
        self.calls.read().map(|c| c.clone()).unwrap_or_default()
    }

    /// Start offsets requested, in call order.
    pub fn starts(&self) -> Vec<u32> {
        self.calls().into_iter().map(|c| c.start).collect()
    }
}

#[async_trait]
impl UpstreamSearch for MockUpstream {
    async fn search_page(
        &self,
        credentials: &UpstreamCredentials,
        query: &str,
        start: u32,
    ) -> UpstreamResult<UpstreamPage> {
        if let Ok(mut calls) = self.calls.write() {
            calls.push(UpstreamCall {
                engine_id: credentials.engine_id.clone(),
                query: query.to_string(),
                start,
            });
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing_engines.contains(&credentials.engine_id) {
            return Err(UpstreamError::Status { status: 403 });
        }
        if self.failing_starts.contains(&start) {
            return Err(UpstreamError::Status { status: 500 });
        }

        let first = u64::from(start);
        let last = (first + u64::from(UPSTREAM_PAGE_SIZE) - 1).min(self.total);
        let items = (first..=last)
            .map(|n| UpstreamItem {
                title: Some(format!("Result {}", n)),
                link: Some(format!("https://example.com/{}", n)),
                snippet: Some(format!("Snippet for {}", query)),
                display_link: Some("example.com".to_string()),
            })
            .collect();

        Ok(UpstreamPage {
            items,
            total_results: Some(self.total),
        })
    }
}

/// Politeness policy that records which sites asked for a turn.
#[derive(Default)]
pub struct RecordingPoliteness {
    sites: RwLock<Vec<String>>,
}

impl RecordingPoliteness {
    pub fn sites(&self) -> Vec<String> {
        self.sites.read().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PolitenessPolicy for RecordingPoliteness {
    async fn wait_turn(&self, site: &str) {
        if let Ok(mut sites) = self.sites.write() {
            sites.push(site.to_string());
        }
    }
}
