//! Source-specific raw records.
//!
//! Each adapter produces its own listing struct; they are wrapped in
//! [`RawRecord`] and never leave the pipeline before canonicalization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::query::SourceId;

/// Job card scraped from an Indeed results page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndeedListing {
    pub job_key: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub snippet: Option<String>,
    pub url: Option<String>,
}

/// Job card scraped from a SimplyHired results page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimplyHiredListing {
    pub job_key: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary_estimate: Option<String>,
    pub snippet: Option<String>,
    pub url: Option<String>,
}

/// Job returned by the Dice search API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiceJob {
    pub id: Option<String>,
    pub title: Option<String>,
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub summary: Option<String>,
    pub details_url: Option<String>,
    pub posted_date: Option<String>,
    pub employment_type: Option<String>,
}

/// Position returned by the USAJOBS search API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsaJobsPosition {
    pub position_id: Option<String>,
    pub title: Option<String>,
    pub organization: Option<String>,
    pub department: Option<String>,
    pub location: Option<String>,
    pub pay_min: Option<String>,
    pub pay_max: Option<String>,
    pub pay_interval: Option<String>,
    pub summary: Option<String>,
    pub url: Option<String>,
    pub close_date: Option<String>,
}

/// Posting scraped from a Craigslist search page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CraigslistPosting {
    pub post_id: Option<String>,
    pub title: Option<String>,
    pub price: Option<String>,
    pub neighborhood: Option<String>,
    pub url: Option<String>,
    /// Craigslist region the search ran against.
    pub region: String,
}

/// Item returned by the upstream search API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpstreamItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub snippet: Option<String>,
    pub display_link: Option<String>,
}

/// A record as produced by exactly one origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "record", rename_all = "snake_case")]
pub enum RawRecord {
    Indeed(IndeedListing),
    SimplyHired(SimplyHiredListing),
    Dice(DiceJob),
    UsaJobs(UsaJobsPosition),
    Craigslist(CraigslistPosting),
    Upstream(UpstreamItem),
}

impl RawRecord {
    /// Origin of this record.
    pub fn source(&self) -> SourceId {
        match self {
            RawRecord::Indeed(_) => SourceId::Indeed,
            RawRecord::SimplyHired(_) => SourceId::SimplyHired,
            RawRecord::Dice(_) => SourceId::Dice,
            RawRecord::UsaJobs(_) => SourceId::UsaJobs,
            RawRecord::Craigslist(_) => SourceId::Craigslist,
            RawRecord::Upstream(_) => SourceId::Upstream,
        }
    }
}

/// A raw record plus the moment it was fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedRecord {
    pub record: RawRecord,
    pub fetched_at: DateTime<Utc>,
}

impl FetchedRecord {
    pub fn new(record: RawRecord) -> Self {
        Self {
            record,
            fetched_at: Utc::now(),
        }
    }

    pub fn source(&self) -> SourceId {
        self.record.source()
    }
}
