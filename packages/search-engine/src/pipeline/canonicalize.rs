//! RawRecord -> CanonicalResult.
//!
//! Pure mapping. Every text field of the output is non-empty: missing data
//! gets a placeholder. Scores are left at zero for the scorers to fill in.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::types::query::SourceId;
use crate::types::record::{
    CraigslistPosting, DiceJob, FetchedRecord, IndeedListing, RawRecord, SimplyHiredListing,
    UpstreamItem, UsaJobsPosition,
};
use crate::types::result::CanonicalResult;

pub const UNTITLED: &str = "Untitled listing";
pub const UNKNOWN_PROVIDER: &str = "Unknown employer";
pub const UNKNOWN_LOCATION: &str = "Location not listed";
pub const NOT_SPECIFIED: &str = "Not specified";
pub const NO_DESCRIPTION: &str = "No description provided";

/// Fields common to every origin, before defaults are applied.
#[derive(Default)]
struct Draft {
    title: Option<String>,
    provider: Option<String>,
    location: Option<String>,
    compensation: Option<String>,
    description: Option<String>,
    url: Option<String>,
    id: Option<String>,
    metadata: BTreeMap<String, Value>,
}

impl Draft {
    fn meta(mut self, key: &str, value: Option<String>) -> Self {
        if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
            self.metadata.insert(key.to_string(), Value::String(v));
        }
        self
    }
}

/// Map one fetched record into the canonical shape.
pub fn canonicalize(fetched: FetchedRecord) -> CanonicalResult {
    let source = fetched.source();
    let draft = match fetched.record {
        RawRecord::Indeed(r) => from_indeed(r),
        RawRecord::SimplyHired(r) => from_simplyhired(r),
        RawRecord::Dice(r) => from_dice(r),
        RawRecord::UsaJobs(r) => from_usajobs(r),
        RawRecord::Craigslist(r) => from_craigslist(r),
        RawRecord::Upstream(r) => from_upstream(r),
    };

    let external_id = format!(
        "{}:{}",
        source.as_str(),
        draft
            .id
            .clone()
            .or_else(|| draft.url.clone())
            .unwrap_or_else(|| "unknown".to_string())
    );

    CanonicalResult {
        title: or_placeholder(draft.title, UNTITLED),
        provider: or_placeholder(draft.provider, UNKNOWN_PROVIDER),
        location: or_placeholder(draft.location, UNKNOWN_LOCATION),
        compensation_text: or_placeholder(draft.compensation, NOT_SPECIFIED),
        description: or_placeholder(draft.description, NO_DESCRIPTION),
        source_url: or_placeholder(draft.url, NOT_SPECIFIED),
        external_id,
        source_name: source.display_name().to_string(),
        scraped_at: fetched.fetched_at,
        relevance_score: 0.0,
        domain_score: 0,
        metadata: draft.metadata,
    }
}

fn or_placeholder(value: Option<String>, placeholder: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| placeholder.to_string())
}

fn from_indeed(r: IndeedListing) -> Draft {
    Draft {
        title: r.title,
        provider: r.company,
        location: r.location,
        compensation: r.salary,
        description: r.snippet,
        url: r.url,
        id: r.job_key,
        ..Default::default()
    }
}

fn from_simplyhired(r: SimplyHiredListing) -> Draft {
    Draft {
        title: r.title,
        provider: r.company,
        location: r.location,
        compensation: r.salary_estimate,
        description: r.snippet,
        url: r.url,
        id: r.job_key,
        ..Default::default()
    }
}

fn from_dice(r: DiceJob) -> Draft {
    Draft {
        title: r.title,
        provider: r.company_name,
        location: r.location,
        compensation: r.salary,
        description: r.summary,
        url: r.details_url,
        id: r.id,
        ..Default::default()
    }
    .meta("postedDate", r.posted_date)
    .meta("employmentType", r.employment_type)
}

fn from_usajobs(r: UsaJobsPosition) -> Draft {
    let compensation = format_pay(r.pay_min.as_deref(), r.pay_max.as_deref(), r.pay_interval.as_deref());
    Draft {
        title: r.title,
        provider: r.organization.or_else(|| r.department.clone()),
        location: r.location,
        compensation,
        description: r.summary,
        url: r.url,
        id: r.position_id,
        ..Default::default()
    }
    .meta("department", r.department)
    .meta("closeDate", r.close_date)
}

fn from_craigslist(r: CraigslistPosting) -> Draft {
    Draft {
        title: r.title,
        provider: None,
        location: r.neighborhood.clone().or_else(|| Some(r.region.clone())),
        compensation: r.price,
        description: None,
        url: r.url,
        id: r.post_id,
        ..Default::default()
    }
    .meta("neighborhood", r.neighborhood)
    .meta("region", Some(r.region))
}

fn from_upstream(r: UpstreamItem) -> Draft {
    Draft {
        title: r.title,
        provider: r.display_link.clone(),
        location: None,
        compensation: None,
        description: r.snippet,
        url: r.link,
        id: None,
        ..Default::default()
    }
    .meta("displayLink", r.display_link)
}

/// `"$18.12 - $21.14 per hour"` from USAJOBS remuneration fields.
fn format_pay(min: Option<&str>, max: Option<&str>, interval: Option<&str>) -> Option<String> {
    let range = match (min, max) {
        (Some(lo), Some(hi)) if lo != hi => format!("${} - ${}", lo, hi),
        (Some(v), _) | (None, Some(v)) => format!("${}", v),
        (None, None) => return None,
    };

    let per = match interval {
        Some("PH") => " per hour",
        Some("PA") => " per year",
        Some("PD") => " per day",
        Some("BW") => " biweekly",
        Some("PW") => " per week",
        _ => "",
    };

    Some(format!("{}{}", range, per))
}

/// Identifier of the origin a canonical result came from.
pub fn origin_of(result: &CanonicalResult) -> Option<SourceId> {
    result
        .external_id
        .split_once(':')
        .and_then(|(prefix, _)| prefix.parse().ok())
}
