//! Dice technology job board adapter (JSON search API).

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::http::{clean, fetch_text};
use super::SourceAdapter;
use crate::error::{SourceError, SourceResult};
use crate::security::SecretString;
use crate::types::query::SourceId;
use crate::types::record::{DiceJob, RawRecord};

const ENDPOINT: &str = "https://job-search-api.svc.dhigroupinc.com/v1/dice/jobs/search";
const SITE: &str = "job-search-api.svc.dhigroupinc.com";
const PAGE_SIZE: &str = "20";

#[derive(Debug, Deserialize)]
struct DiceResponse {
    #[serde(default)]
    data: Vec<DiceHit>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiceHit {
    id: Option<String>,
    title: Option<String>,
    company_name: Option<String>,
    job_location: Option<DiceLocation>,
    salary: Option<String>,
    summary: Option<String>,
    details_page_url: Option<String>,
    posted_date: Option<String>,
    employment_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiceLocation {
    display_name: Option<String>,
}

pub struct DiceAdapter {
    client: reqwest::Client,
    api_key: Option<SecretString>,
}

impl DiceAdapter {
    pub fn new(client: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()).map(SecretString::new),
        }
    }
}

#[async_trait]
impl SourceAdapter for DiceAdapter {
    fn id(&self) -> SourceId {
        SourceId::Dice
    }

    fn site(&self) -> &str {
        SITE
    }

    async fn fetch(&self, keywords: &str, location: &str) -> SourceResult<Vec<RawRecord>> {
        let api_key = self.api_key.as_ref().ok_or_else(|| SourceError::ConfigMissing {
            source_id: SourceId::Dice,
            reason: "DICE_API_KEY not set".to_string(),
        })?;

        let request = self
            .client
            .get(ENDPOINT)
            .header("x-api-key", api_key.expose())
            .query(&[
                ("q", keywords),
                ("location", location),
                ("countryCode2", "US"),
                ("pageSize", PAGE_SIZE),
            ]);

        let body = fetch_text(SourceId::Dice, request).await?;
        let jobs = parse_jobs(&body)?;
        debug!(count = jobs.len(), "Parsed Dice jobs");

        Ok(jobs.into_iter().map(RawRecord::Dice).collect())
    }
}

/// Parse a Dice search response body.
pub fn parse_jobs(body: &str) -> SourceResult<Vec<DiceJob>> {
    let response: DiceResponse = serde_json::from_str(body).map_err(|e| SourceError::Parse {
        source_id: SourceId::Dice,
        reason: e.to_string(),
    })?;

    Ok(response
        .data
        .into_iter()
        .map(|hit| DiceJob {
            id: hit.id,
            title: hit.title.and_then(clean),
            company_name: hit.company_name.and_then(clean),
            location: hit.job_location.and_then(|l| l.display_name).and_then(clean),
            salary: hit.salary.and_then(clean),
            summary: hit.summary.and_then(clean),
            details_url: hit.details_page_url,
            posted_date: hit.posted_date,
            employment_type: hit.employment_type,
        })
        .filter(|job| job.title.is_some())
        .collect())
}
