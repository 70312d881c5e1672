//! USAJOBS federal listings adapter.
//!
//! The API needs an `Authorization-Key` plus a contact address in the
//! `User-Agent`. Without a key the adapter fails softly with
//! `SourceError::ConfigMissing` and the rest of the batch carries on.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::http::{clean, fetch_text};
use super::SourceAdapter;
use crate::error::{SourceError, SourceResult};
use crate::security::SecretString;
use crate::types::query::SourceId;
use crate::types::record::{RawRecord, UsaJobsPosition};

const ENDPOINT: &str = "https://data.usajobs.gov/api/search";
const SITE: &str = "data.usajobs.gov";
const RESULTS_PER_PAGE: &str = "25";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct UsaJobsResponse {
    search_result: SearchResult,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SearchResult {
    #[serde(default)]
    search_result_items: Vec<SearchResultItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SearchResultItem {
    matched_object_descriptor: Descriptor,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Descriptor {
    #[serde(rename = "PositionID")]
    position_id: Option<String>,
    position_title: Option<String>,
    #[serde(rename = "PositionURI")]
    position_uri: Option<String>,
    organization_name: Option<String>,
    department_name: Option<String>,
    position_location_display: Option<String>,
    #[serde(default)]
    position_remuneration: Vec<Remuneration>,
    application_close_date: Option<String>,
    user_area: Option<UserArea>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Remuneration {
    minimum_range: Option<String>,
    maximum_range: Option<String>,
    rate_interval_code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct UserArea {
    details: Option<Details>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Details {
    job_summary: Option<String>,
}

pub struct UsaJobsAdapter {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    user_agent: String,
}

impl UsaJobsAdapter {
    /// `user_agent` must be the contact email registered with the key.
    pub fn new(client: reqwest::Client, api_key: Option<String>, user_agent: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()).map(SecretString::new),
            user_agent: user_agent.into(),
        }
    }
}

#[async_trait]
impl SourceAdapter for UsaJobsAdapter {
    fn id(&self) -> SourceId {
        SourceId::UsaJobs
    }

    fn site(&self) -> &str {
        SITE
    }

    async fn fetch(&self, keywords: &str, location: &str) -> SourceResult<Vec<RawRecord>> {
        let api_key = self.api_key.as_ref().ok_or_else(|| SourceError::ConfigMissing {
            source_id: SourceId::UsaJobs,
            reason: "USAJOBS_API_KEY not set".to_string(),
        })?;

        let mut params = vec![("Keyword", keywords), ("ResultsPerPage", RESULTS_PER_PAGE)];
        if !location.is_empty() {
            params.push(("LocationName", location));
        }

        let request = self
            .client
            .get(ENDPOINT)
            .header("Host", SITE)
            .header("User-Agent", self.user_agent.as_str())
            .header("Authorization-Key", api_key.expose())
            .query(&params);

        let body = fetch_text(SourceId::UsaJobs, request).await?;
        let positions = parse_positions(&body)?;
        debug!(count = positions.len(), "Parsed USAJOBS positions");

        Ok(positions.into_iter().map(RawRecord::UsaJobs).collect())
    }
}

/// Parse a USAJOBS search response body.
pub fn parse_positions(body: &str) -> SourceResult<Vec<UsaJobsPosition>> {
    let response: UsaJobsResponse = serde_json::from_str(body).map_err(|e| SourceError::Parse {
        source_id: SourceId::UsaJobs,
        reason: e.to_string(),
    })?;

    Ok(response
        .search_result
        .search_result_items
        .into_iter()
        .map(|item| {
            let d = item.matched_object_descriptor;
            let pay = d.position_remuneration.into_iter().next();
            let summary = d
                .user_area
                .and_then(|u| u.details)
                .and_then(|details| details.job_summary);

            UsaJobsPosition {
                position_id: d.position_id,
                title: d.position_title.and_then(clean),
                organization: d.organization_name.and_then(clean),
                department: d.department_name.and_then(clean),
                location: d.position_location_display.and_then(clean),
                pay_min: pay.as_ref().and_then(|p| p.minimum_range.clone()),
                pay_max: pay.as_ref().and_then(|p| p.maximum_range.clone()),
                pay_interval: pay.and_then(|p| p.rate_interval_code),
                summary: summary.and_then(clean),
                url: d.position_uri,
                close_date: d.application_close_date,
            }
        })
        .filter(|position| position.title.is_some())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "SearchResult": {
            "SearchResultCount": 1,
            "SearchResultItems": [{
                "MatchedObjectId": "7001",
                "MatchedObjectDescriptor": {
                    "PositionID": "VA-25-1234",
                    "PositionTitle": "Housekeeping Aid",
                    "PositionURI": "https://www.usajobs.gov/job/7001",
                    "OrganizationName": "Veterans Health Administration",
                    "DepartmentName": "Department of Veterans Affairs",
                    "PositionLocationDisplay": "Los Angeles, California",
                    "PositionRemuneration": [
                        {"MinimumRange": "18.12", "MaximumRange": "21.14", "RateIntervalCode": "PH"}
                    ],
                    "ApplicationCloseDate": "2026-11-01T23:59:59.9970",
                    "UserArea": {"Details": {"JobSummary": "Entry level custodial work."}}
                }
            }]
        }
    }"#;

    #[test]
    fn test_parse_positions() {
        let positions = parse_positions(FIXTURE).unwrap();
        assert_eq!(positions.len(), 1);

        let p = &positions[0];
        assert_eq!(p.position_id.as_deref(), Some("VA-25-1234"));
        assert_eq!(p.title.as_deref(), Some("Housekeeping Aid"));
        assert_eq!(p.organization.as_deref(), Some("Veterans Health Administration"));
        assert_eq!(p.pay_min.as_deref(), Some("18.12"));
        assert_eq!(p.pay_interval.as_deref(), Some("PH"));
        assert_eq!(p.summary.as_deref(), Some("Entry level custodial work."));
    }

    #[test]
    fn test_parse_without_items() {
        let positions = parse_positions(r#"{"SearchResult": {"SearchResultCount": 0}}"#).unwrap();
        assert!(positions.is_empty());
    }

    #[tokio::test]
    async fn test_missing_key_is_config_error() {
        let adapter = UsaJobsAdapter::new(reqwest::Client::new(), Some("  ".to_string()), "ops@example.org");
        let err = adapter.fetch("custodian", "Los Angeles, CA").await.unwrap_err();
        assert!(matches!(
            err,
            SourceError::ConfigMissing { source_id: SourceId::UsaJobs, .. }
        ));
    }
}
