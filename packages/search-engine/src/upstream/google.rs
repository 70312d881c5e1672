//! Google Programmable Search (Custom Search JSON API) client.
//!
//! Serves 10 results per call, `start` between 1 and 100.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{UpstreamPage, UpstreamSearch, UPSTREAM_MAX_START, UPSTREAM_PAGE_SIZE};
use crate::error::{UpstreamError, UpstreamResult};
use crate::security::UpstreamCredentials;
use crate::types::record::UpstreamItem;

const DEFAULT_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// Custom Search API response.
#[derive(Debug, Deserialize)]
struct CseResponse {
    #[serde(default)]
    items: Vec<CseItem>,
    #[serde(rename = "searchInformation")]
    search_information: Option<SearchInformation>,
}

#[derive(Debug, Deserialize)]
struct SearchInformation {
    /// Reported as a decimal string.
    #[serde(rename = "totalResults")]
    total_results: Option<String>,
}

/// A single Custom Search result.
#[derive(Debug, Deserialize)]
struct CseItem {
    title: Option<String>,
    link: Option<String>,
    snippet: Option<String>,
    #[serde(rename = "displayLink")]
    display_link: Option<String>,
}

/// Upstream client for the Custom Search JSON API.
pub struct GoogleSearchClient {
    client: reqwest::Client,
    endpoint: String,
}

impl GoogleSearchClient {
    /// Create a client whose calls time out after `call_timeout`.
    pub fn new(call_timeout: Duration) -> UpstreamResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(call_timeout)
            .build()
            .map_err(|e| UpstreamError::Http(Box::new(e)))?;

        Ok(Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        })
    }

    /// Point the client at a different endpoint (e.g. a local stub).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl UpstreamSearch for GoogleSearchClient {
    async fn search_page(
        &self,
        credentials: &UpstreamCredentials,
        query: &str,
        start: u32,
    ) -> UpstreamResult<UpstreamPage> {
        if !credentials.is_complete() {
            return Err(UpstreamError::ConfigMissing);
        }
        if start == 0 || start > UPSTREAM_MAX_START {
            return Err(UpstreamError::OffsetOutOfRange { start });
        }

        debug!(start, "Upstream search call");
        let num = UPSTREAM_PAGE_SIZE.to_string();
        let start_param = start.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", credentials.api_key.expose()),
                ("cx", credentials.engine_id.as_str()),
                ("q", query),
                ("start", start_param.as_str()),
                ("num", num.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, start, "Upstream search returned error status");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        parse_response(&body)
    }
}

/// Parse a Custom Search response body.
pub fn parse_response(body: &str) -> UpstreamResult<UpstreamPage> {
    let response: CseResponse =
        serde_json::from_str(body).map_err(|e| UpstreamError::MalformedPayload(e.to_string()))?;

    let total_results = response
        .search_information
        .and_then(|info| info.total_results)
        .and_then(|total| total.trim().parse::<u64>().ok());

    let items = response
        .items
        .into_iter()
        .map(|item| UpstreamItem {
            title: item.title,
            link: item.link,
            snippet: item.snippet,
            display_link: item.display_link,
        })
        .collect();

    Ok(UpstreamPage {
        items,
        total_results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response() {
        let body = r#"{
            "searchInformation": {"totalResults": "237"},
            "items": [
                {"title": "Warehouse Associate", "link": "https://example.com/a", "snippet": "Pick and pack", "displayLink": "example.com"},
                {"title": "Forklift Operator", "link": "https://example.com/b"}
            ]
        }"#;

        let page = parse_response(body).unwrap();
        assert_eq!(page.total_results, Some(237));
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].display_link.as_deref(), Some("example.com"));
        assert_eq!(page.items[1].snippet, None);
    }

    #[test]
    fn test_parse_response_without_items() {
        let page = parse_response(r#"{"searchInformation": {"totalResults": "0"}}"#).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_results, Some(0));
    }

    #[test]
    fn test_parse_malformed_payload() {
        let err = parse_response("<html>quota exceeded</html>").unwrap_err();
        assert!(matches!(err, UpstreamError::MalformedPayload(_)));
    }

    #[tokio::test]
    async fn test_rejects_offset_beyond_cap() {
        let client = GoogleSearchClient::new(Duration::from_secs(1)).unwrap();
        let creds = UpstreamCredentials::new("key", "cx");
        let err = client.search_page(&creds, "cook", 101).await.unwrap_err();
        assert!(matches!(err, UpstreamError::OffsetOutOfRange { start: 101 }));
    }

    #[tokio::test]
    async fn test_blank_credentials_are_config_missing() {
        let client = GoogleSearchClient::new(Duration::from_secs(1)).unwrap();
        let creds = UpstreamCredentials::new(" ", "cx");
        let err = client.search_page(&creds, "cook", 1).await.unwrap_err();
        assert!(matches!(err, UpstreamError::ConfigMissing));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_http_error() {
        let client = GoogleSearchClient::new(Duration::from_secs(2))
            .unwrap()
            .with_endpoint("http://127.0.0.1:1/customsearch/v1");
        let creds = UpstreamCredentials::new("key", "cx");

        let err = client.search_page(&creds, "cook", 1).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Http(_) | UpstreamError::Timeout));
    }

    #[tokio::test]
    #[ignore]
    async fn test_live_search() {
        let key = std::env::var("GOOGLE_SEARCH_API_KEY").expect("GOOGLE_SEARCH_API_KEY required");
        let cx = std::env::var("GOOGLE_SEARCH_ENGINE_ID").expect("GOOGLE_SEARCH_ENGINE_ID required");
        let client = GoogleSearchClient::new(Duration::from_secs(10)).unwrap();

        let page = client
            .search_page(&UpstreamCredentials::new(key, cx), "warehouse jobs Los Angeles", 1)
            .await
            .unwrap();
        assert!(!page.items.is_empty());
    }
}
