//! Shared HTTP plumbing for source adapters.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{SourceError, SourceResult};
use crate::types::query::SourceId;

/// Browser-like User-Agent; several boards refuse obvious bots.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Build the client every scraping adapter shares.
pub fn scraping_client(timeout: Duration) -> SourceResult<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,application/json;q=0.8,*/*;q=0.7",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(SourceError::from)
}

/// Send a request and return the body of a successful response.
pub async fn fetch_text(source_id: SourceId, request: reqwest::RequestBuilder) -> SourceResult<String> {
    let response = request.send().await.map_err(|e| {
        warn!(source = %source_id, error = %e, "HTTP request failed");
        request_error(source_id, e)
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Status {
            source_id,
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|e| request_error(source_id, e))?;
    debug!(source = %source_id, bytes = body.len(), "Fetched response body");
    Ok(body)
}

fn request_error(source_id: SourceId, e: reqwest::Error) -> SourceError {
    if e.is_timeout() {
        SourceError::Timeout { source_id }
    } else {
        SourceError::from(e)
    }
}

/// Trimmed, whitespace-collapsed text, `None` when empty.
pub(crate) fn clean(text: impl AsRef<str>) -> Option<String> {
    let collapsed = text
        .as_ref()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Text content of the first element matching `selector` under `element`.
pub(crate) fn select_text(element: &scraper::ElementRef<'_>, selector: &scraper::Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .and_then(|el| clean(el.text().collect::<Vec<_>>().join(" ")))
}

/// Attribute of the first element matching `selector` under `element`.
pub(crate) fn select_attr(
    element: &scraper::ElementRef<'_>,
    selector: &scraper::Selector,
    attr: &str,
) -> Option<String> {
    element
        .select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .and_then(clean)
}

/// Resolve a possibly relative `href` against the page it came from.
pub(crate) fn absolute_url(base: &str, href: &str) -> Option<String> {
    url::Url::parse(base)
        .and_then(|base| base.join(href))
        .map(String::from)
        .ok()
}

/// Parse a CSS selector known at compile time.
pub(crate) fn selector(css: &str, source_id: SourceId) -> SourceResult<scraper::Selector> {
    scraper::Selector::parse(css).map_err(|e| SourceError::Parse {
        source_id,
        reason: format!("bad selector '{}': {}", css, e),
    })
}
