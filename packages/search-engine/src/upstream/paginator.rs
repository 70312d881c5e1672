//! Window reconstruction over the upstream's 10-per-call pages.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{UpstreamSearch, MAX_CALLS_PER_REQUEST, UPSTREAM_MAX_START, UPSTREAM_PAGE_SIZE};
use crate::error::UpstreamError;
use crate::security::UpstreamCredentials;
use crate::types::record::UpstreamItem;

/// Items for one `(page, per_page)` window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpstreamWindow {
    pub items: Vec<UpstreamItem>,
    /// Upstream's total estimate, captured from the first call.
    pub total_results_estimate: u64,
    pub actual_returned: usize,
    /// Set when a call failed; `items` holds whatever was gathered before it.
    pub error: Option<String>,
}

impl UpstreamWindow {
    fn failed(error: &UpstreamError) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Default::default()
        }
    }

    /// True when nothing was returned, for whatever reason.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Upstream offsets a window may touch, in call order.
///
/// At most [`MAX_CALLS_PER_REQUEST`] offsets, none beyond [`UPSTREAM_MAX_START`].
/// Empty when the window lies wholly beyond the upstream's range.
pub fn planned_offsets(page: u32, per_page: u32) -> Vec<u32> {
    let page = u64::from(page.max(1));
    let per_page = u64::from(per_page.max(1));
    let page_size = u64::from(UPSTREAM_PAGE_SIZE);

    let start_index = (page - 1) * per_page + 1;
    let calls_needed = u64::from(MAX_CALLS_PER_REQUEST).min(per_page.div_ceil(page_size));

    (0..calls_needed)
        .map(|call_num| start_index + call_num * page_size)
        .take_while(|start| *start <= u64::from(UPSTREAM_MAX_START))
        .map(|start| start as u32)
        .collect()
}

/// Assembles arbitrary windows from sequential, bounded upstream calls.
///
/// Calls are never issued in parallel: they share the upstream's rate-limit
/// accounting.
pub struct PaginatedClient {
    upstream: Arc<dyn UpstreamSearch>,
    call_timeout: Duration,
}

impl PaginatedClient {
    pub fn new(upstream: Arc<dyn UpstreamSearch>, call_timeout: Duration) -> Self {
        Self {
            upstream,
            call_timeout,
        }
    }

    /// Fetch items `[(page-1)*per_page + 1, page*per_page]`.
    ///
    /// Never fails: errors are reported in [`UpstreamWindow::error`].
    pub async fn fetch_window(
        &self,
        credentials: &UpstreamCredentials,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> UpstreamWindow {
        let per_page = per_page.max(1) as usize;
        let offsets = planned_offsets(page, per_page as u32);

        if offsets.is_empty() {
            info!(page, per_page, "Requested page is beyond the upstream offset cap");
            return UpstreamWindow::default();
        }

        let mut window = UpstreamWindow::default();

        for (call_num, start) in offsets.into_iter().enumerate() {
            let result =
                match tokio::time::timeout(self.call_timeout, self.upstream.search_page(credentials, query, start))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(UpstreamError::Timeout),
                };

            let upstream_page = match result {
                Ok(upstream_page) => upstream_page,
                Err(e) if call_num == 0 => {
                    warn!(start, error = %e, "Upstream search failed");
                    return UpstreamWindow::failed(&e);
                }
                Err(e) => {
                    warn!(start, error = %e, collected = window.items.len(), "Upstream search failed mid-window, keeping partial results");
                    window.error = Some(e.to_string());
                    break;
                }
            };

            if call_num == 0 {
                window.total_results_estimate = upstream_page.total_results.unwrap_or(0);
            }

            let returned = upstream_page.items.len();
            debug!(start, returned, "Upstream page received");
            window.items.extend(upstream_page.items);

            if returned < UPSTREAM_PAGE_SIZE as usize {
                break;
            }
        }

        window.items.truncate(per_page);
        window.actual_returned = window.items.len();
        window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockUpstream;
    use proptest::prelude::*;

    fn creds() -> UpstreamCredentials {
        UpstreamCredentials::new("key", "cx")
    }

    #[test]
    fn test_planned_offsets() {
        assert_eq!(planned_offsets(1, 10), vec![1]);
        assert_eq!(planned_offsets(1, 25), vec![1, 11, 21]);
        assert_eq!(planned_offsets(2, 10), vec![11]);
        assert_eq!(planned_offsets(1, 40), vec![1, 11, 21]);
        assert_eq!(planned_offsets(4, 30), vec![91]);
        assert!(planned_offsets(11, 10).is_empty());
    }

    #[tokio::test]
    async fn test_per_page_25_issues_three_calls() {
        let upstream = Arc::new(MockUpstream::with_total(237));
        let client = PaginatedClient::new(upstream.clone(), Duration::from_secs(1));

        let window = client.fetch_window(&creds(), "warehouse", 1, 25).await;

        assert_eq!(upstream.starts(), vec![1, 11, 21]);
        assert_eq!(window.items.len(), 25);
        assert_eq!(window.actual_returned, 25);
        assert_eq!(window.total_results_estimate, 237);
        assert!(window.error.is_none());
    }

    #[tokio::test]
    async fn test_stops_early_at_end_of_results() {
        let upstream = Arc::new(MockUpstream::with_total(14));
        let client = PaginatedClient::new(upstream.clone(), Duration::from_secs(1));

        let window = client.fetch_window(&creds(), "cook", 1, 30).await;

        assert_eq!(upstream.starts(), vec![1, 11]);
        assert_eq!(window.items.len(), 14);
    }

    #[tokio::test]
    async fn test_page_beyond_cap_is_empty_not_error() {
        let upstream = Arc::new(MockUpstream::with_total(500));
        let client = PaginatedClient::new(upstream.clone(), Duration::from_secs(1));

        let window = client.fetch_window(&creds(), "cook", 12, 10).await;

        assert!(upstream.starts().is_empty());
        assert!(window.items.is_empty());
        assert!(window.error.is_none());
    }

    #[tokio::test]
    async fn test_window_straddling_cap_stops_at_cap() {
        let upstream = Arc::new(MockUpstream::with_total(500));
        let client = PaginatedClient::new(upstream.clone(), Duration::from_secs(1));

        // start index 91: calls at 91, then 101 is refused
        let window = client.fetch_window(&creds(), "cook", 4, 30).await;

        assert_eq!(upstream.starts(), vec![91]);
        assert_eq!(window.items.len(), 10);
    }

    #[tokio::test]
    async fn test_first_call_failure_returns_error_window() {
        let upstream = Arc::new(MockUpstream::with_total(100).failing_at(1));
        let client = PaginatedClient::new(upstream, Duration::from_secs(1));

        let window = client.fetch_window(&creds(), "cook", 1, 20).await;

        assert!(window.items.is_empty());
        assert_eq!(window.total_results_estimate, 0);
        assert!(window.error.is_some());
    }

    #[tokio::test]
    async fn test_later_failure_keeps_partial_items() {
        let upstream = Arc::new(MockUpstream::with_total(100).failing_at(11));
        let client = PaginatedClient::new(upstream, Duration::from_secs(1));

        let window = client.fetch_window(&creds(), "cook", 1, 30).await;

        assert_eq!(window.items.len(), 10);
        assert_eq!(window.total_results_estimate, 100);
        assert!(window.error.is_some());
    }

    #[tokio::test]
    async fn test_slow_call_times_out() {
        let upstream = Arc::new(MockUpstream::with_total(100).with_delay(Duration::from_millis(200)));
        let client = PaginatedClient::new(upstream, Duration::from_millis(20));

        let window = client.fetch_window(&creds(), "cook", 1, 10).await;

        assert!(window.items.is_empty());
        assert_eq!(window.error.as_deref(), Some("upstream call timed out"));
    }

    proptest! {
        #[test]
        fn prop_offsets_never_exceed_cap(page in 1u32..10_000, per_page in 1u32..=40) {
            let offsets = planned_offsets(page, per_page);
            prop_assert!(offsets.iter().all(|start| *start >= 1 && *start <= UPSTREAM_MAX_START));
        }

        #[test]
        fn prop_at_most_three_calls(page in 1u32..10_000, per_page in 1u32..=40) {
            prop_assert!(planned_offsets(page, per_page).len() <= MAX_CALLS_PER_REQUEST as usize);
        }

        #[test]
        fn prop_first_offset_is_window_start(page in 1u32..=10, per_page in 1u32..=10) {
            let start = (page - 1) * per_page + 1;
            let offsets = planned_offsets(page, per_page);
            prop_assert_eq!(offsets.first().copied(), Some(start));
        }
    }
}
