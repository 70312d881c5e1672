//! Per-site politeness between adapter invocations.
//!
//! The orchestrator asks the policy for a turn before every fetch. The
//! production policy is a keyed `governor` limiter, one cell per site, so two
//! adapters hitting the same host are spaced out while different hosts run
//! freely.

use async_trait::async_trait;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::time::Duration;
use tracing::debug;

/// Decides when a request to a site may proceed.
#[async_trait]
pub trait PolitenessPolicy: Send + Sync {
    /// Wait until a request to `site` is allowed.
    async fn wait_turn(&self, site: &str);
}

/// No spacing at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDelay;

#[async_trait]
impl PolitenessPolicy for NoDelay {
    async fn wait_turn(&self, _site: &str) {}
}

/// One request per `delay` per site.
pub struct SiteRateLimiter {
    limiter: Option<DefaultKeyedRateLimiter<String>>,
}

impl SiteRateLimiter {
    /// Create a limiter allowing one request per `delay` to each site.
    ///
    /// A zero delay disables spacing.
    pub fn new(delay: Duration) -> Self {
        Self {
            limiter: Quota::with_period(delay).map(RateLimiter::keyed),
        }
    }
}

#[async_trait]
impl PolitenessPolicy for SiteRateLimiter {
    async fn wait_turn(&self, site: &str) {
        if let Some(limiter) = &self.limiter {
            debug!(site = %site, "Waiting for politeness permit");
            limiter.until_key_ready(&site.to_string()).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_same_site_is_spaced() {
        let policy = SiteRateLimiter::new(Duration::from_millis(100));

        let start = Instant::now();
        policy.wait_turn("www.indeed.com").await;
        policy.wait_turn("www.indeed.com").await;

        assert!(
            start.elapsed() >= Duration::from_millis(80),
            "second request should wait: {:?}",
            start.elapsed()
        );
    }

    #[tokio::test]
    async fn test_different_sites_do_not_wait() {
        let policy = SiteRateLimiter::new(Duration::from_secs(5));

        let start = Instant::now();
        policy.wait_turn("www.indeed.com").await;
        policy.wait_turn("losangeles.craigslist.org").await;

        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_zero_delay_disables_spacing() {
        let policy = SiteRateLimiter::new(Duration::ZERO);
        let start = Instant::now();
        for _ in 0..5 {
            policy.wait_turn("www.indeed.com").await;
        }
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
