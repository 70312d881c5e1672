//! Result cache: fingerprint → ranked result list with an expiry.
//!
//! Available backends:
//! - `MemoryCache` - process-local map (always available)
//! - `SqliteCache` - SQLite file, survives restarts (requires `sqlite` feature)
//! - `NoopCache` - always empty; a valid, merely slower, substitute
//!
//! Reads never fail: absent, expired and unreadable entries are all misses.
//! Writes replace the whole entry for a fingerprint (last write wins).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::error::CacheResult;
use crate::types::result::{CacheEntry, CachePayload};

pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::MemoryCache;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteCache;

/// Key-value store of previously computed result sets.
#[async_trait]
pub trait ResultCache: Send + Sync {
    /// Get a live entry.
    ///
    /// Returns None if:
    /// - No entry exists
    /// - The entry expired (`now > expires_at`)
    /// - The stored payload cannot be read
    async fn get(&self, fingerprint: &str) -> Option<CacheEntry>;

    /// Store a payload, replacing any existing entry for the fingerprint.
    async fn put(&self, fingerprint: &str, payload: CachePayload, ttl: Duration) -> CacheResult<()>;

    /// Remove the entry for a fingerprint, if any.
    async fn invalidate(&self, fingerprint: &str) -> CacheResult<()>;

    /// Remove every expired entry.
    ///
    /// Returns the number of entries removed.
    async fn purge_expired(&self) -> CacheResult<usize>;
}

/// Cache that never stores anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCache;

#[async_trait]
impl ResultCache for NoopCache {
    async fn get(&self, _fingerprint: &str) -> Option<CacheEntry> {
        None
    }

    async fn put(&self, _fingerprint: &str, _payload: CachePayload, _ttl: Duration) -> CacheResult<()> {
        Ok(())
    }

    async fn invalidate(&self, _fingerprint: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn purge_expired(&self) -> CacheResult<usize> {
        Ok(0)
    }
}

/// Build the entry a `put` stores.
pub(crate) fn new_entry(fingerprint: &str, payload: CachePayload, ttl: Duration) -> CacheEntry {
    let created_at = Utc::now();
    CacheEntry {
        fingerprint: fingerprint.to_string(),
        payload: payload.results,
        total_estimate: payload.total_estimate,
        created_at,
        expires_at: expiry(created_at, ttl),
    }
}

/// `now + ttl`, saturating at the far future.
pub(crate) fn expiry(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::canonical;

    #[tokio::test]
    async fn test_noop_cache_is_always_empty() {
        let cache = NoopCache;
        cache
            .put(
                "abc",
                CachePayload::exact(vec![canonical("Cook", "Cafe X")]),
                Duration::from_secs(60),
            )
            .await
            .unwrap();
        assert!(cache.get("abc").await.is_none());
    }

    #[test]
    fn test_expiry_saturates() {
        let now = Utc::now();
        assert_eq!(expiry(now, Duration::MAX), DateTime::<Utc>::MAX_UTC);
        assert_eq!(
            expiry(now, Duration::from_secs(10)),
            now + chrono::Duration::seconds(10)
        );
    }
}
