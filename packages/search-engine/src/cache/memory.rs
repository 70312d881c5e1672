//! In-memory result cache for tests and single-process deployments.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use super::{new_entry, ResultCache};
use crate::error::CacheResult;
use crate::types::result::{CacheEntry, CachePayload};

/// In-memory cache.
///
/// Not persistent: entries are lost on restart.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all stored entries.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }
}

#[async_trait]
impl ResultCache for MemoryCache {
    async fn get(&self, fingerprint: &str) -> Option<CacheEntry> {
        let entries = self.entries.read().ok()?;
        entries
            .get(fingerprint)
            .filter(|e| !e.is_expired_at(Utc::now()))
            .cloned()
    }

    async fn put(&self, fingerprint: &str, payload: CachePayload, ttl: Duration) -> CacheResult<()> {
        let entry = new_entry(fingerprint, payload, ttl);
        // A poisoned lock only means another writer panicked; the map itself is intact.
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(fingerprint.to_string(), entry);
        Ok(())
    }

    async fn invalidate(&self, fingerprint: &str) -> CacheResult<()> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(fingerprint);
        Ok(())
    }

    async fn purge_expired(&self) -> CacheResult<usize> {
        let now = Utc::now();
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired_at(now));
        Ok(before - entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::canonical;

    #[tokio::test]
    async fn test_round_trip_within_ttl() {
        let cache = MemoryCache::new();
        let payload = vec![canonical("Cook", "Cafe X"), canonical("Driver", "Acme")];

        cache
            .put("fp", CachePayload::exact(payload.clone()), Duration::from_secs(60))
            .await
            .unwrap();

        let entry = cache.get("fp").await.expect("entry should be live");
        assert_eq!(entry.payload, payload);
        assert_eq!(entry.total_estimate, None);
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let cache = MemoryCache::new();
        cache
            .put(
                "fp",
                CachePayload::exact(vec![canonical("Cook", "Cafe X")]),
                Duration::from_millis(20),
            )
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(cache.get("fp").await.is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let cache = MemoryCache::new();
        cache
            .put("fp", CachePayload::exact(vec![canonical("Cook", "Cafe X")]), Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .put("fp", CachePayload::estimated(vec![canonical("Driver", "Acme")], 40), Duration::from_secs(60))
            .await
            .unwrap();

        let entry = cache.get("fp").await.unwrap();
        assert_eq!(entry.payload.len(), 1);
        assert_eq!(entry.payload[0].title, "Driver");
        assert_eq!(entry.total_estimate, Some(40));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_and_purge() {
        let cache = MemoryCache::new();
        cache
            .put("live", CachePayload::exact(vec![]), Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .put("stale", CachePayload::exact(vec![]), Duration::from_millis(1))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(cache.purge_expired().await.unwrap(), 1);
        assert_eq!(cache.len(), 1);

        cache.invalidate("live").await.unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear() {
        let cache = MemoryCache::new();
        tokio_test::block_on(cache.put("fp", CachePayload::exact(vec![]), Duration::from_secs(60))).unwrap();
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(tokio_test::block_on(cache.get("fp")).is_none());
    }
}
