//! SQLite result cache.
//!
//! A file-based backend so cached result sets survive process restarts.
//! Layout: one `search_cache` row per fingerprint holding the JSON payload
//! and its expiry (unix milliseconds).

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::time::Duration;
use tracing::{debug, warn};

use super::{new_entry, ResultCache};
use crate::error::{CacheError, CacheResult};
use crate::types::result::{CacheEntry, CachePayload, CanonicalResult};

/// SQLite-backed result cache.
pub struct SqliteCache {
    pool: SqlitePool,
}

impl SqliteCache {
    /// Open (and migrate) a cache at the given connection URL.
    ///
    /// # Example URLs
    /// - `sqlite://search_cache.db?mode=rwc` - File-based, created if missing
    /// - `sqlite::memory:` - Ephemeral (prefer [`SqliteCache::in_memory`])
    pub async fn new(database_url: &str) -> CacheResult<Self> {
        Self::connect(database_url, 5).await
    }

    /// Create an in-memory cache (for testing).
    ///
    /// Pinned to one connection: every SQLite memory connection is its own database.
    pub async fn in_memory() -> CacheResult<Self> {
        Self::connect("sqlite::memory:", 1).await
    }

    async fn connect(database_url: &str, max_connections: u32) -> CacheResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        let cache = Self { pool };
        cache.run_migrations().await?;
        Ok(cache)
    }

    async fn run_migrations(&self) -> CacheResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS search_cache (
                fingerprint TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                total_estimate INTEGER,
                created_at INTEGER NOT NULL,
                expires_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_search_cache_expires_at ON search_cache(expires_at);
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[derive(Debug, FromRow)]
struct CacheRow {
    fingerprint: String,
    payload: String,
    total_estimate: Option<i64>,
    created_at: i64,
    expires_at: i64,
}

impl CacheRow {
    fn into_entry(self) -> CacheResult<CacheEntry> {
        let payload: Vec<CanonicalResult> = serde_json::from_str(&self.payload)?;
        Ok(CacheEntry {
            fingerprint: self.fingerprint,
            payload,
            total_estimate: self.total_estimate.and_then(|t| u64::try_from(t).ok()),
            created_at: from_millis(self.created_at)?,
            expires_at: from_millis(self.expires_at)?,
        })
    }
}

fn from_millis(millis: i64) -> CacheResult<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| CacheError::Storage(format!("invalid timestamp: {}", millis).into()))
}

#[async_trait]
impl ResultCache for SqliteCache {
    async fn get(&self, fingerprint: &str) -> Option<CacheEntry> {
        let row = sqlx::query_as::<_, CacheRow>(
            "SELECT fingerprint, payload, total_estimate, created_at, expires_at FROM search_cache WHERE fingerprint = ?",
        )
        .bind(fingerprint)
        .fetch_optional(&self.pool)
        .await;

        let row = match row {
            Ok(Some(row)) => row,
            Ok(None) => return None,
            Err(e) => {
                warn!(fingerprint = %fingerprint, error = %e, "Cache read failed, treating as miss");
                return None;
            }
        };

        let entry = match row.into_entry() {
            Ok(entry) => entry,
            Err(e) => {
                warn!(fingerprint = %fingerprint, error = %e, "Unreadable cache entry, treating as miss");
                return None;
            }
        };

        if entry.is_expired_at(Utc::now()) {
            debug!(fingerprint = %fingerprint, "Cache entry expired");
            return None;
        }

        Some(entry)
    }

    async fn put(&self, fingerprint: &str, payload: CachePayload, ttl: Duration) -> CacheResult<()> {
        let entry = new_entry(fingerprint, payload, ttl);
        let payload_json = serde_json::to_string(&entry.payload)?;
        let total_estimate = entry.total_estimate.map(|t| i64::try_from(t).unwrap_or(i64::MAX));

        sqlx::query(
            r#"
            INSERT INTO search_cache (fingerprint, payload, total_estimate, created_at, expires_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(fingerprint) DO UPDATE SET
                payload = excluded.payload,
                total_estimate = excluded.total_estimate,
                created_at = excluded.created_at,
                expires_at = excluded.expires_at
            "#,
        )
        .bind(&entry.fingerprint)
        .bind(payload_json)
        .bind(total_estimate)
        .bind(entry.created_at.timestamp_millis())
        .bind(entry.expires_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn invalidate(&self, fingerprint: &str) -> CacheResult<()> {
        sqlx::query("DELETE FROM search_cache WHERE fingerprint = ?")
            .bind(fingerprint)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn purge_expired(&self) -> CacheResult<usize> {
        let result = sqlx::query("DELETE FROM search_cache WHERE expires_at < ?")
            .bind(Utc::now().timestamp_millis())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() as usize)
    }
}
