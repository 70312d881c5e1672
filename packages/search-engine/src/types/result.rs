//! Canonical result and cache entry types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The source-agnostic shape every listing is normalized into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalResult {
    pub title: String,
    pub provider: String,
    pub location: String,
    pub compensation_text: String,
    pub description: String,
    pub source_url: String,
    /// Source-namespaced id, display only.
    pub external_id: String,
    pub source_name: String,
    pub scraped_at: DateTime<Utc>,
    pub relevance_score: f64,
    /// Suitability for the audience, 0-100.
    pub domain_score: u8,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl CanonicalResult {
    /// Title, description, provider and location joined for token matching.
    pub fn combined_text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.title, self.description, self.provider, self.location
        )
        .to_lowercase()
    }
}

/// A previously computed, fully ranked result list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub fingerprint: String,
    /// Deduplicated and ranked; never paginated.
    pub payload: Vec<CanonicalResult>,
    /// Upstream total estimate when the list came from the upstream API.
    pub total_estimate: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// What a cache write stores.
#[derive(Debug, Clone, PartialEq)]
pub struct CachePayload {
    pub results: Vec<CanonicalResult>,
    pub total_estimate: Option<u64>,
}

impl CachePayload {
    pub fn exact(results: Vec<CanonicalResult>) -> Self {
        Self {
            results,
            total_estimate: None,
        }
    }

    pub fn estimated(results: Vec<CanonicalResult>, total_estimate: u64) -> Self {
        Self {
            results,
            total_estimate: Some(total_estimate),
        }
    }
}
