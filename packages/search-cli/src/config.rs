use anyhow::{Context, Result};
use dotenvy::dotenv;
use search_engine::{
    EngineConfig, QueryType, SourceKeys, UpstreamCredentialSet, UpstreamCredentials,
};
use std::env;
use std::str::FromStr;

const DEFAULT_CACHE_URL: &str = "sqlite://search_cache.db?mode=rwc";

/// CLI configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub cache_url: String,
    pub cache_ttl_secs: u64,
    pub per_source_timeout_secs: u64,
    pub batch_timeout_secs: u64,
    pub politeness_delay_ms: u64,
    pub upstream: UpstreamCredentialSet,
    pub dice_api_key: Option<String>,
    pub usajobs_api_key: Option<String>,
    pub usajobs_user_agent: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = EngineConfig::default();

        let mut upstream = UpstreamCredentialSet::new();
        if let Some(primary) = UpstreamCredentials::from_parts(
            lookup("GOOGLE_SEARCH_API_KEY"),
            lookup("GOOGLE_SEARCH_ENGINE_ID"),
        ) {
            upstream = upstream.with_primary(primary);
        }
        for query_type in QueryType::ALL {
            let prefix = format!("GOOGLE_SEARCH_{}", query_type.as_str().to_uppercase());
            if let Some(secondary) = UpstreamCredentials::from_parts(
                lookup(&format!("{}_API_KEY", prefix)),
                lookup(&format!("{}_ENGINE_ID", prefix)),
            ) {
                upstream = upstream.with_secondary(query_type, secondary);
            }
        }

        Ok(Self {
            cache_url: lookup("SEARCH_CACHE_URL").unwrap_or_else(|| DEFAULT_CACHE_URL.to_string()),
            cache_ttl_secs: parse_or(&lookup, "SEARCH_CACHE_TTL_SECS", defaults.cache_ttl_secs)?,
            per_source_timeout_secs: parse_or(
                &lookup,
                "SEARCH_PER_SOURCE_TIMEOUT_SECS",
                defaults.per_source_timeout_secs,
            )?,
            batch_timeout_secs: parse_or(&lookup, "SEARCH_BATCH_TIMEOUT_SECS", defaults.batch_timeout_secs)?,
            politeness_delay_ms: parse_or(
                &lookup,
                "SEARCH_POLITENESS_DELAY_MS",
                defaults.politeness_delay_ms,
            )?,
            upstream,
            dice_api_key: non_blank(lookup("DICE_API_KEY")),
            usajobs_api_key: non_blank(lookup("USAJOBS_API_KEY")),
            usajobs_user_agent: lookup("USAJOBS_USER_AGENT").unwrap_or_default(),
        })
    }

    /// Engine settings with the configured overrides applied.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::default()
            .with_timeouts(self.per_source_timeout_secs, self.batch_timeout_secs)
            .with_cache_ttl(self.cache_ttl_secs)
            .with_politeness_delay(self.politeness_delay_ms)
    }

    pub fn source_keys(&self) -> SourceKeys {
        SourceKeys {
            dice_api_key: self.dice_api_key.clone(),
            usajobs_api_key: self.usajobs_api_key.clone(),
            usajobs_user_agent: self.usajobs_user_agent.clone(),
        }
    }

    /// Whether each optional key was found.
    pub fn summary(&self) -> Vec<(&'static str, bool)> {
        vec![
            ("GOOGLE_SEARCH_API_KEY", self.upstream.primary.is_some()),
            ("DICE_API_KEY", self.dice_api_key.is_some()),
            ("USAJOBS_API_KEY", self.usajobs_api_key.is_some()),
        ]
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", name)),
        _ => Ok(default),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
