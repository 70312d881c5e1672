//! API keys for the upstream search service and the keyed job boards.
//!
//! Keys live in `secrecy` boxes and print as `[REDACTED]`.

use secrecy::{ExposeSecret, SecretBox};
use std::collections::BTreeMap;
use std::fmt;

use crate::types::query::QueryType;

/// An API key that never shows up in logs.
pub struct SecretString(SecretBox<str>);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(Box::from(value.into().as_str())))
    }

    /// Expose the secret value for use in a request.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.expose().to_string())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Key plus search-engine id for the upstream search API.
#[derive(Clone)]
pub struct UpstreamCredentials {
    /// API key (secret)
    pub api_key: SecretString,

    /// Programmable search engine id (`cx`)
    pub engine_id: String,
}

impl UpstreamCredentials {
    pub fn new(api_key: impl Into<String>, engine_id: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key),
            engine_id: engine_id.into(),
        }
    }

    /// Build from optional parts; `None` unless both are present and non-empty.
    pub fn from_parts(api_key: Option<String>, engine_id: Option<String>) -> Option<Self> {
        match (api_key, engine_id) {
            (Some(key), Some(cx)) if !key.trim().is_empty() && !cx.trim().is_empty() => {
                Some(Self::new(key.trim(), cx.trim()))
            }
            _ => None,
        }
    }

    /// Both the key and the engine id are non-blank.
    pub fn is_complete(&self) -> bool {
        !self.api_key.expose().trim().is_empty() && !self.engine_id.trim().is_empty()
    }
}

impl fmt::Debug for UpstreamCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamCredentials")
            .field("api_key", &"[REDACTED]")
            .field("engine_id", &self.engine_id)
            .finish()
    }
}

/// Primary credentials plus an optional secondary set per query type.
#[derive(Debug, Clone, Default)]
pub struct UpstreamCredentialSet {
    pub primary: Option<UpstreamCredentials>,
    pub secondary: BTreeMap<QueryType, UpstreamCredentials>,
}

impl UpstreamCredentialSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_primary(mut self, credentials: UpstreamCredentials) -> Self {
        self.primary = Some(credentials);
        self
    }

    pub fn with_secondary(mut self, query_type: QueryType, credentials: UpstreamCredentials) -> Self {
        self.secondary.insert(query_type, credentials);
        self
    }

    pub fn secondary_for(&self, query_type: QueryType) -> Option<&UpstreamCredentials> {
        self.secondary.get(&query_type)
    }

    /// True when no upstream path can be attempted for this type.
    pub fn is_missing_for(&self, query_type: QueryType) -> bool {
        self.primary.is_none() && self.secondary_for(query_type).is_none()
    }
}
