//! Credential handling for upstream APIs and source adapters.

pub mod credentials;

pub use credentials::{SecretString, UpstreamCredentials, UpstreamCredentialSet};
