//! Client configuration
//!
//! `ClientConfig` is loaded from YAML. Every section has defaults, so an
//! empty document is a valid configuration; credentials are usually supplied
//! through the `TOKENQUERY_*` environment variables instead.

use crate::auth::Credentials;
use crate::error::{Error, Result};
use crate::http::{RetryPolicy, TransportConfig};
use crate::pagination::{DEFAULT_BATCH_CAP, DEFAULT_ID_FIELD};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding the consumer key
pub const ENV_CONSUMER_KEY: &str = "TOKENQUERY_CONSUMER_KEY";
/// Environment variable overriding the consumer secret
pub const ENV_CONSUMER_SECRET: &str = "TOKENQUERY_CONSUMER_SECRET";
/// Environment variable overriding the access token
pub const ENV_ACCESS_TOKEN: &str = "TOKENQUERY_ACCESS_TOKEN";
/// Environment variable overriding the access token secret
pub const ENV_ACCESS_TOKEN_SECRET: &str = "TOKENQUERY_ACCESS_TOKEN_SECRET";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete client configuration loaded from YAML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// OAuth credentials
    #[serde(default)]
    pub credentials: Credentials,

    /// HTTP transport settings
    #[serde(default)]
    pub http: HttpSection,

    /// Pagination settings
    #[serde(default)]
    pub pagination: PaginationSection,
}

impl ClientConfig {
    /// Load and validate a config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: ClientConfig = if yaml.trim().is_empty() {
            ClientConfig::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Replace credentials with any `TOKENQUERY_*` variables that are set
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Replace credentials with the values `lookup` returns
    #[must_use]
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let creds = &mut self.credentials;
        for (name, field) in [
            (ENV_CONSUMER_KEY, &mut creds.consumer_key),
            (ENV_CONSUMER_SECRET, &mut creds.consumer_secret),
            (ENV_ACCESS_TOKEN, &mut creds.access_token),
            (ENV_ACCESS_TOKEN_SECRET, &mut creds.access_token_secret),
        ] {
            if let Some(value) = lookup(name).filter(|v| !v.is_empty()) {
                *field = value;
            }
        }
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.http.timeout_secs == 0 {
            return Err(Error::config("http.timeout_secs must be greater than 0"));
        }
        if self.http.requests_per_second == Some(0) {
            return Err(Error::config(
                "http.requests_per_second must be greater than 0",
            ));
        }
        if self.pagination.batch_cap == 0 {
            return Err(Error::config("pagination.batch_cap must be greater than 0"));
        }
        if self.pagination.id_field.is_empty() {
            return Err(Error::missing_field("pagination.id_field"));
        }
        Ok(())
    }

    /// Require a usable consumer pair before issuing requests
    pub fn require_credentials(&self) -> Result<()> {
        if self.credentials.consumer_key.is_empty() {
            return Err(Error::missing_field("credentials.consumer_key"));
        }
        if self.credentials.consumer_secret.is_empty() {
            return Err(Error::missing_field("credentials.consumer_secret"));
        }
        Ok(())
    }

    /// Transport settings derived from the `http` section
    pub fn transport_config(&self) -> TransportConfig {
        let http = &self.http;
        let mut builder = TransportConfig::builder()
            .timeout(Duration::from_secs(http.timeout_secs))
            .rate_limit_cooldown(Duration::from_secs(http.rate_limit_cooldown_secs))
            .unavailable_delay(Duration::from_millis(http.unavailable_retry_delay_ms));
        if let Some(agent) = &http.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        if let Some(rps) = http.requests_per_second {
            builder = builder.requests_per_second(rps);
        }
        builder.build()
    }
}

// ============================================================================
// HTTP Section
// ============================================================================

/// HTTP transport configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSection {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// User agent (defaults to `tokenquery/<version>`)
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Wait after a 429 or an exhausted quota, in seconds
    #[serde(default = "default_rate_limit_cooldown")]
    pub rate_limit_cooldown_secs: u64,

    /// Wait before resending a 503/504, in milliseconds
    #[serde(default = "default_unavailable_delay")]
    pub unavailable_retry_delay_ms: u64,

    /// Client-side pacing
    #[serde(default)]
    pub requests_per_second: Option<u32>,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: None,
            rate_limit_cooldown_secs: default_rate_limit_cooldown(),
            unavailable_retry_delay_ms: default_unavailable_delay(),
            requests_per_second: None,
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_rate_limit_cooldown() -> u64 {
    RetryPolicy::default().rate_limit_cooldown.as_secs()
}

fn default_unavailable_delay() -> u64 {
    RetryPolicy::default().unavailable_delay.as_millis() as u64
}

// ============================================================================
// Pagination Section
// ============================================================================

/// Pagination configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationSection {
    /// Maximum keys per batch lookup request
    #[serde(default = "default_batch_cap")]
    pub batch_cap: usize,

    /// Identifier field for window pagination
    #[serde(default = "default_id_field")]
    pub id_field: String,
}

impl Default for PaginationSection {
    fn default() -> Self {
        Self {
            batch_cap: default_batch_cap(),
            id_field: default_id_field(),
        }
    }
}

fn default_batch_cap() -> usize {
    DEFAULT_BATCH_CAP
}

fn default_id_field() -> String {
    DEFAULT_ID_FIELD.to_string()
}
