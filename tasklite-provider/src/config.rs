//! Provider configuration.
//!
//! The provider block names the API host; the `TASKLITE_HOST` environment
//! variable (or `--host`) is the fallback when the block leaves it unset.

use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{SchemaVersion, Value};

/// Environment variable consulted when the provider block sets no host.
pub const HOST_ENV: &str = "TASKLITE_HOST";

/// Configuration errors, reported before any client is built.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "the TaskLite API host is unknown; apply the source of the value first, \
         set it statically, or use the TASKLITE_HOST environment variable"
    )]
    UnknownHost,

    #[error(
        "the TaskLite API host is missing or empty; set it in the provider \
         configuration or use the TASKLITE_HOST environment variable"
    )]
    MissingHost,

    #[error("invalid TaskLite API host '{host}': {reason}")]
    InvalidHost { host: String, reason: String },
}

/// The provider block as written by the user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// URL of the TaskLite API.
    #[serde(default)]
    pub host: Value<String>,

    /// Wire schema spoken by the API.
    #[serde(default)]
    pub schema: Option<SchemaVersion>,

    /// Transport-level timeout for every request.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Immutable settings injected into [`crate::clients::TaskClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub endpoint: String,
    pub schema: SchemaVersion,
    pub request_timeout: Option<Duration>,
}

impl ProviderConfig {
    /// Resolve the client settings. A known `host` wins over `fallback_host`.
    pub fn resolve(&self, fallback_host: Option<&str>) -> Result<ClientConfig, ConfigError> {
        let host = match &self.host {
            Value::Unknown => return Err(ConfigError::UnknownHost),
            Value::Known(host) => host.trim(),
            Value::Null => fallback_host.map(str::trim).unwrap_or_default(),
        };
        if host.is_empty() {
            return Err(ConfigError::MissingHost);
        }

        let url = Url::parse(host).map_err(|e| ConfigError::InvalidHost {
            host: host.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidHost {
                host: host.to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        Ok(ClientConfig {
            endpoint: host.trim_end_matches('/').to_string(),
            schema: self.schema.unwrap_or_default(),
            request_timeout: self.timeout_secs.map(Duration::from_secs),
        })
    }
}
