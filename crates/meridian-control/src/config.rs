//! Configuration for meridian-control.

use std::time::Duration;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

use crate::error::{ControlError, ControlResult};

/// Top-level configuration for the cluster controller.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ControllerConfig {
    /// Control-plane API configuration.
    #[serde(default)]
    pub api: ApiConfig,

    /// Retry behaviour for long-running operations.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Wall-clock deadlines per lifecycle operation.
    #[serde(default)]
    pub timeouts: OperationTimeouts,
}

impl ControllerConfig {
    /// Load configuration from the default sources.
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. Default values
    /// 2. `meridian.toml` in the current directory (if present)
    /// 3. Environment variables with `MERIDIAN_` prefix
    pub fn load() -> ControlResult<Self> {
        Figment::new()
            .merge(Toml::file("meridian.toml"))
            .merge(Env::prefixed("MERIDIAN_").split("__"))
            .extract()
            .map_err(|e| ControlError::Config(e.to_string()))
    }

    /// Load configuration from a specific TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> ControlResult<Self> {
        Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("MERIDIAN_").split("__"))
            .extract()
            .map_err(|e| ControlError::Config(e.to_string()))
    }
}

/// Control-plane API client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the control-plane API.
    #[serde(default = "default_api_url")]
    pub url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_api_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    "http://localhost:9000".to_owned()
}

const fn default_api_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            timeout_secs: default_api_timeout_secs(),
        }
    }
}

/// Retry behaviour for long-running operations.
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Attempts per call-and-wait cycle, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Pause between attempts, in seconds.
    #[serde(default = "default_retry_interval_secs")]
    pub interval_secs: u64,

    /// How often to poll an unfinished operation, in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

const fn default_max_attempts() -> u32 {
    5
}

const fn default_retry_interval_secs() -> u64 {
    120 // 2 minutes
}

const fn default_poll_interval_secs() -> u64 {
    5
}

impl RetryConfig {
    /// Pause between attempts.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Operation poll interval.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            interval_secs: default_retry_interval_secs(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

/// Wall-clock deadlines per lifecycle operation.
#[derive(Debug, Clone, Deserialize)]
pub struct OperationTimeouts {
    /// Deadline for cluster creation, in seconds.
    #[serde(default = "default_create_timeout_secs")]
    pub create_secs: u64,

    /// Deadline for a whole update pass, in seconds.
    #[serde(default = "default_update_timeout_secs")]
    pub update_secs: u64,

    /// Deadline for cluster deletion, in seconds.
    #[serde(default = "default_delete_timeout_secs")]
    pub delete_secs: u64,
}

const fn default_create_timeout_secs() -> u64 {
    1800 // 30 minutes
}

const fn default_update_timeout_secs() -> u64 {
    3600 // 60 minutes
}

const fn default_delete_timeout_secs() -> u64 {
    900 // 15 minutes
}

impl OperationTimeouts {
    /// Deadline for cluster creation.
    #[must_use]
    pub const fn create(&self) -> Duration {
        Duration::from_secs(self.create_secs)
    }

    /// Deadline for a whole update pass.
    #[must_use]
    pub const fn update(&self) -> Duration {
        Duration::from_secs(self.update_secs)
    }

    /// Deadline for cluster deletion.
    #[must_use]
    pub const fn delete(&self) -> Duration {
        Duration::from_secs(self.delete_secs)
    }
}

impl Default for OperationTimeouts {
    fn default() -> Self {
        Self {
            create_secs: default_create_timeout_secs(),
            update_secs: default_update_timeout_secs(),
            delete_secs: default_delete_timeout_secs(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ControllerConfig::default();
        assert_eq!(config.api.url, "http://localhost:9000");
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.interval(), Duration::from_secs(120));
        assert_eq!(config.timeouts.create(), Duration::from_secs(1800));
        assert_eq!(config.timeouts.update(), Duration::from_secs(3600));
        assert_eq!(config.timeouts.delete(), Duration::from_secs(900));
    }

    #[test]
    fn config_from_toml() {
        let toml = r#"
            [api]
            url = "https://mdb.example.com/api"
            timeout_secs = 15

            [retry]
            max_attempts = 3
            interval_secs = 10

            [timeouts]
            update_secs = 120
        "#;

        let config: ControllerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.api.url, "https://mdb.example.com/api");
        assert_eq!(config.api.timeout_secs, 15);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.interval(), Duration::from_secs(10));
        // Unset fields keep their defaults.
        assert_eq!(config.retry.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.timeouts.update(), Duration::from_secs(120));
        assert_eq!(config.timeouts.create(), Duration::from_secs(1800));
    }
}
