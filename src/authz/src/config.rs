//! Checker configuration loading and validation

use crate::error::{AuthzError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Timeouts and cache settings for the checkers and their collaborators
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckerConfig {
    /// Bound on each scope store call
    #[serde(default = "default_store_timeout")]
    pub store_timeout_ms: u64,

    /// Bound on each organization resolver call
    #[serde(default = "default_resolver_timeout")]
    pub resolver_timeout_ms: u64,

    /// TTL of cached ancestor closures
    #[serde(default = "default_cache_ttl")]
    pub hierarchy_cache_ttl_secs: u64,

    /// Default log filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_store_timeout() -> u64 { 3000 }
fn default_resolver_timeout() -> u64 { 3000 }
fn default_cache_ttl() -> u64 { 60 }
fn default_log_level() -> String { "info".to_string() }

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            store_timeout_ms: default_store_timeout(),
            resolver_timeout_ms: default_resolver_timeout(),
            hierarchy_cache_ttl_secs: default_cache_ttl(),
            log_level: default_log_level(),
        }
    }
}

impl CheckerConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        let config: CheckerConfig = toml::from_str(&contents).map_err(|e| {
            AuthzError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.store_timeout_ms == 0 {
            return Err(AuthzError::Config(
                "store_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.resolver_timeout_ms == 0 {
            return Err(AuthzError::Config(
                "resolver_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.log_level.trim().is_empty() {
            return Err(AuthzError::Config("log_level cannot be empty".to_string()));
        }
        Ok(())
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn resolver_timeout(&self) -> Duration {
        Duration::from_millis(self.resolver_timeout_ms)
    }

    pub fn hierarchy_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.hierarchy_cache_ttl_secs)
    }
}
