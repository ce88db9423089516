// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration loaded from `edgesync.toml`.
//!
//! Every field has a default, so a missing file or a partial file is valid.
//! Environment variables from [`crate::env`] override file values.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backoff::BackoffPolicy;
use crate::cache::{RouteRules, RouterConfig, DEFAULT_CACHE_FIRST, DEFAULT_NETWORK_FIRST};
use crate::env;
use crate::orchestrator::OrchestratorConfig;

/// Default configuration file name within the state directory.
pub const CONFIG_FILE_NAME: &str = "edgesync.toml";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Remote sync endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL; entries are posted to `{url}/sync`.
    pub url: String,
    /// Sent as `X-Client-ID`.
    pub client_id: String,
    /// Environment variable holding the bearer token.
    pub token_env: String,
    pub timeout_secs: u64,
    /// When false, nothing is ever drained.
    pub enabled: bool,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            url: "https://localhost:8443/api/edge-sync".to_string(),
            client_id: "edge-001".to_string(),
            token_env: env::vars::EDGESYNC_TOKEN.to_string(),
            timeout_secs: 30,
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub interval_secs: u64,
    pub batch_size: usize,
    pub max_delivery_cycles: u32,
    pub backoff_max_attempts: u32,
    pub backoff_base_delay_ms: u64,
    pub backoff_max_delay_ms: Option<u64>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            interval_secs: 300,
            batch_size: 50,
            max_delivery_cycles: 5,
            backoff_max_attempts: 3,
            backoff_base_delay_ms: 1000,
            backoff_max_delay_ms: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub prefix: String,
    pub version: String,
    /// Absolute URLs stored at install time.
    pub precache: Vec<String>,
    /// Regular expressions matched against the request path.
    pub cache_first: Vec<String>,
    pub network_first: Vec<String>,
    pub network_only: Vec<String>,
    pub refresh_on_network_first: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        let owned = |patterns: &[&str]| -> Vec<String> { patterns.iter().map(|p| p.to_string()).collect() };
        CacheConfig {
            prefix: "edge".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            precache: Vec::new(),
            cache_first: owned(DEFAULT_CACHE_FIRST),
            network_first: owned(DEFAULT_NETWORK_FIRST),
            network_only: Vec::new(),
            refresh_on_network_first: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    pub poll_interval_secs: u64,
    pub probe_interval_secs: u64,
}

impl Default for StatusConfig {
    fn default() -> Self {
        StatusConfig {
            poll_interval_secs: 5,
            probe_interval_secs: 15,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub remote: RemoteConfig,
    pub sync: SyncConfig,
    pub cache: CacheConfig,
    pub status: StatusConfig,
}

impl Config {
    /// Read and validate a config file. A missing file yields the defaults.
    ///
    /// Environment overrides are applied before validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
            Self::parse(&text)?
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Config::default()
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Apply `EDGESYNC_*` overrides.
    pub fn apply_env(&mut self) {
        if let Some(url) = env::endpoint() {
            self.remote.url = url;
        }
        if let Some(client_id) = env::client_id() {
            self.remote.client_id = client_id;
        }
        if let Some(secs) = env::sync_interval_secs() {
            self.sync.interval_secs = secs;
        }
        if let Some(enabled) = env::enabled() {
            self.remote.enabled = enabled;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = &self.remote.url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "remote.url must start with http:// or https://, got '{url}'"
            )));
        }
        for (name, value) in [
            ("sync.batch_size", self.sync.batch_size as u64),
            ("sync.backoff_max_attempts", u64::from(self.sync.backoff_max_attempts)),
            ("sync.interval_secs", self.sync.interval_secs),
            ("status.poll_interval_secs", self.status.poll_interval_secs),
            ("status.probe_interval_secs", self.status.probe_interval_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{name} must be greater than zero")));
            }
        }
        if self.cache.prefix.is_empty() || self.cache.version.is_empty() {
            return Err(ConfigError::Invalid(
                "cache.prefix and cache.version must not be empty".to_string(),
            ));
        }
        self.route_rules()?;
        Ok(())
    }

    pub fn backoff(&self) -> BackoffPolicy {
        let policy = BackoffPolicy::new(
            self.sync.backoff_max_attempts,
            Duration::from_millis(self.sync.backoff_base_delay_ms),
        );
        match self.sync.backoff_max_delay_ms {
            Some(ms) => policy.with_max_delay(Duration::from_millis(ms)),
            None => policy,
        }
    }

    pub fn orchestrator(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            backoff: self.backoff(),
            batch_size: self.sync.batch_size,
            max_delivery_cycles: self.sync.max_delivery_cycles,
            interval: Duration::from_secs(self.sync.interval_secs),
        }
    }

    pub fn route_rules(&self) -> Result<RouteRules, ConfigError> {
        RouteRules::new(
            self.cache.cache_first.as_slice(),
            self.cache.network_first.as_slice(),
            self.cache.network_only.as_slice(),
        )
        .map_err(|e| ConfigError::Invalid(format!("cache pattern: {e}")))
    }

    pub fn router(&self) -> Result<RouterConfig, ConfigError> {
        Ok(RouterConfig {
            prefix: self.cache.prefix.clone(),
            version: self.cache.version.clone(),
            rules: self.route_rules()?,
            backoff: self.backoff(),
            refresh_on_network_first: self.cache.refresh_on_network_first,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.remote.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.status.poll_interval_secs)
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.status.probe_interval_secs)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
