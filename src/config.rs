// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the Pingback endpoint and sender.
//!
//! Every field has a default; [`Config::from_env`] overlays environment
//! variables on top of them.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Pingback service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Path the XML-RPC endpoint is mounted at (default: /xmlrpc)
    #[serde(default = "default_endpoint_path")]
    pub endpoint_path: String,

    /// Largest accepted request body in bytes (default: 65536)
    #[serde(default = "default_max_request_bytes")]
    pub max_request_bytes: usize,

    /// Outbound HTTP configuration
    #[serde(default)]
    pub transport: TransportConfig,

    /// Target acceptance policy
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Duplicate registry configuration
    #[serde(default)]
    pub registry: RegistryConfig,
}

/// Outbound HTTP configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Timeout for each fetch or POST in milliseconds (default: 10000)
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    /// Body prefix read during endpoint discovery (default: 4096)
    #[serde(default = "default_partial_fetch_bytes")]
    pub partial_fetch_bytes: u64,

    /// User-Agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Which targets the endpoint accepts pingbacks for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Hosts served by this endpoint. Empty accepts any host.
    #[serde(default)]
    pub local_hosts: Vec<String>,

    /// Reject pingbacks whose source and target share a host (default: true)
    #[serde(default = "default_true")]
    pub block_self_ping: bool,
}

/// Duplicate registry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// How long an accepted pingback counts for duplicate detection (default: 86400)
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,

    /// Interval between registry cleanups in seconds (default: 300)
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_endpoint_path() -> String {
    "/xmlrpc".to_string()
}

fn default_max_request_bytes() -> usize {
    64 * 1024
}

fn default_fetch_timeout_ms() -> u64 {
    10_000
}

fn default_partial_fetch_bytes() -> u64 {
    4096
}

fn default_user_agent() -> String {
    concat!("pingback/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_true() -> bool {
    true
}

fn default_retention_secs() -> u64 {
    86_400
}

fn default_cleanup_interval_secs() -> u64 {
    300
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            endpoint_path: default_endpoint_path(),
            max_request_bytes: default_max_request_bytes(),
            transport: TransportConfig::default(),
            policy: PolicyConfig::default(),
            registry: RegistryConfig::default(),
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: default_fetch_timeout_ms(),
            partial_fetch_bytes: default_partial_fetch_bytes(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            local_hosts: Vec::new(),
            block_self_ping: default_true(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            retention_secs: default_retention_secs(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Values that fail to parse keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T: std::str::FromStr>(
            lookup: &impl Fn(&str) -> Option<String>,
            key: &str,
        ) -> Option<T> {
            lookup(key).and_then(|v| v.trim().parse().ok())
        }

        let mut config = Config::default();

        if let Some(v) = lookup("BIND_ADDR") {
            config.bind_addr = v;
        }
        if let Some(v) = lookup("PINGBACK_PATH").filter(|p| p.starts_with('/')) {
            config.endpoint_path = v;
        }
        if let Some(v) = parsed(&lookup, "MAX_REQUEST_BYTES") {
            config.max_request_bytes = v;
        }
        if let Some(v) = parsed(&lookup, "FETCH_TIMEOUT_MS") {
            config.transport.fetch_timeout_ms = v;
        }
        if let Some(v) = parsed(&lookup, "PARTIAL_FETCH_BYTES") {
            config.transport.partial_fetch_bytes = v;
        }
        if let Some(v) = lookup("PINGBACK_USER_AGENT") {
            config.transport.user_agent = v;
        }
        if let Some(v) = lookup("PINGBACK_LOCAL_HOSTS") {
            config.policy.local_hosts = v
                .split(',')
                .map(|h| h.trim().to_lowercase())
                .filter(|h| !h.is_empty())
                .collect();
        }
        if let Some(v) = parsed(&lookup, "BLOCK_SELF_PING") {
            config.policy.block_self_ping = v;
        }
        if let Some(v) = parsed(&lookup, "REGISTRY_RETENTION_SECS") {
            config.registry.retention_secs = v;
        }
        if let Some(v) = parsed(&lookup, "REGISTRY_CLEANUP_SECS") {
            config.registry.cleanup_interval_secs = v;
        }

        config
    }
}

impl RegistryConfig {
    /// Get the retention duration
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }

    /// Get the cleanup interval, never shorter than one second
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs.max(1))
    }
}
