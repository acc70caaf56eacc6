//! Configuration Module
//!
//! Loads gateway configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::client::{CacheTtls, RetryPolicy, DEFAULT_MAX_RETRIES};

/// Gateway configuration parameters.
///
/// Every value can be set through an environment variable; unset or
/// unparsable variables fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the upstream TaskFlow API
    pub api_url: String,
    /// Bearer token sent upstream, if any
    pub api_token: Option<String>,
    /// HTTP server port
    pub server_port: u16,
    /// Seconds between expired-entry sweeps; 0 disables the sweep
    pub cleanup_interval: u64,
    pub task_list_ttl: u64,
    pub task_ttl: u64,
    pub categories_ttl: u64,
    pub analytics_ttl: u64,
    /// Per-request upstream timeout in seconds
    pub request_timeout: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `TASKFLOW_API_URL` - Upstream base URL (default: http://localhost:8000/api)
    /// - `TASKFLOW_API_TOKEN` - Bearer token (default: none)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 60)
    /// - `TASK_LIST_TTL`, `TASK_TTL`, `CATEGORIES_TTL`, `ANALYTICS_TTL` -
    ///   Cache lifetimes in seconds (defaults: 120, 300, 600, 300)
    /// - `REQUEST_TIMEOUT` - Upstream timeout in seconds (default: 30)
    /// - `MAX_RETRIES` - Retries for idempotent requests (default: 2)
    /// - `RETRY_DELAY_MS` - Pause before each retry (default: 1000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_url: env::var("TASKFLOW_API_URL").unwrap_or(defaults.api_url),
            api_token: env::var("TASKFLOW_API_TOKEN")
                .ok()
                .filter(|token| !token.trim().is_empty()),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            task_list_ttl: env_or("TASK_LIST_TTL", defaults.task_list_ttl),
            task_ttl: env_or("TASK_TTL", defaults.task_ttl),
            categories_ttl: env_or("CATEGORIES_TTL", defaults.categories_ttl),
            analytics_ttl: env_or("ANALYTICS_TTL", defaults.analytics_ttl),
            request_timeout: env_or("REQUEST_TIMEOUT", defaults.request_timeout),
            max_retries: env_or("MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_or("RETRY_DELAY_MS", defaults.retry_delay_ms),
        }
    }

    pub fn cache_ttls(&self) -> CacheTtls {
        CacheTtls {
            task_list: Duration::from_secs(self.task_list_ttl),
            task: Duration::from_secs(self.task_ttl),
            categories: Duration::from_secs(self.categories_ttl),
            analytics: Duration::from_secs(self.analytics_ttl),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// `None` when the sweep is disabled.
    pub fn cleanup_interval(&self) -> Option<Duration> {
        (self.cleanup_interval > 0).then(|| Duration::from_secs(self.cleanup_interval))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000/api".to_string(),
            api_token: None,
            server_port: 3000,
            cleanup_interval: 60,
            task_list_ttl: 120,
            task_ttl: 300,
            categories_ttl: 600,
            analytics_ttl: 300,
            request_timeout: 30,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: 1000,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
