//! Runtime configuration
//!
//! Capacity bounds, the remote server location and the request timeout are
//! tuning surfaces that differ per deployment, so they are gathered here
//! instead of being scattered as constants. The CLI fills a `Config` from
//! flags with environment fallbacks and validates it once at startup.

use std::time::Duration;
use tracing::debug;

use crate::error::{Result, VibesError};

/// Default bound on the population sample
pub const DEFAULT_POPULATION_CAPACITY: usize = 10_000;

/// Default bound on short-id bundles held in memory
pub const DEFAULT_BUNDLE_CAPACITY: usize = 1_000;

/// Default lifetime of a short-id bundle (one year)
pub const DEFAULT_BUNDLE_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 365);

/// Default timeout for the single remote round trip
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration shared by the pipeline, the stores and the HTTP client
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of a vibes server; `None` keeps everything local
    pub server_url: Option<String>,
    /// Bound on each remote request; no retries are attempted
    pub request_timeout: Duration,
    /// Maximum population entries before the oldest is evicted
    pub population_capacity: usize,
    /// Maximum short-id bundles before the oldest is evicted
    pub bundle_capacity: usize,
    /// Lifetime of a stored short-id bundle
    pub bundle_ttl: Duration,
    /// Skip every remote call and use local estimates
    pub offline: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            population_capacity: DEFAULT_POPULATION_CAPACITY,
            bundle_capacity: DEFAULT_BUNDLE_CAPACITY,
            bundle_ttl: DEFAULT_BUNDLE_TTL,
            offline: false,
        }
    }
}

impl Config {
    /// Set the server base URL, trimming any trailing slash
    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.server_url = Some(url.trim_end_matches('/').to_string());
        self
    }

    /// Set the remote request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the population capacity
    pub fn with_population_capacity(mut self, capacity: usize) -> Self {
        self.population_capacity = capacity;
        self
    }

    /// Set the short-id bundle capacity
    pub fn with_bundle_capacity(mut self, capacity: usize) -> Self {
        self.bundle_capacity = capacity;
        self
    }

    /// Set the short-id bundle lifetime
    pub fn with_bundle_ttl(mut self, ttl: Duration) -> Self {
        self.bundle_ttl = ttl;
        self
    }

    /// Toggle offline mode
    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Server URL to use for remote calls, `None` when offline or unset
    pub fn remote_url(&self) -> Option<&str> {
        if self.offline {
            return None;
        }
        self.server_url.as_deref()
    }

    /// Check bounds and the URL scheme
    pub fn validate(&self) -> Result<()> {
        if self.population_capacity == 0 {
            return Err(VibesError::Config(
                "population capacity must be greater than zero".to_string(),
            ));
        }
        if self.bundle_capacity == 0 {
            return Err(VibesError::Config(
                "bundle capacity must be greater than zero".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(VibesError::Config(
                "request timeout must be greater than zero".to_string(),
            ));
        }
        if let Some(url) = &self.server_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(VibesError::Config(format!(
                "'{url}' is not an http(s) URL"
            )));
        }
        debug!(config = ?self, "Configuration validated");
        Ok(())
    }
}
