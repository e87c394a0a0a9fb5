//! HTTP client for a remote vibes server
//!
//! One request per call, bounded by the configured timeout and never
//! retried. Callers decide what a failure means: the percentile engine
//! falls back to the estimate and acquisition falls back to the next path.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};
use vibes_core::{Config, DerivedMetrics, Percentiles, Result, UsageBundle, VibesError};
use vibes_percentile::PercentileSource;

use crate::acquisition::BundleResolver;
use crate::submission::SubmissionReceipt;

/// Client for the `/api/*` endpoints of a vibes server
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct StoreResponse {
    id: String,
}

impl ApiClient {
    /// Create a client for `base_url` with a per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, client })
    }

    /// Build a client from configuration; `None` when offline or no server is set
    pub fn from_config(config: &Config) -> Result<Option<Self>> {
        config
            .remote_url()
            .map(|url| Self::new(url, config.request_timeout))
            .transpose()
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    /// Submit a bundle; the server records it and ranks it against its population
    pub async fn submit(&self, bundle: &UsageBundle) -> Result<SubmissionReceipt> {
        let url = self.endpoint("submit");
        debug!("POST {}", url);
        let response = self.client.post(&url).json(bundle).send().await?;
        check_status(&url, response.status())?;

        let receipt: SubmissionReceipt = response.json().await?;
        info!(
            total = receipt.total_submission_count,
            "Server ranked bundle"
        );
        Ok(receipt)
    }

    /// Fetch a bundle parked under a short id
    ///
    /// A 404 maps to [`VibesError::BundleNotFound`].
    pub async fn fetch_bundle(&self, id: &str) -> Result<UsageBundle> {
        let id = vibes_codec::validate_short_id(id)?;
        let url = self.endpoint(&format!("bundle/{id}"));
        debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(VibesError::BundleNotFound(id.to_string()));
        }
        check_status(&url, response.status())?;

        let value: serde_json::Value = response.json().await?;
        UsageBundle::from_value(value)
    }

    /// Park a bundle on the server and return its short id
    pub async fn store_bundle(&self, bundle: &UsageBundle) -> Result<String> {
        let url = self.endpoint("store");
        debug!("POST {}", url);
        let response = self.client.post(&url).json(bundle).send().await?;
        check_status(&url, response.status())?;

        let stored: StoreResponse = response.json().await?;
        vibes_codec::validate_short_id(&stored.id)?;
        Ok(stored.id)
    }
}

fn check_status(endpoint: &str, status: StatusCode) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(VibesError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl PercentileSource for ApiClient {
    async fn percentiles(&self, bundle: &UsageBundle, _: &DerivedMetrics) -> Result<Percentiles> {
        Ok(self.submit(bundle).await?.percentiles)
    }

    fn name(&self) -> &str {
        "server"
    }
}

#[async_trait]
impl BundleResolver for ApiClient {
    async fn resolve(&self, id: &str) -> Result<Option<UsageBundle>> {
        match self.fetch_bundle(id).await {
            Ok(bundle) => Ok(Some(bundle)),
            Err(VibesError::BundleNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
