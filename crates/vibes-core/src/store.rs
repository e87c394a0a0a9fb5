//! Storage traits for population samples and short-id bundles
//!
//! The percentile engine and the submission layer depend on these traits
//! rather than on a concrete backend, so any store (in-memory, a key-value
//! service, a fixture in tests) can be injected.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::metrics::DerivedMetrics;
use crate::types::{Dimension, UsageBundle};

/// One past submission's metrics, as kept in the population sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationEntry {
    pub total_tokens: u64,
    pub tool_diversity: usize,
    pub night_percentage: f64,
    pub longest_session_minutes: f64,
    pub cache_rate: f64,
    pub total_sessions: u64,
}

impl PopulationEntry {
    /// Project derived metrics onto the six tracked dimensions
    pub fn from_metrics(metrics: &DerivedMetrics) -> Self {
        Self {
            total_tokens: metrics.total_tokens,
            tool_diversity: metrics.tool_diversity,
            night_percentage: metrics.night_percentage,
            longest_session_minutes: metrics.longest_session_minutes,
            cache_rate: metrics.cache_rate,
            total_sessions: metrics.total_sessions,
        }
    }

    /// Raw value of one dimension
    pub fn value(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::TokenUsage => self.total_tokens as f64,
            Dimension::ToolDiversity => self.tool_diversity as f64,
            Dimension::NightCoding => self.night_percentage,
            Dimension::SessionLength => self.longest_session_minutes,
            Dimension::CacheEfficiency => self.cache_rate,
            Dimension::TotalSessions => self.total_sessions as f64,
        }
    }
}

/// Outcome of recording one submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendOutcome {
    /// Entries held after the append (and any eviction)
    pub sample_size: usize,
    /// Submissions ever recorded, including evicted ones
    pub total_recorded: u64,
}

/// Append-only population sample with capacity-bound eviction
///
/// `append` must apply the size check atomically with the push: under
/// concurrent writers the sample never exceeds its capacity and every
/// submission is either fully recorded or not recorded at all.
#[async_trait]
pub trait PopulationStore: Send + Sync {
    /// Record one submission, evicting the oldest entry past capacity
    async fn append(&self, entry: PopulationEntry) -> Result<AppendOutcome>;

    /// Record one submission and snapshot the sample it joined
    ///
    /// Both happen under one guard, so the returned sample always holds the
    /// new entry even when concurrent appends are evicting.
    async fn append_and_sample(
        &self,
        entry: PopulationEntry,
    ) -> Result<(AppendOutcome, Vec<PopulationEntry>)>;

    /// Snapshot of the current sample, oldest first
    async fn sample(&self) -> Result<Vec<PopulationEntry>>;

    /// Submissions ever recorded, including evicted ones
    async fn total_recorded(&self) -> Result<u64>;

    /// Maximum number of entries retained
    fn capacity(&self) -> usize;
}

/// A bundle parked under a short id
#[derive(Debug, Clone, PartialEq)]
pub struct StoredBundle {
    pub bundle: UsageBundle,
    pub stored_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Server-side storage behind the short-id indirection path
#[async_trait]
pub trait BundleStore: Send + Sync {
    /// Store a bundle under `id`, evicting the oldest past capacity
    async fn put(&self, id: &str, bundle: UsageBundle) -> Result<()>;

    /// Store a bundle only if `id` holds no live bundle
    ///
    /// Returns `false` when the id is taken. An expired entry counts as free.
    async fn put_if_absent(&self, id: &str, bundle: UsageBundle) -> Result<bool>;

    /// Fetch a bundle; unknown and expired ids both yield `None`
    async fn get(&self, id: &str) -> Result<Option<UsageBundle>>;
}
