//! Metrics deriver
//!
//! Pure functions computing the scalar metrics that both the percentile
//! engine and the persona classifier consume. Every ratio guards its
//! denominator with `max(denominator, 1)`, so a bundle with no recorded
//! activity yields zero-valued ratios instead of NaN or infinity.
//!
//! The night and dawn hour sets are part of the contract: the estimator
//! and the classifier must agree on them, so they live here as constants
//! rather than in configuration.
//!
//! # Examples
//!
//! ```
//! use vibes_core::metrics::derive;
//! use vibes_core::types::{TokenCounts, UsageBundle};
//!
//! let mut bundle = UsageBundle::default();
//! bundle.stats.total_tokens = TokenCounts::new(1_000_000, 500_000, 750_000);
//! bundle.stats.hour_counts[2] = 100;
//!
//! let metrics = derive(&bundle);
//! assert_eq!(metrics.total_tokens, 1_500_000);
//! assert_eq!(metrics.cache_rate, 0.75);
//! assert_eq!(metrics.night_percentage, 1.0);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::UsageBundle;

/// Hours counted as night coding (10 PM through 4 AM)
pub const NIGHT_HOURS: [usize; 7] = [22, 23, 0, 1, 2, 3, 4];

/// Hours counted as dawn coding (5 AM through 8 AM)
pub const DAWN_HOURS: [usize; 4] = [5, 6, 7, 8];

/// Tool whose dominance feeds the tool-dominance persona
pub const DOMINANT_TOOL: &str = "Bash";

/// Model whose share feeds the over-provisioning persona
pub const PREMIUM_MODEL: &str = "opus";

/// Derived scalar metrics for one bundle
///
/// Lifetime is a single classification or percentile pass; the struct is
/// cheap to recompute and carries the handful of raw counters the
/// downstream consumers read next to the ratios.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    /// Input plus output tokens
    pub total_tokens: u64,
    /// Cached tokens over input tokens; may exceed 1.0 on inconsistent input
    pub cache_rate: f64,
    /// Distinct tools with a nonzero call count
    pub tool_diversity: usize,
    /// Sum of per-tool call counts
    pub total_tool_calls: u64,
    /// Share of tool calls that went to [`DOMINANT_TOOL`]
    pub bash_ratio: f64,
    /// Share of hourly activity inside [`NIGHT_HOURS`]
    pub night_percentage: f64,
    /// Share of hourly activity inside [`DAWN_HOURS`]
    pub dawn_percentage: f64,
    /// Share of model tokens that went to [`PREMIUM_MODEL`]
    pub opus_percentage: f64,
    /// Carried from `stats.totalSessions`
    pub total_sessions: u64,
    /// Carried from `stats.longestSessionMinutes`
    pub longest_session_minutes: f64,
    /// Carried from `stats.projectCount`
    pub project_count: u64,
}

impl DerivedMetrics {
    /// Cache rate clamped into `[0, 1]` for consumers that need a true ratio
    pub fn clamped_cache_rate(&self) -> f64 {
        self.cache_rate.clamp(0.0, 1.0)
    }
}

/// Compute derived metrics for a bundle
///
/// Total and side-effect free: calling it twice on the same bundle yields
/// bit-identical output.
pub fn derive(bundle: &UsageBundle) -> DerivedMetrics {
    let stats = &bundle.stats;
    let total_tool_calls = saturating_sum(stats.tool_usage.values().copied());
    let hour_total = saturating_sum(stats.hour_counts.iter().copied());

    DerivedMetrics {
        total_tokens: stats.total_tokens.total(),
        cache_rate: ratio(stats.total_tokens.cached, stats.total_tokens.input),
        tool_diversity: stats.tool_usage.values().filter(|&&count| count > 0).count(),
        total_tool_calls,
        bash_ratio: tool_ratio(&stats.tool_usage, DOMINANT_TOOL),
        night_percentage: ratio(hour_sum(&stats.hour_counts, &NIGHT_HOURS), hour_total),
        dawn_percentage: ratio(hour_sum(&stats.hour_counts, &DAWN_HOURS), hour_total),
        opus_percentage: model_share(&stats.model_usage, PREMIUM_MODEL),
        total_sessions: stats.total_sessions,
        longest_session_minutes: stats.longest_session_minutes.max(0.0),
        project_count: stats.project_count,
    }
}

/// `numerator / max(denominator, 1)`
pub fn ratio(numerator: u64, denominator: u64) -> f64 {
    numerator as f64 / denominator.max(1) as f64
}

/// Share of all tool calls that went to `tool`
pub fn tool_ratio(tool_usage: &BTreeMap<String, u64>, tool: &str) -> f64 {
    let total = saturating_sum(tool_usage.values().copied());
    ratio(tool_usage.get(tool).copied().unwrap_or(0), total)
}

/// Share of all model tokens that went to `model`
pub fn model_share(model_usage: &BTreeMap<String, u64>, model: &str) -> f64 {
    let total = saturating_sum(model_usage.values().copied());
    ratio(model_usage.get(model).copied().unwrap_or(0), total)
}

/// Sum of the histogram buckets named in `hours`
pub fn hour_sum(hour_counts: &[u64; 24], hours: &[usize]) -> u64 {
    saturating_sum(hours.iter().map(|&h| hour_counts[h]))
}

/// Sum that stops at `u64::MAX` instead of overflowing
///
/// A subset never sums past its superset, so shares stay within `[0, 1]`
/// even for counts near the limit.
pub fn saturating_sum(values: impl IntoIterator<Item = u64>) -> u64 {
    values.into_iter().fold(0, u64::saturating_add)
}
