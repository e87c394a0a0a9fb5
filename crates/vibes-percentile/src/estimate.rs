//! Closed-form percentile estimate (Strategy B)
//!
//! Used when no population is reachable. Volume metrics (tokens, sessions,
//! session length) go through a log10 curve, rate metrics (cache rate,
//! night share) and the small tool count through a linear one. Every curve
//! is monotonic: more activity never yields a less extreme score. The
//! coefficients are tuning parameters calibrated so that typical bundles
//! land near the population ranks, not part of the contract.

use vibes_core::{DerivedMetrics, Percentiles};

use crate::clamp_percentile;

/// Token count treated as the baseline user
pub const TOKEN_BASELINE: f64 = 1_000.0;
/// Points per decade of tokens above the baseline
pub const TOKEN_LOG_WEIGHT: f64 = 15.0;
/// Points per distinct tool used
pub const TOOL_WEIGHT: f64 = 12.0;
/// Points per unit of night share
pub const NIGHT_WEIGHT: f64 = 200.0;
/// Session length (minutes) treated as the baseline
pub const SESSION_LENGTH_BASELINE: f64 = 10.0;
/// Points per decade of session length above the baseline
pub const SESSION_LENGTH_LOG_WEIGHT: f64 = 20.0;
/// Points per unit of cache rate
pub const CACHE_WEIGHT: f64 = 100.0;
/// Session count treated as the baseline
pub const SESSION_COUNT_BASELINE: f64 = 10.0;
/// Points per decade of sessions above the baseline
pub const SESSION_COUNT_LOG_WEIGHT: f64 = 20.0;

/// Estimate percentiles from metrics alone
///
/// Every field is clamped into `[1, 99]`.
///
/// # Examples
/// ```
/// use vibes_core::DerivedMetrics;
/// use vibes_percentile::estimate_percentiles;
///
/// let idle = estimate_percentiles(&DerivedMetrics::default());
/// assert_eq!(idle.token_usage, 99.0);
///
/// let heavy = DerivedMetrics { total_tokens: 50_000_000, ..Default::default() };
/// assert!(estimate_percentiles(&heavy).token_usage < 40.0);
/// ```
pub fn estimate_percentiles(metrics: &DerivedMetrics) -> Percentiles {
    Percentiles {
        token_usage: log_curve(
            metrics.total_tokens as f64,
            TOKEN_BASELINE,
            TOKEN_LOG_WEIGHT,
        ),
        tool_diversity: clamp_percentile(100.0 - metrics.tool_diversity as f64 * TOOL_WEIGHT),
        night_coding: clamp_percentile(100.0 - metrics.night_percentage * NIGHT_WEIGHT),
        session_length: log_curve(
            metrics.longest_session_minutes,
            SESSION_LENGTH_BASELINE,
            SESSION_LENGTH_LOG_WEIGHT,
        ),
        cache_efficiency: clamp_percentile(100.0 - metrics.clamped_cache_rate() * CACHE_WEIGHT),
        total_sessions: log_curve(
            metrics.total_sessions as f64,
            SESSION_COUNT_BASELINE,
            SESSION_COUNT_LOG_WEIGHT,
        ),
    }
}

// Values below 1 are floored so log10 stays finite; they clamp to 99 anyway.
fn log_curve(value: f64, baseline: f64, weight: f64) -> f64 {
    clamp_percentile(100.0 - (value.max(1.0) / baseline).log10() * weight)
}
