//! Percentile engine for vibes
//!
//! Two interchangeable strategies produce the same six-field
//! [`Percentiles`](vibes_core::Percentiles):
//!
//! - [`population`]: reverse percentile rank against a sample of past
//!   submissions (Strategy A)
//! - [`estimate`]: hand-tuned closed-form curves for when no population is
//!   reachable (Strategy B)
//!
//! [`engine`] unifies them behind one contract and owns the fallback chain
//! from a (possibly remote) population source to the local estimate.

pub mod engine;
pub mod estimate;
pub mod population;

pub use engine::{
    PercentileEngine, PercentileOrigin, PercentileOutcome, PercentileSource, compute_percentiles,
};
pub use estimate::estimate_percentiles;
pub use population::{population_percentiles, rank, raw_population_ranks, raw_rank};

/// Lowest reported percentile
pub const MIN_PERCENTILE: f64 = 1.0;

/// Highest reported percentile
pub const MAX_PERCENTILE: f64 = 99.0;

/// Clamp a score into `[MIN_PERCENTILE, MAX_PERCENTILE]`
pub fn clamp_percentile(score: f64) -> f64 {
    if score.is_nan() {
        return MAX_PERCENTILE;
    }
    score.clamp(MIN_PERCENTILE, MAX_PERCENTILE)
}
