//! Population-relative percentile rank (Strategy A)
//!
//! For each dimension the rank is
//! `round(100 - below / population_size * 100)` where `below` counts the
//! entries strictly less than the candidate. Ties are not counted as
//! beaten, so a candidate equal to everyone ranks 100 before clamping and
//! one above everyone ranks 0.
//!
//! Reported ranks are clamped into `[1, 99]` to match the estimator; use
//! [`raw_rank`] when the unclamped value is needed.

use vibes_core::{Dimension, Percentiles, PopulationEntry};

use crate::clamp_percentile;

/// Unclamped reverse percentile rank of `value` within `sample`
///
/// Returns `None` for an empty sample.
///
/// # Examples
/// ```
/// use vibes_percentile::raw_rank;
///
/// let sample = [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0];
/// assert_eq!(raw_rank(95.0, &sample), Some(0.0));
/// assert_eq!(raw_rank(5.0, &sample), Some(100.0));
/// assert_eq!(raw_rank(1.0, &[]), None);
/// ```
pub fn raw_rank(value: f64, sample: &[f64]) -> Option<f64> {
    if sample.is_empty() {
        return None;
    }
    let mut sorted = sample.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(rank_sorted(value, &sorted))
}

/// Clamped reverse percentile rank; neutral 50 for an empty sample
pub fn rank(value: f64, sample: &[f64]) -> f64 {
    raw_rank(value, sample).map_or(Percentiles::NEUTRAL, clamp_percentile)
}

fn rank_sorted(value: f64, sorted: &[f64]) -> f64 {
    let below = sorted.partition_point(|&v| v < value);
    (100.0 - (below as f64 / sorted.len() as f64) * 100.0).round()
}

/// Percentiles of `candidate` against `population`
///
/// An empty population yields 50 on every dimension.
pub fn population_percentiles(
    candidate: &PopulationEntry,
    population: &[PopulationEntry],
) -> Percentiles {
    if population.is_empty() {
        return Percentiles::neutral();
    }

    Percentiles::from_fn(|dimension| {
        let mut sorted: Vec<f64> = population.iter().map(|e| e.value(dimension)).collect();
        sorted.sort_by(f64::total_cmp);
        clamp_percentile(rank_sorted(candidate.value(dimension), &sorted))
    })
}

/// Unclamped ranks of `candidate` per dimension, for diagnostics
pub fn raw_population_ranks(
    candidate: &PopulationEntry,
    population: &[PopulationEntry],
) -> Vec<(Dimension, Option<f64>)> {
    Dimension::ALL
        .into_iter()
        .map(|dimension| {
            let sample: Vec<f64> = population.iter().map(|e| e.value(dimension)).collect();
            (dimension, raw_rank(candidate.value(dimension), &sample))
        })
        .collect()
}
