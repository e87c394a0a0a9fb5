//! Unified percentile contract and the population → estimate fallback chain

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use vibes_core::{DerivedMetrics, Percentiles, PopulationEntry, Result, UsageBundle};

use crate::estimate::estimate_percentiles;
use crate::population::population_percentiles;

/// Compute percentiles with whichever strategy the input allows
///
/// `Some(population)` ranks against the sample (an empty sample yields the
/// neutral 50s); `None` falls through to the closed-form estimate.
///
/// # Examples
/// ```
/// use vibes_core::{DerivedMetrics, Percentiles};
/// use vibes_percentile::compute_percentiles;
///
/// let metrics = DerivedMetrics::default();
/// assert_eq!(compute_percentiles(&metrics, Some(&[])), Percentiles::neutral());
/// assert_eq!(compute_percentiles(&metrics, None).token_usage, 99.0);
/// ```
pub fn compute_percentiles(
    metrics: &DerivedMetrics,
    population: Option<&[PopulationEntry]>,
) -> Percentiles {
    match population {
        Some(population) => {
            population_percentiles(&PopulationEntry::from_metrics(metrics), population)
        }
        None => estimate_percentiles(metrics),
    }
}

/// A source of population-relative percentiles
///
/// Implemented by the remote server client and by the local submission
/// service. Both may fail; the engine owns the fallback.
#[async_trait]
pub trait PercentileSource: Send + Sync {
    /// Rank a bundle against the population
    async fn percentiles(
        &self,
        bundle: &UsageBundle,
        metrics: &DerivedMetrics,
    ) -> Result<Percentiles>;

    /// Short name used in logs
    fn name(&self) -> &str {
        "population"
    }
}

/// Which strategy produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PercentileOrigin {
    Population,
    Estimate,
}

/// Percentiles plus the strategy that produced them
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileOutcome {
    pub percentiles: Percentiles,
    pub origin: PercentileOrigin,
}

/// Percentile engine with an optional population source
///
/// The source is tried once under `timeout`. Any error or timeout
/// abandons the remote attempt and the local estimate is returned; the
/// engine itself never fails.
#[derive(Clone)]
pub struct PercentileEngine {
    source: Option<Arc<dyn PercentileSource>>,
    timeout: Duration,
}

impl PercentileEngine {
    /// Engine that only ever estimates
    pub fn offline() -> Self {
        Self {
            source: None,
            timeout: Duration::ZERO,
        }
    }

    /// Engine that consults `source` first
    pub fn with_source(source: Arc<dyn PercentileSource>, timeout: Duration) -> Self {
        Self {
            source: Some(source),
            timeout,
        }
    }

    /// Whether a population source is configured
    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// Rank `bundle`, falling back to the estimate on any source failure
    pub async fn compute(&self, bundle: &UsageBundle, metrics: &DerivedMetrics) -> PercentileOutcome {
        let Some(source) = &self.source else {
            debug!("No population source configured, estimating percentiles");
            return Self::estimated(metrics);
        };

        match tokio::time::timeout(self.timeout, source.percentiles(bundle, metrics)).await {
            Ok(Ok(percentiles)) => {
                info!(source = source.name(), "Using population percentiles");
                PercentileOutcome {
                    percentiles: sanitize(percentiles),
                    origin: PercentileOrigin::Population,
                }
            }
            Ok(Err(e)) => {
                warn!(
                    "Population source {} failed: {}, using estimated percentiles",
                    source.name(),
                    e
                );
                Self::estimated(metrics)
            }
            Err(_) => {
                warn!(
                    "Population source {} timed out after {:?}, using estimated percentiles",
                    source.name(),
                    self.timeout
                );
                Self::estimated(metrics)
            }
        }
    }

    fn estimated(metrics: &DerivedMetrics) -> PercentileOutcome {
        PercentileOutcome {
            percentiles: estimate_percentiles(metrics),
            origin: PercentileOrigin::Estimate,
        }
    }
}

impl std::fmt::Debug for PercentileEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PercentileEngine")
            .field("source", &self.source.as_ref().map(|s| s.name().to_string()))
            .field("timeout", &self.timeout)
            .finish()
    }
}

// Remote sources are untrusted; keep their values inside the reported range.
fn sanitize(percentiles: Percentiles) -> Percentiles {
    Percentiles::from_fn(|dimension| crate::clamp_percentile(percentiles.get(dimension)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vibes_core::VibesError;

    struct FixedSource(Percentiles);

    #[async_trait]
    impl PercentileSource for FixedSource {
        async fn percentiles(&self, _: &UsageBundle, _: &DerivedMetrics) -> Result<Percentiles> {
            Ok(self.0)
        }
    }

    struct FailingSource;

    #[async_trait]
    impl PercentileSource for FailingSource {
        async fn percentiles(&self, _: &UsageBundle, _: &DerivedMetrics) -> Result<Percentiles> {
            Err(VibesError::Store("population unavailable".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct SlowSource;

    #[async_trait]
    impl PercentileSource for SlowSource {
        async fn percentiles(&self, _: &UsageBundle, _: &DerivedMetrics) -> Result<Percentiles> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Percentiles::neutral())
        }
    }

    fn heavy_metrics() -> DerivedMetrics {
        DerivedMetrics {
            total_tokens: 2_000_000,
            total_sessions: 250,
            ..Default::default()
        }
    }

    #[test]
    fn test_compute_percentiles_selects_strategy() {
        let metrics = heavy_metrics();
        let population = vec![PopulationEntry::from_metrics(&DerivedMetrics::default()); 4];

        let ranked = compute_percentiles(&metrics, Some(&population));
        // Above everyone on tokens: raw 0, reported 1
        assert_eq!(ranked.token_usage, 1.0);

        let estimated = compute_percentiles(&metrics, None);
        assert_eq!(estimated, estimate_percentiles(&metrics));
    }

    #[tokio::test]
    async fn test_offline_engine_estimates() {
        let engine = PercentileEngine::offline();
        let metrics = heavy_metrics();
        let outcome = engine.compute(&UsageBundle::default(), &metrics).await;

        assert!(!engine.has_source());
        assert_eq!(outcome.origin, PercentileOrigin::Estimate);
        assert_eq!(outcome.percentiles, estimate_percentiles(&metrics));
    }

    #[tokio::test]
    async fn test_source_success_is_used_and_clamped() {
        let mut remote = Percentiles::neutral();
        remote.night_coding = 0.0;
        remote.token_usage = 100.0;
        let engine =
            PercentileEngine::with_source(Arc::new(FixedSource(remote)), Duration::from_secs(1));

        let outcome = engine.compute(&UsageBundle::default(), &heavy_metrics()).await;
        assert_eq!(outcome.origin, PercentileOrigin::Population);
        assert_eq!(outcome.percentiles.night_coding, 1.0);
        assert_eq!(outcome.percentiles.token_usage, 99.0);
        assert_eq!(outcome.percentiles.cache_efficiency, 50.0);
    }

    #[tokio::test]
    async fn test_source_failure_falls_back_to_estimate() {
        let engine = PercentileEngine::with_source(Arc::new(FailingSource), Duration::from_secs(1));
        let metrics = heavy_metrics();

        let outcome = engine.compute(&UsageBundle::default(), &metrics).await;
        assert_eq!(outcome.origin, PercentileOrigin::Estimate);
        assert_eq!(outcome.percentiles, estimate_percentiles(&metrics));
    }

    #[tokio::test]
    async fn test_source_timeout_falls_back_to_estimate() {
        let engine = PercentileEngine::with_source(Arc::new(SlowSource), Duration::from_millis(50));
        let metrics = heavy_metrics();

        let outcome = engine.compute(&UsageBundle::default(), &metrics).await;
        assert_eq!(outcome.origin, PercentileOrigin::Estimate);
    }

    #[test]
    fn test_engine_debug_names_source() {
        let engine = PercentileEngine::with_source(Arc::new(FailingSource), Duration::from_secs(2));
        assert!(format!("{engine:?}").contains("failing"));
    }
}
