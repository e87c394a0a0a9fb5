//! Submission service
//!
//! The server side of the percentile exchange: records each submitted
//! bundle's metrics in a [`PopulationStore`], ranks the bundle against the
//! population it just joined and keeps the landing-page counters. It also
//! parks bundles under short ids for the indirection path.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use vibes_core::metrics::{derive, saturating_sum};
use vibes_core::{
    BundleStore, DerivedMetrics, Percentiles, PopulationEntry, PopulationStore, Result, UsageBundle,
};
use vibes_percentile::{PercentileSource, population_percentiles};
use vibes_persona::{PersonaId, classify};

use crate::acquisition::BundleResolver;

/// Number of most recent submissions averaged for `avgSessions`
pub const RECENT_WINDOW: usize = 100;

/// Attempts at finding an unused short id before giving up
const SHORT_ID_ATTEMPTS: usize = 5;

/// Result of one submission
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub percentiles: Percentiles,
    #[serde(alias = "totalWraps")]
    pub total_submission_count: u64,
}

/// Aggregate counters for the landing page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    pub total_wraps: u64,
    pub total_tokens_processed: u64,
    pub top_persona: PersonaId,
    pub avg_sessions: u64,
}

#[derive(Debug, Default)]
struct Counters {
    personas: BTreeMap<PersonaId, u64>,
    tokens_processed: u64,
}

impl Counters {
    // Highest tally wins; ties go to the persona listed first in the catalog
    fn top_persona(&self) -> PersonaId {
        self.personas
            .iter()
            .fold(None, |best: Option<(PersonaId, u64)>, (&id, &count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((id, count)),
            })
            .map_or(PersonaId::DEFAULT, |(id, _)| id)
    }
}

/// Records submissions and ranks them against the stored population
pub struct SubmissionService<S> {
    population: S,
    bundles: Option<Arc<dyn BundleStore>>,
    counters: RwLock<Counters>,
}

impl<S: PopulationStore> SubmissionService<S> {
    /// Service over `population` without short-id storage
    pub fn new(population: S) -> Self {
        Self {
            population,
            bundles: None,
            counters: RwLock::new(Counters::default()),
        }
    }

    /// Enable short-id storage through `bundles`
    pub fn with_bundle_store(mut self, bundles: Arc<dyn BundleStore>) -> Self {
        self.bundles = Some(bundles);
        self
    }

    /// Underlying population store
    pub fn population(&self) -> &S {
        &self.population
    }

    /// Submit a bundle
    pub async fn submit(&self, bundle: &UsageBundle) -> Result<SubmissionReceipt> {
        let metrics = derive(bundle);
        let persona = classify(&metrics, bundle);
        self.submit_metrics(&metrics, persona).await
    }

    /// Record precomputed metrics and rank them
    ///
    /// The candidate joins the population before ranking, so the first
    /// ever submission is ranked against itself. The sample it is ranked
    /// against is taken in the same step as the append and always holds it.
    pub async fn submit_metrics(
        &self,
        metrics: &DerivedMetrics,
        persona: PersonaId,
    ) -> Result<SubmissionReceipt> {
        let entry = PopulationEntry::from_metrics(metrics);
        let (appended, sample) = self.population.append_and_sample(entry).await?;

        {
            let mut counters = self.counters.write().await;
            *counters.personas.entry(persona).or_default() += 1;
            counters.tokens_processed = counters
                .tokens_processed
                .saturating_add(metrics.total_tokens);
        }

        let percentiles = population_percentiles(&entry, &sample);
        debug!(
            sample_size = sample.len(),
            recorded = appended.total_recorded,
            "Ranked submission"
        );

        Ok(SubmissionReceipt {
            percentiles,
            total_submission_count: appended.total_recorded,
        })
    }

    /// Rank metrics against the current population without recording them
    pub async fn rank(&self, metrics: &DerivedMetrics) -> Result<Percentiles> {
        let sample = self.population.sample().await?;
        Ok(population_percentiles(
            &PopulationEntry::from_metrics(metrics),
            &sample,
        ))
    }

    /// Landing-page counters
    pub async fn global_stats(&self) -> Result<GlobalStats> {
        let sample = self.population.sample().await?;
        let recent = &sample[sample.len().saturating_sub(RECENT_WINDOW)..];
        let avg_sessions = if recent.is_empty() {
            0
        } else {
            let total = saturating_sum(recent.iter().map(|e| e.total_sessions));
            (total as f64 / recent.len() as f64).round() as u64
        };

        let total_wraps = self.population.total_recorded().await?;
        let counters = self.counters.read().await;
        Ok(GlobalStats {
            total_wraps,
            total_tokens_processed: counters.tokens_processed,
            top_persona: counters.top_persona(),
            avg_sessions,
        })
    }

    /// Park a bundle under a fresh short id
    pub async fn store_bundle(&self, bundle: UsageBundle) -> Result<String> {
        let Some(store) = &self.bundles else {
            return Err(vibes_core::VibesError::Store(
                "short-id storage is not enabled".to_string(),
            ));
        };

        for _ in 0..SHORT_ID_ATTEMPTS {
            let id = vibes_codec::generate_short_id();
            if store.put_if_absent(&id, bundle.clone()).await? {
                info!(id = %id, "Stored bundle");
                return Ok(id);
            }
            debug!(id = %id, "Short id collision, retrying");
        }
        Err(vibes_core::VibesError::Store(
            "could not allocate an unused short id".to_string(),
        ))
    }

    /// Look up a parked bundle; unknown and expired ids yield `None`
    pub async fn fetch_bundle(&self, id: &str) -> Result<Option<UsageBundle>> {
        let id = vibes_codec::validate_short_id(id)?;
        match &self.bundles {
            Some(store) => store.get(id).await,
            None => Ok(None),
        }
    }
}

#[async_trait]
impl<S: PopulationStore> PercentileSource for SubmissionService<S> {
    async fn percentiles(&self, bundle: &UsageBundle, metrics: &DerivedMetrics) -> Result<Percentiles> {
        let persona = classify(metrics, bundle);
        Ok(self.submit_metrics(metrics, persona).await?.percentiles)
    }

    fn name(&self) -> &str {
        "local population"
    }
}

#[async_trait]
impl<S: PopulationStore> BundleResolver for SubmissionService<S> {
    async fn resolve(&self, id: &str) -> Result<Option<UsageBundle>> {
        self.fetch_bundle(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use futures::future::join_all;
    use vibes_core::TokenCounts;
    use vibes_core::VibesError;
    use vibes_store::{MemoryBundleStore, MemoryPopulationStore};

    fn metrics(total_tokens: u64, total_sessions: u64) -> DerivedMetrics {
        DerivedMetrics {
            total_tokens,
            total_sessions,
            ..Default::default()
        }
    }

    fn service(capacity: usize) -> SubmissionService<MemoryPopulationStore> {
        SubmissionService::new(MemoryPopulationStore::new(capacity))
    }

    #[tokio::test]
    async fn test_first_submission_ranks_against_itself() {
        let service = service(10);
        let receipt = service
            .submit_metrics(&metrics(1_000, 5), PersonaId::NightOwl)
            .await
            .unwrap();

        // Equal to everyone: raw 100, reported 99
        assert_eq!(receipt.percentiles.token_usage, 99.0);
        assert_eq!(receipt.total_submission_count, 1);
    }

    #[tokio::test]
    async fn test_heaviest_submission_ranks_top() {
        let service = service(100);
        for tokens in (1..=9).map(|i| i * 10) {
            service
                .submit_metrics(&metrics(tokens, 1), PersonaId::DEFAULT)
                .await
                .unwrap();
        }
        let receipt = service
            .submit_metrics(&metrics(95, 1), PersonaId::DEFAULT)
            .await
            .unwrap();

        // 9 of 10 entries are below: round(100 - 90) = 10
        assert_eq!(receipt.percentiles.token_usage, 10.0);
        assert_eq!(receipt.total_submission_count, 10);
    }

    #[tokio::test]
    async fn test_rank_does_not_record() {
        let service = service(10);
        assert_eq!(
            service.rank(&metrics(10, 1)).await.unwrap(),
            Percentiles::neutral()
        );
        service.submit_metrics(&metrics(10, 1), PersonaId::DEFAULT).await.unwrap();
        service.submit_metrics(&metrics(20, 1), PersonaId::DEFAULT).await.unwrap();

        let ranked = service.rank(&metrics(15, 1)).await.unwrap();
        assert_eq!(ranked.token_usage, 50.0);
        assert_eq!(service.global_stats().await.unwrap().total_wraps, 2);
    }

    #[tokio::test]
    async fn test_global_stats() {
        let service = service(1_000);
        let empty = service.global_stats().await.unwrap();
        assert_eq!(empty.total_wraps, 0);
        assert_eq!(empty.top_persona, PersonaId::DEFAULT);
        assert_eq!(empty.avg_sessions, 0);

        service.submit_metrics(&metrics(100, 10), PersonaId::NightOwl).await.unwrap();
        service.submit_metrics(&metrics(200, 21), PersonaId::TokenTitan).await.unwrap();
        // One each: the persona listed first in the catalog wins the tie
        assert_eq!(
            service.global_stats().await.unwrap().top_persona,
            PersonaId::TokenTitan
        );

        service.submit_metrics(&metrics(300, 30), PersonaId::NightOwl).await.unwrap();
        let stats = service.global_stats().await.unwrap();
        assert_eq!(stats.total_wraps, 3);
        assert_eq!(stats.total_tokens_processed, 600);
        assert_eq!(stats.top_persona, PersonaId::NightOwl);
        assert_eq!(stats.avg_sessions, 20);
    }

    #[tokio::test]
    async fn test_avg_sessions_uses_recent_window() {
        let service = service(1_000);
        for _ in 0..50 {
            service.submit_metrics(&metrics(1, 1_000), PersonaId::DEFAULT).await.unwrap();
        }
        for _ in 0..RECENT_WINDOW {
            service.submit_metrics(&metrics(1, 10), PersonaId::DEFAULT).await.unwrap();
        }
        assert_eq!(service.global_stats().await.unwrap().avg_sessions, 10);
    }

    #[tokio::test]
    async fn test_submit_bundle_classifies() {
        let service = service(10);
        let mut bundle = UsageBundle::default();
        bundle.stats.total_tokens = TokenCounts::new(6_000_000, 1_000_000, 5_000_000);
        service.submit(&bundle).await.unwrap();

        assert_eq!(
            service.global_stats().await.unwrap().top_persona,
            PersonaId::TokenTitan
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submissions_are_all_counted() {
        let service = Arc::new(service(64));
        let tasks = (0..256u64).map(|i| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                service
                    .submit_metrics(&metrics(i, i), PersonaId::DEFAULT)
                    .await
            })
        });
        for result in join_all(tasks).await {
            result.unwrap().unwrap();
        }

        assert_eq!(service.global_stats().await.unwrap().total_wraps, 256);
        assert_eq!(service.population().sample().await.unwrap().len(), 64);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submissions_rank_against_own_entry() {
        // With room for one entry, each candidate must still see itself
        let service = Arc::new(service(1));
        let tasks = (0..128u64).map(|i| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                service
                    .submit_metrics(&metrics(i * 1_000, i), PersonaId::DEFAULT)
                    .await
            })
        });
        for result in join_all(tasks).await {
            let receipt = result.unwrap().unwrap();
            assert_eq!(receipt.percentiles.token_usage, 99.0);
            assert_eq!(receipt.percentiles.total_sessions, 99.0);
        }
    }

    #[tokio::test]
    async fn test_shared_population_counts_every_service() {
        let population = MemoryPopulationStore::new(10);
        let first = SubmissionService::new(population.clone());
        let second = SubmissionService::new(population);

        first.submit_metrics(&metrics(1, 1), PersonaId::DEFAULT).await.unwrap();
        let receipt = second
            .submit_metrics(&metrics(2, 1), PersonaId::DEFAULT)
            .await
            .unwrap();

        assert_eq!(receipt.total_submission_count, 2);
        assert_eq!(first.global_stats().await.unwrap().total_wraps, 2);
    }

    #[tokio::test]
    async fn test_avg_sessions_saturates() {
        let service = service(10);
        for _ in 0..2 {
            service
                .submit_metrics(&metrics(1, u64::MAX), PersonaId::DEFAULT)
                .await
                .unwrap();
        }
        let stats = service.global_stats().await.unwrap();
        assert_eq!(stats.avg_sessions, (u64::MAX as f64 / 2.0).round() as u64);
    }

    #[tokio::test]
    async fn test_stored_bundles_get_distinct_ids() {
        let store = Arc::new(MemoryBundleStore::new(100, Duration::days(1)));
        let service = service(10).with_bundle_store(store.clone());

        let mut ids = Vec::new();
        for sessions in 0..20 {
            let mut bundle = UsageBundle::default();
            bundle.stats.total_sessions = sessions;
            ids.push(service.store_bundle(bundle).await.unwrap());
        }
        for (sessions, id) in ids.iter().enumerate() {
            let fetched = store.get(id).await.unwrap().unwrap();
            assert_eq!(fetched.stats.total_sessions, sessions as u64);
        }
        let distinct: std::collections::HashSet<&String> = ids.iter().collect();
        assert_eq!(distinct.len(), ids.len());
    }

    #[tokio::test]
    async fn test_short_id_storage() {
        let store = Arc::new(MemoryBundleStore::new(10, Duration::days(365)));
        let service = service(10).with_bundle_store(store);

        let mut bundle = UsageBundle::default();
        bundle.stats.total_sessions = 3;
        let id = service.store_bundle(bundle.clone()).await.unwrap();

        assert_eq!(id.len(), vibes_codec::SHORT_ID_LEN);
        assert_eq!(service.fetch_bundle(&id).await.unwrap(), Some(bundle));
        assert_eq!(service.fetch_bundle("zzzzzzzz").await.unwrap(), None);
        assert!(matches!(
            service.fetch_bundle("bad id").await,
            Err(VibesError::InvalidShortId(_))
        ));
    }

    #[tokio::test]
    async fn test_store_without_bundle_store_fails() {
        let result = service(10).store_bundle(UsageBundle::default()).await;
        assert!(matches!(result, Err(VibesError::Store(_))));
    }

    #[test]
    fn test_receipt_accepts_server_field_name() {
        let json = r#"{"percentiles": {"tokenUsage": 5, "toolDiversity": 50, "nightCoding": 50,
            "sessionLength": 50, "cacheEfficiency": 50, "totalSessions": 50}, "totalWraps": 42}"#;
        let receipt: SubmissionReceipt = serde_json::from_str(json).unwrap();
        assert_eq!(receipt.total_submission_count, 42);
        assert_eq!(receipt.percentiles.token_usage, 5.0);
    }
}
