//! In-memory stores with capacity eviction

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use vibes_core::{
    AppendOutcome, BundleStore, Config, PopulationEntry, PopulationStore, Result, StoredBundle,
    UsageBundle, VibesError,
};

#[derive(Debug, Default)]
struct Population {
    entries: VecDeque<PopulationEntry>,
    total_recorded: u64,
}

impl Population {
    fn push(&mut self, entry: PopulationEntry, capacity: usize) -> AppendOutcome {
        self.entries.push_back(entry);
        while self.entries.len() > capacity {
            self.entries.pop_front();
        }
        self.total_recorded += 1;

        AppendOutcome {
            sample_size: self.entries.len(),
            total_recorded: self.total_recorded,
        }
    }
}

/// Population sample held in process memory
///
/// The capacity check and the push happen under one write lock, so
/// concurrent appends never leave the sample above capacity.
#[derive(Debug, Clone)]
pub struct MemoryPopulationStore {
    inner: Arc<RwLock<Population>>,
    capacity: usize,
}

impl MemoryPopulationStore {
    /// Create an empty store holding at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Population::default())),
            capacity: capacity.max(1),
        }
    }

    /// Create an empty store sized from configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.population_capacity)
    }

    /// Current number of entries
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    /// Whether the sample is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.entries.is_empty()
    }
}

#[async_trait]
impl PopulationStore for MemoryPopulationStore {
    async fn append(&self, entry: PopulationEntry) -> Result<AppendOutcome> {
        Ok(self.inner.write().await.push(entry, self.capacity))
    }

    async fn append_and_sample(
        &self,
        entry: PopulationEntry,
    ) -> Result<(AppendOutcome, Vec<PopulationEntry>)> {
        let mut population = self.inner.write().await;
        let outcome = population.push(entry, self.capacity);
        Ok((outcome, population.entries.iter().copied().collect()))
    }

    async fn sample(&self) -> Result<Vec<PopulationEntry>> {
        Ok(self.inner.read().await.entries.iter().copied().collect())
    }

    async fn total_recorded(&self) -> Result<u64> {
        Ok(self.inner.read().await.total_recorded)
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}

#[derive(Debug, Default)]
struct Bundles {
    by_id: HashMap<String, StoredBundle>,
    // Insertion order, oldest first
    order: VecDeque<String>,
}

impl Bundles {
    fn insert(&mut self, id: &str, stored: StoredBundle, capacity: usize) {
        if self.by_id.insert(id.to_string(), stored).is_some() {
            self.order.retain(|existing| existing != id);
        }
        self.order.push_back(id.to_string());

        while self.by_id.len() > capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.by_id.remove(&oldest);
            debug!(id = %oldest, "Evicted oldest bundle");
        }
    }
}

/// Short-id bundle store held in process memory
///
/// Entries expire after the configured TTL; past capacity the oldest
/// insertion is evicted.
#[derive(Debug, Clone)]
pub struct MemoryBundleStore {
    inner: Arc<RwLock<Bundles>>,
    capacity: usize,
    ttl: Duration,
}

impl MemoryBundleStore {
    /// Create an empty store
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Bundles::default())),
            capacity: capacity.max(1),
            ttl,
        }
    }

    /// Create an empty store sized from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let ttl = Duration::from_std(config.bundle_ttl)
            .map_err(|e| VibesError::Config(format!("bundle TTL out of range: {e}")))?;
        Ok(Self::new(config.bundle_capacity, ttl))
    }

    /// Current number of entries, expired ones included until purged
    pub async fn len(&self) -> usize {
        self.inner.read().await.by_id.len()
    }

    /// Whether the store holds no entries
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.by_id.is_empty()
    }

    /// Full stored record for `id`, expired or not
    pub async fn record(&self, id: &str) -> Option<StoredBundle> {
        self.inner.read().await.by_id.get(id).cloned()
    }

    /// Drop every expired entry, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now()).await
    }

    fn stamp(&self, bundle: UsageBundle) -> StoredBundle {
        let stored_at = Utc::now();
        StoredBundle {
            bundle,
            stored_at,
            expires_at: stored_at + self.ttl,
        }
    }

    async fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut bundles = self.inner.write().await;
        let before = bundles.by_id.len();
        bundles.by_id.retain(|_, stored| stored.expires_at > now);
        let Bundles { by_id, order } = &mut *bundles;
        order.retain(|id| by_id.contains_key(id));
        let removed = before - by_id.len();
        if removed > 0 {
            debug!(removed, "Purged expired bundles");
        }
        removed
    }
}

#[async_trait]
impl BundleStore for MemoryBundleStore {
    async fn put(&self, id: &str, bundle: UsageBundle) -> Result<()> {
        let stored = self.stamp(bundle);
        self.inner.write().await.insert(id, stored, self.capacity);
        Ok(())
    }

    async fn put_if_absent(&self, id: &str, bundle: UsageBundle) -> Result<bool> {
        let stored = self.stamp(bundle);
        let mut bundles = self.inner.write().await;
        let taken = bundles
            .by_id
            .get(id)
            .is_some_and(|existing| existing.expires_at > stored.stored_at);
        if taken {
            return Ok(false);
        }
        bundles.insert(id, stored, self.capacity);
        Ok(true)
    }

    async fn get(&self, id: &str) -> Result<Option<UsageBundle>> {
        let bundles = self.inner.read().await;
        Ok(bundles
            .by_id
            .get(id)
            .filter(|stored| stored.expires_at > Utc::now())
            .map(|stored| stored.bundle.clone()))
    }
}
