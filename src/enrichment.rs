//! Enrichment pipeline
//!
//! Turns an acquired bundle into the view-model renderers consume: the
//! original bundle fields plus `percentiles`, the resolved `persona` and
//! the roast lines the bundle earned.
//! Percentiles come from the engine's population → estimate chain; the
//! persona from the classifier (or the bundle's own `personaId`).

use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use vibes_core::metrics::derive;
use vibes_core::{Config, DerivedMetrics, Percentiles, Result, UsageBundle};
use vibes_percentile::{PercentileEngine, PercentileOrigin};
use vibes_persona::{PersonaDefinition, Roasts, classify, roasts_for};

use crate::acquisition::AcquiredBundle;
use crate::client::ApiClient;

/// Enriched view-model, read-only for renderers
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WrappedView {
    /// The bundle, with `personaId` set to the resolved persona
    #[serde(flatten)]
    pub bundle: UsageBundle,
    pub percentiles: Percentiles,
    pub persona: &'static PersonaDefinition,
    /// Short id the bundle was loaded from, kept for re-sharing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,
    /// Strategy that produced the percentiles
    pub percentile_source: PercentileOrigin,
    #[serde(skip_serializing_if = "Roasts::is_empty")]
    pub roasts: Roasts,
    #[serde(skip)]
    pub metrics: DerivedMetrics,
}

/// Runs derive → percentiles → classify over a bundle
#[derive(Debug, Clone)]
pub struct Enricher {
    engine: PercentileEngine,
}

impl Enricher {
    /// Enricher using `engine` for percentiles
    pub fn new(engine: PercentileEngine) -> Self {
        Self { engine }
    }

    /// Enricher that never leaves the process
    pub fn offline() -> Self {
        Self::new(PercentileEngine::offline())
    }

    /// Enricher backed by the configured server, or offline without one
    pub fn from_config(config: &Config) -> Result<Self> {
        let engine = match ApiClient::from_config(config)? {
            Some(client) => PercentileEngine::with_source(Arc::new(client), config.request_timeout),
            None => PercentileEngine::offline(),
        };
        Ok(Self::new(engine))
    }

    /// Enrich an acquired bundle, keeping its short id
    pub async fn enrich_acquired(&self, acquired: AcquiredBundle) -> WrappedView {
        let bundle_id = acquired.bundle_id().map(str::to_string);
        self.enrich(acquired.bundle, bundle_id).await
    }

    /// Enrich a bundle
    ///
    /// Never fails: a population source failure degrades to estimated
    /// percentiles and an unknown persona id to the default persona.
    pub async fn enrich(&self, mut bundle: UsageBundle, bundle_id: Option<String>) -> WrappedView {
        let metrics = derive(&bundle);
        let outcome = self.engine.compute(&bundle, &metrics).await;
        let persona = classify(&metrics, &bundle).definition();
        let roasts = roasts_for(&bundle);
        info!(
            persona = %persona.id,
            source = ?outcome.origin,
            "Enriched bundle"
        );

        bundle.persona_id = Some(persona.id.as_str().to_string());
        WrappedView {
            bundle,
            percentiles: outcome.percentiles,
            persona,
            bundle_id,
            percentile_source: outcome.origin,
            roasts,
            metrics,
        }
    }
}
