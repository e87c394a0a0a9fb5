//! Batch loading and classification of bundle files
//!
//! A bundle file holds either the bundle JSON or an encoded inline
//! payload (the `d` value of a share link). Files are read and parsed on
//! rayon's pool from inside `spawn_blocking`, so a large batch neither
//! blocks the async runtime nor runs serially.

use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use vibes_core::metrics::derive;
use vibes_core::{DerivedMetrics, Percentiles, PopulationStore, Result, UsageBundle, VibesError};
use vibes_persona::{Classification, PersonaId, classify, explain};

use crate::submission::SubmissionService;

/// Read one bundle file, accepting JSON or an encoded payload
pub fn load_bundle(path: &Path) -> Result<UsageBundle> {
    let content = std::fs::read_to_string(path)?;
    parse_bundle(&content)
}

/// Parse bundle text, accepting JSON or an encoded payload
pub fn parse_bundle(content: &str) -> Result<UsageBundle> {
    let trimmed = content.trim();
    if trimmed.starts_with('{') {
        UsageBundle::from_json(trimmed)
    } else {
        vibes_codec::decode(trimmed)
    }
}

/// Load many bundle files in parallel, keeping input order
pub async fn load_bundles(paths: Vec<PathBuf>) -> Result<Vec<(PathBuf, Result<UsageBundle>)>> {
    debug!("Loading {} bundle files", paths.len());
    tokio::task::spawn_blocking(move || {
        paths
            .into_par_iter()
            .map(|path| {
                let bundle = load_bundle(&path);
                (path, bundle)
            })
            .collect()
    })
    .await
    .map_err(|e| VibesError::Io(std::io::Error::other(e)))
}

/// Classification result for one file
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedFile {
    pub path: PathBuf,
    pub classification: Classification,
    pub metrics: DerivedMetrics,
}

impl ClassifiedFile {
    /// Derive and classify an already loaded bundle
    pub fn from_bundle(path: PathBuf, bundle: &UsageBundle) -> Self {
        let metrics = derive(bundle);
        Self {
            path,
            classification: explain(&metrics, bundle),
            metrics,
        }
    }
}

/// Classify many bundle files in parallel
///
/// Per-file failures are returned next to their path rather than
/// aborting the batch.
pub async fn classify_files(
    paths: Vec<PathBuf>,
) -> Result<Vec<(PathBuf, Result<ClassifiedFile>)>> {
    tokio::task::spawn_blocking(move || {
        paths
            .into_par_iter()
            .map(|path| {
                let classified =
                    load_bundle(&path).map(|bundle| ClassifiedFile::from_bundle(path.clone(), &bundle));
                (path, classified)
            })
            .collect()
    })
    .await
    .map_err(|e| VibesError::Io(std::io::Error::other(e)))
}

/// Percentiles of one file against the whole batch
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedFile {
    pub path: PathBuf,
    pub persona: PersonaId,
    pub percentiles: Percentiles,
}

/// Submit every bundle, then rank each against the resulting population
///
/// Ranking after all submissions keeps the result independent of the
/// order the files were given in.
pub async fn rank_bundles<S: PopulationStore>(
    service: &SubmissionService<S>,
    bundles: Vec<(PathBuf, UsageBundle)>,
) -> Result<Vec<RankedFile>> {
    let mut pending = Vec::with_capacity(bundles.len());
    for (path, bundle) in bundles {
        let metrics = derive(&bundle);
        let persona = classify(&metrics, &bundle);
        service.submit_metrics(&metrics, persona).await?;
        pending.push((path, persona, metrics));
    }

    let mut ranked = Vec::with_capacity(pending.len());
    for (path, persona, metrics) in pending {
        ranked.push(RankedFile {
            path,
            persona,
            percentiles: service.rank(&metrics).await?,
        });
    }
    Ok(ranked)
}
