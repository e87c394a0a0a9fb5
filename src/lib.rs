//! vibes - Coding-assistant usage wrapped
//!
//! This library provides functionality to:
//! - Acquire a usage bundle from a short id, an inline share payload or demo data
//! - Derive metrics and rank them against a population (or estimate them)
//! - Classify the bundle into one of the catalog personas
//! - Record submissions and keep the landing-page counters
//! - Render results as tables or JSON
//!
//! The building blocks live in the member crates (`vibes-core`,
//! `vibes-percentile`, `vibes-persona`, `vibes-codec`, `vibes-store`); this
//! crate wires them into the enrichment pipeline and the `vibes` binary.
//!
//! # Examples
//!
//! ```
//! use vibes::{
//!     acquisition::{Acquirer, BundleRequest},
//!     enrichment::Enricher,
//! };
//!
//! # tokio_test::block_on(async {
//! // No reference at all: the demo bundle is enriched offline
//! let acquired = Acquirer::new().acquire(&BundleRequest::default()).await;
//! let view = Enricher::offline().enrich_acquired(acquired).await;
//!
//! assert_eq!(view.persona.id.as_str(), "3am-demon");
//! # });
//! ```

pub mod acquisition;
pub mod batch;
pub mod cli;
pub mod client;
pub mod demo;
pub mod enrichment;
pub mod output;
pub mod submission;

// Re-export commonly used types
pub use vibes_core::{Config, Result, UsageBundle, VibesError};
pub use vibes_persona::PersonaId;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
