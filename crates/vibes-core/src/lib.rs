//! Core types, traits, and utilities for vibes
//!
//! This crate provides the usage bundle data model, the metrics deriver,
//! the storage traits consumed by the percentile engine and the
//! submission layer, error handling, and runtime configuration shared by
//! all other vibes crates.

pub mod config;
pub mod error;
pub mod metrics;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, VibesError};
pub use metrics::DerivedMetrics;
pub use store::{AppendOutcome, BundleStore, PopulationEntry, PopulationStore, StoredBundle};
pub use types::{Dimension, Percentiles, Stats, TokenCounts, UsageBundle};
