//! Storage backends for vibes
//!
//! In-memory implementations of the [`PopulationStore`] and
//! [`BundleStore`] traits. They back local development, the CLI and the
//! test suites; a deployment with a persistent key-value service would
//! implement the same traits.
//!
//! [`PopulationStore`]: vibes_core::PopulationStore
//! [`BundleStore`]: vibes_core::BundleStore

pub mod memory;

pub use memory::{MemoryBundleStore, MemoryPopulationStore};
