//! Common test utilities and helpers for vibes tests
//!
//! This module provides a bundle builder and file helpers so the
//! integration tests can describe bundles by the signals they care about.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use vibes::UsageBundle;
use vibes_core::types::{Insights, Quirks, TokenCounts, WordCount};

/// Builder for creating test UsageBundle instances
pub struct BundleBuilder {
    bundle: UsageBundle,
}

impl BundleBuilder {
    /// Create a new builder with a quiet daytime bundle
    pub fn new() -> Self {
        let mut bundle = UsageBundle::default();
        bundle.stats.total_sessions = 20;
        bundle.stats.hour_counts[14] = 20;
        bundle.stats.longest_session_minutes = 45.0;
        bundle.stats.total_tokens = TokenCounts::new(200_000, 50_000, 100_000);
        Self { bundle }
    }

    pub fn tokens(mut self, input: u64, output: u64, cached: u64) -> Self {
        self.bundle.stats.total_tokens = TokenCounts::new(input, output, cached);
        self
    }

    pub fn sessions(mut self, sessions: u64) -> Self {
        self.bundle.stats.total_sessions = sessions;
        self
    }

    pub fn longest_session(mut self, minutes: f64) -> Self {
        self.bundle.stats.longest_session_minutes = minutes;
        self
    }

    /// Replace the hour histogram with the given `(hour, count)` buckets
    pub fn hours(mut self, hours: &[(usize, u64)]) -> Self {
        self.bundle.stats.hour_counts = [0; 24];
        for &(hour, count) in hours {
            self.bundle.stats.hour_counts[hour] = count;
        }
        self
    }

    pub fn tool(mut self, name: &str, calls: u64) -> Self {
        self.bundle.stats.tool_usage.insert(name.to_string(), calls);
        self.bundle.stats.total_tool_calls = self.bundle.stats.tool_usage.values().sum();
        self
    }

    pub fn model(mut self, name: &str, tokens: u64) -> Self {
        self.bundle.stats.model_usage.insert(name.to_string(), tokens);
        self
    }

    pub fn projects(mut self, count: u64) -> Self {
        self.bundle.stats.project_count = count;
        self
    }

    pub fn quirks(mut self, quirks: Quirks) -> Self {
        self.bundle.quirks = Some(quirks);
        self
    }

    pub fn topics(mut self, topics: &[&str]) -> Self {
        self.insights().dominant_topics = topics.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn word(mut self, word: &str, count: u64) -> Self {
        self.insights().top_words.push(WordCount {
            word: word.to_string(),
            count,
        });
        self
    }

    pub fn trait_keyword(mut self, keyword: &str) -> Self {
        self.bundle.traits.push(keyword.to_string());
        self
    }

    pub fn persona_id(mut self, id: &str) -> Self {
        self.bundle.persona_id = Some(id.to_string());
        self
    }

    pub fn build(self) -> UsageBundle {
        self.bundle
    }

    fn insights(&mut self) -> &mut Insights {
        self.bundle.insights.get_or_insert_with(Insights::default)
    }
}

impl Default for BundleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Write `bundle` as JSON into `dir`
pub fn write_json(dir: &Path, name: &str, bundle: &UsageBundle) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string_pretty(bundle).unwrap()).unwrap();
    path
}

/// Write `bundle` as an encoded inline payload into `dir`
pub fn write_encoded(dir: &Path, name: &str, bundle: &UsageBundle) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, vibes_codec::encode(bundle).unwrap()).unwrap();
    path
}

/// Temporary directory for bundle files
pub fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}
