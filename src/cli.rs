//! CLI interface for vibes
//!
//! This module defines the command-line interface using clap. Global flags
//! configure logging, output format and the optional remote server; every
//! server-related flag has an environment fallback.
//!
//! # Example
//!
//! ```bash
//! # Enrich a share link against a server
//! vibes --server https://wrapped.example.com enrich --url "https://wrapped.example.com/?id=abcd1234"
//!
//! # Classify a directory of exported bundles as JSON
//! vibes --json classify exports/*.json
//!
//! # Show the rule cascade
//! vibes personas --rules
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use vibes_core::{Config, Result};

use crate::demo::DemoSample;

/// Coding-assistant usage wrapped: metrics, percentiles and personas
#[derive(Parser, Debug, Clone)]
#[command(name = "vibes")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Show informational output (default shows only warnings and errors)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Only show errors (overrides RUST_LOG and --verbose)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Base URL of a vibes server used for percentiles and short ids
    #[arg(long, env = "VIBES_SERVER_URL", global = true)]
    pub server: Option<String>,

    /// Timeout in seconds for the remote round trip
    #[arg(long, env = "VIBES_TIMEOUT_SECS", default_value = "5", global = true)]
    pub timeout: u64,

    /// Never contact the server, estimate percentiles locally
    #[arg(long, env = "VIBES_OFFLINE", global = true)]
    pub offline: bool,

    /// Population entries kept by the local submission service
    #[arg(long, env = "VIBES_POPULATION_CAPACITY", global = true)]
    pub population_capacity: Option<usize>,

    /// Short-id bundles kept by the local bundle store
    #[arg(long, env = "VIBES_BUNDLE_CAPACITY", global = true)]
    pub bundle_capacity: Option<usize>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Acquire a bundle (short id, inline payload or demo) and enrich it
    Enrich {
        /// Share link or raw query string carrying `id` and/or `d`
        #[arg(long, conflicts_with = "file")]
        url: Option<String>,

        /// Short bundle id
        #[arg(long, conflicts_with = "file")]
        id: Option<String>,

        /// Encoded inline payload
        #[arg(long, conflicts_with = "file")]
        data: Option<String>,

        /// Local bundle file (JSON or encoded payload)
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Encode a bundle file into an inline payload
    Encode {
        /// Bundle file (JSON or encoded payload)
        path: PathBuf,

        /// Store the bundle on the server and print its short id instead
        #[arg(long)]
        short: bool,
    },

    /// Decode an inline payload back into bundle JSON
    Decode {
        /// Encoded payload
        encoded: String,
    },

    /// Classify bundle files in parallel
    Classify {
        /// Bundle files (JSON or encoded payloads)
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Rank bundle files against each other as one population
    Rank {
        /// Bundle files (JSON or encoded payloads)
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// List the persona catalog
    Personas {
        /// Show the ordered classification rules instead
        #[arg(long)]
        rules: bool,
    },

    /// Enrich a built-in sample bundle
    Demo {
        /// Sample to enrich
        #[arg(long, value_enum, default_value = "default")]
        sample: DemoSample,
    },
}

impl Cli {
    /// Build and validate the runtime configuration from flags
    pub fn config(&self) -> Result<Config> {
        let mut config = Config::default()
            .with_request_timeout(Duration::from_secs(self.timeout))
            .with_offline(self.offline);

        if let Some(url) = &self.server {
            config = config.with_server_url(url.clone());
        }
        if let Some(capacity) = self.population_capacity {
            config = config.with_population_capacity(capacity);
        }
        if let Some(capacity) = self.bundle_capacity {
            config = config.with_bundle_capacity(capacity);
        }

        config.validate()?;
        Ok(config)
    }

    /// Log filter directive for the selected verbosity
    ///
    /// `None` means "defer to RUST_LOG, falling back to the default".
    pub fn log_directive(&self) -> Option<&'static str> {
        if self.quiet {
            Some("error")
        } else if self.verbose {
            Some("vibes=info")
        } else {
            None
        }
    }
}

/// Default log filter when neither a flag nor RUST_LOG selects one
pub const DEFAULT_LOG_DIRECTIVE: &str = "vibes=warn";
