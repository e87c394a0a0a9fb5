//! Error types for vibes
//!
//! This module defines the error types used throughout the vibes crates.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! Only the edges of the system are fallible: the population store, the
//! remote percentile source, bundle decoding and bundle acquisition. The
//! metrics deriver, the closed-form estimator and the persona classifier
//! are total and never produce a `VibesError`.
//!
//! # Example
//!
//! ```
//! use vibes_core::error::{Result, VibesError};
//!
//! fn parse_bundle(raw: &str) -> Result<serde_json::Value> {
//!     // serde_json::Error converts into VibesError automatically
//!     Ok(serde_json::from_str(raw)?)
//! }
//!
//! assert!(matches!(parse_bundle("{"), Err(VibesError::Json(_))));
//! ```

use thiserror::Error;

/// Main error type for vibes operations
#[derive(Error, Debug)]
pub enum VibesError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Bundle is structurally invalid (for example missing `stats`)
    #[error("Malformed bundle: {0}")]
    MalformedBundle(String),

    /// Inline payload could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Short identifier has the wrong shape
    #[error("Invalid short id: {0}")]
    InvalidShortId(String),

    /// Short identifier is unknown or expired
    #[error("Bundle not found or expired: {0}")]
    BundleNotFound(String),

    /// Remote server answered with a non-success status
    #[error("Server returned status {status} for {endpoint}")]
    Status {
        /// Endpoint that was called
        endpoint: String,
        /// HTTP status code
        status: u16,
    },

    /// Storage backend failure
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience type alias for Results in vibes
pub type Result<T> = std::result::Result<T, VibesError>;
