//! Error types for market-pulse

use thiserror::Error;

/// Main error type for market-pulse
#[derive(Error, Debug)]
pub enum PulseError {
    /// Upstream returned a non-success status, an error envelope, or the
    /// request never completed.
    #[error("Provider error: {0}")]
    Provider(String),

    /// Upstream answered successfully but no entry carried a usable price.
    #[error("Provider returned no usable quotes ({skipped} entries skipped)")]
    EmptyResult { skipped: usize },

    #[error("Cache read error: {0}")]
    StoreRead(String),

    #[error("Cache write error: {0}")]
    StoreWrite(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl PulseError {
    /// Errors from the live quote path. The orchestrator recovers these
    /// through the stale-cache and synthetic tiers.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, PulseError::Provider(_) | PulseError::EmptyResult { .. })
    }

    /// Persistence failures, which never abort a request.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, PulseError::StoreRead(_) | PulseError::StoreWrite(_))
    }
}

/// Result type alias for market-pulse operations
pub type Result<T> = std::result::Result<T, PulseError>;
