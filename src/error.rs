//! Error types for the cache
//!
//! Data operations signal absence through `Option` and never fail. This error
//! type only covers the reclaimer lifecycle and configuration loading.

use std::time::Duration;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache lifecycle and configuration failures.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The reclaimer needs a Tokio runtime to spawn its sweep loop
    #[error("No Tokio runtime available to run the reclaimer")]
    RuntimeUnavailable,

    /// The reclaimer did not acknowledge a stop request in time
    #[error("Reclaimer did not stop within {0:?}")]
    ReclaimerTimeout(Duration),

    /// The reclaimer task panicked
    #[error("Reclaimer task panicked: {0}")]
    ReclaimerPanicked(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
