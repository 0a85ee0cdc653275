//! Error types for the HAL crate.

use thiserror::Error;

/// Errors a sampling backend can report.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    /// The circuit cannot be executed as given.
    #[error("Invalid circuit: {0}")]
    InvalidCircuit(String),

    /// Circuit exceeds backend capabilities.
    #[error("Circuit exceeds backend capabilities: {0}")]
    CircuitTooLarge(String),

    /// Invalid number of shots.
    #[error("Invalid shots: {0}")]
    InvalidShots(String),

    /// The circuit uses a feature the backend does not implement.
    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    /// Execution started but did not produce a result.
    #[error("Job failed: {0}")]
    JobFailed(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic backend error.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for HAL operations.
pub type HalResult<T> = Result<T, HalError>;
