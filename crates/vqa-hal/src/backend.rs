//! Backend trait and configuration.
//!
//! A [`Backend`] is the sampling collaborator of the variational stack:
//! given a circuit whose measurements write classical bits, it returns a
//! histogram of observed bitstrings. The contract is
//! synchronous. Callers that want concurrency parallelize across runs.
//!
//! | Method | Required | Returns |
//! |--------|----------|---------|
//! | `name()` | yes | `&str` |
//! | `max_qubits()` | yes | `usize` |
//! | `validate()` | provided | `ValidationResult` |
//! | `run()` | yes | `HalResult<ExecutionResult>` |

use serde::{Deserialize, Serialize};

use vqa_ir::Circuit;

use crate::error::{HalError, HalResult};
use crate::result::ExecutionResult;

/// Configuration for a backend instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Name of the backend.
    pub name: String,
    /// Backend-specific options.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl BackendConfig {
    /// Create a new backend configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: serde_json::Map::new(),
        }
    }

    /// Add an option.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Read an unsigned integer option.
    ///
    /// Absent keys yield `Ok(None)`. Present keys of the wrong type are a
    /// configuration error rather than silently ignored.
    pub fn get_u64(&self, key: &str) -> HalResult<Option<u64>> {
        match self.extra.get(key) {
            None => Ok(None),
            Some(v) => v.as_u64().map(Some).ok_or_else(|| {
                HalError::Configuration(format!("'{key}' must be an unsigned integer, got {v}"))
            }),
        }
    }
}

/// Result of checking a circuit against backend constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// The circuit can run as-is.
    Valid,
    /// The circuit cannot run on this backend.
    Invalid {
        /// Reasons the circuit is invalid.
        reasons: Vec<String>,
    },
}

impl ValidationResult {
    /// Check if the circuit can run as-is.
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

/// A sampling backend.
///
/// # Contract
///
/// - `run()` blocks until sampling completes and returns counts whose total
///   equals `shots`.
/// - Bitstrings have one character per classical bit of the circuit,
///   character `c` holding clbit `c`. Bits never written by a measurement
///   read `'0'`.
/// - Errors are reported, never retried.
pub trait Backend: Send + Sync {
    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Widest circuit the backend accepts.
    fn max_qubits(&self) -> usize;

    /// Check the circuit against backend constraints without running it.
    fn validate(&self, circuit: &Circuit) -> ValidationResult {
        if circuit.num_qubits() > self.max_qubits() {
            ValidationResult::Invalid {
                reasons: vec![format!(
                    "circuit has {} qubits, backend supports at most {}",
                    circuit.num_qubits(),
                    self.max_qubits()
                )],
            }
        } else {
            ValidationResult::Valid
        }
    }

    /// Execute `circuit` and sample `shots` outcomes.
    fn run(&self, circuit: &Circuit, shots: u32) -> HalResult<ExecutionResult>;
}

/// Trait for creating backends from configuration.
pub trait BackendFactory: Backend + Sized {
    /// Create a backend from configuration.
    fn from_config(config: BackendConfig) -> HalResult<Self>;
}
