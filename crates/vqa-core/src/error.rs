//! Error types for the core crate.

use thiserror::Error;

/// Errors raised while estimating expectations or evaluating costs.
///
/// Every variant raised by this crate itself is a precondition violation
/// detected before any sampling takes place. Backend and IR failures are
/// forwarded unchanged.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VqaError {
    /// A Pauli label outside {I, X, Y, Z}.
    #[error("Invalid Pauli label '{label}' at position {position}")]
    InvalidPauliLabel {
        /// The offending character.
        label: char,
        /// Its index in the input string.
        position: usize,
    },

    /// Two sizes that must agree do not.
    #[error("Length mismatch in {context}: expected {expected}, got {actual}")]
    LengthMismatch {
        /// What was being compared.
        context: &'static str,
        /// The required length.
        expected: usize,
        /// The length supplied.
        actual: usize,
    },

    /// Expectation requested over zero shots.
    #[error("Shot count must be positive")]
    ZeroShots,

    /// Counts do not add up to the declared shot total.
    #[error("Counts sum to {observed} but {expected} shots were declared")]
    InconsistentShotCount {
        /// Declared total.
        expected: u64,
        /// Sum of the histogram.
        observed: u64,
    },

    /// A histogram key that is not a well-formed bitstring.
    #[error("Invalid bitstring '{bitstring}': {reason}")]
    InvalidBitstring {
        /// The offending key.
        bitstring: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The state preparation already measures qubits.
    #[error("State preparation '{0}' already contains measurements")]
    MeasuredPreparation(String),

    /// Sampling backend error.
    #[error("Backend error: {0}")]
    Backend(#[from] vqa_hal::HalError),

    /// Circuit builder error.
    #[error("Circuit IR error: {0}")]
    Ir(#[from] vqa_ir::IrError),
}

/// Result type for core operations.
pub type VqaResult<T> = Result<T, VqaError>;
