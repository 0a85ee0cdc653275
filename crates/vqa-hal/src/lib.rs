//! Sampling-backend contract.
//!
//! This crate defines what the variational core needs from a quantum
//! backend and nothing more: run a measured circuit for a number of shots
//! and hand back a bitstring histogram.
//!
//! # Example
//!
//! ```rust
//! use vqa_hal::{Backend, Counts, ExecutionResult, HalResult};
//! use vqa_ir::Circuit;
//!
//! /// A backend that always observes the all-zero bitstring.
//! struct ZeroBackend;
//!
//! impl Backend for ZeroBackend {
//!     fn name(&self) -> &str {
//!         "zero"
//!     }
//!
//!     fn max_qubits(&self) -> usize {
//!         64
//!     }
//!
//!     fn run(&self, circuit: &Circuit, shots: u32) -> HalResult<ExecutionResult> {
//!         let mut counts = Counts::new();
//!         counts.insert("0".repeat(circuit.num_clbits()), u64::from(shots));
//!         Ok(ExecutionResult::new(counts, shots))
//!     }
//! }
//!
//! let result = ZeroBackend.run(&Circuit::with_size("c", 2, 2), 10).unwrap();
//! assert_eq!(result.counts.get("00"), 10);
//! ```

pub mod backend;
pub mod error;
pub mod result;

pub use backend::{Backend, BackendConfig, BackendFactory, ValidationResult};
pub use error::{HalError, HalResult};
pub use result::{Counts, ExecutionResult};
