//! Local statevector sampling backend.
//!
//! [`SimulatorBackend`] implements [`vqa_hal::Backend`] with an exact
//! statevector and terminal-measurement sampling. It is the backend the
//! `vqa` CLI runs against and the one the core's tests use to check
//! estimators against analytic expectation values.
//!
//! # Performance
//!
//! | Qubits | Memory |
//! |--------|--------|
//! | 10 | ~16 KB |
//! | 15 | ~512 KB |
//! | 20 | ~16 MB |
//! | 25 | ~512 MB |
//!
//! # Example
//!
//! ```rust
//! use vqa_adapter_sim::SimulatorBackend;
//! use vqa_hal::Backend;
//! use vqa_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("plus", 1, 0);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.measure_all().unwrap();
//!
//! let backend = SimulatorBackend::new().with_seed(42);
//! let result = backend.run(&circuit, 1000).unwrap();
//! assert_eq!(result.counts.total_shots(), 1000);
//! ```

mod simulator;
mod statevector;

pub use simulator::SimulatorBackend;
