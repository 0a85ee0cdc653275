//! VQA Core: Pauli-Expectation Estimation and Variational Cost Evaluation
//!
//! Given a measurement-free state preparation `U` and a cost operator
//! `H = Σ_k w_k P_k`, this crate estimates `⟨ψ|H|ψ⟩` from sampled bitstrings:
//!
//! - **Measurement** rewrites `U` per Pauli string (basis rotations plus
//!   measurement of the non-identity qubits)
//! - **Estimator** turns bitstring counts into a parity-weighted mean
//! - **Cost** sums weighted term estimates on an injected backend
//! - **Objective** wraps it all as `θ ↦ cost` for classical optimizers
//!
//! # Quick start
//!
//! ```rust
//! use vqa_adapter_sim::SimulatorBackend;
//! use vqa_core::{CostEvaluator, WeightedHamiltonian};
//! use vqa_ir::Circuit;
//!
//! // GHZ state: ⟨ZZI⟩ = ⟨IZZ⟩ = 1
//! let ghz = Circuit::ghz(3).unwrap();
//! let h = WeightedHamiltonian::from_real(&[0.5, 0.9], &["ZZI", "IZZ"]).unwrap();
//!
//! let backend = SimulatorBackend::new().with_seed(1);
//! let cost = CostEvaluator::new(&backend)
//!     .with_shots(1000)
//!     .evaluate_cost(&ghz, &h)
//!     .unwrap();
//! assert!((cost - 1.4).abs() < 1e-12);
//! ```

pub mod ansatz;
pub mod config;
pub mod cost;
pub mod error;
pub mod estimator;
pub mod hamiltonian;
pub mod measurement;
pub mod objective;
pub mod optimizer;
pub mod pauli;
pub mod runner;

pub use ansatz::{HardwareEfficient, RyAnsatz, TwoLocal};
pub use config::{ConfigError, RunConfig};
pub use cost::{CostBreakdown, CostEvaluator, DEFAULT_SHOTS, TermEstimate, evaluate_cost};
pub use error::{VqaError, VqaResult};
pub use estimator::{
    ExpectationEstimate, estimate_expectation, estimate_pauli_expectation, parity_sign,
    standard_error,
};
pub use hamiltonian::{PauliTerm, WeightedHamiltonian};
pub use measurement::{MeasurementBasis, MeasurementPlan, measurement_circuit, prepare_measurement};
pub use objective::{Ansatz, Objective, ParameterizedCircuit};
pub use optimizer::{Cobyla, OptimizationResult, Optimizer, OptimizerKind, Spsa};
pub use pauli::{Pauli, PauliString};
pub use runner::{VqeResult, VqeRunner};
