//! Hamiltonian cost evaluation on a sampling backend.
//!
//! For a preparation `U` and `H = Σ_k w_k P_k` the evaluator returns
//!
//!   C = Re Σ_k  w_k · ⟨P_k⟩
//!
//! where each `⟨P_k⟩` is estimated from `shots` samples of `U` rewritten
//! for `P_k`. All preconditions are checked before the first circuit is
//! submitted, so a malformed request never consumes backend time.

use num_complex::Complex64;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use vqa_hal::Backend;
use vqa_ir::Circuit;

use crate::error::{VqaError, VqaResult};
use crate::estimator::ExpectationEstimate;
use crate::hamiltonian::{PauliTerm, WeightedHamiltonian};
use crate::measurement::measurement_circuit;
use crate::pauli::PauliString;

/// Shots per term when none are configured.
pub const DEFAULT_SHOTS: u32 = 10_000;

/// Imaginary parts above this are reported as a non-Hermitian input.
const IMAGINARY_TOLERANCE: f64 = 1e-9;

/// One term's share of the cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermEstimate {
    /// Term weight.
    pub coefficient: Complex64,
    /// The measured Pauli string.
    pub pauli: PauliString,
    /// Estimated ⟨P⟩.
    pub estimate: ExpectationEstimate,
    /// `coefficient · estimate.value`.
    pub contribution: Complex64,
}

/// Per-term estimates and their sum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Estimates in Hamiltonian term order.
    pub terms: Vec<TermEstimate>,
    /// Sum of all contributions, in term order.
    pub total: Complex64,
}

impl CostBreakdown {
    fn from_terms(terms: Vec<TermEstimate>) -> Self {
        let total = terms
            .iter()
            .fold(Complex64::new(0.0, 0.0), |acc, t| acc + t.contribution);
        Self { terms, total }
    }

    /// The real-valued cost.
    pub fn cost(&self) -> f64 {
        self.total.re
    }
}

/// Evaluates weighted Pauli sums against an injected backend.
pub struct CostEvaluator<'b, B: Backend + ?Sized> {
    backend: &'b B,
    shots: u32,
    parallel: bool,
}

impl<'b, B: Backend + ?Sized> CostEvaluator<'b, B> {
    /// Create an evaluator with [`DEFAULT_SHOTS`] shots per term.
    pub fn new(backend: &'b B) -> Self {
        Self {
            backend,
            shots: DEFAULT_SHOTS,
            parallel: false,
        }
    }

    /// Set the shots per term.
    pub fn with_shots(mut self, shots: u32) -> Self {
        self.shots = shots;
        self
    }

    /// Evaluate terms on the rayon thread pool.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Shots per term.
    pub fn shots(&self) -> u32 {
        self.shots
    }

    /// The backend used for sampling.
    pub fn backend(&self) -> &'b B {
        self.backend
    }

    /// Estimate the cost `Re Σ w_k ⟨P_k⟩`.
    ///
    /// An empty Hamiltonian costs `0.0`.
    pub fn evaluate_cost(
        &self,
        preparation: &Circuit,
        hamiltonian: &WeightedHamiltonian,
    ) -> VqaResult<f64> {
        let breakdown = self.evaluate_terms(preparation, hamiltonian)?;
        if breakdown.total.im.abs() > IMAGINARY_TOLERANCE {
            warn!(
                imaginary = breakdown.total.im,
                "Discarding imaginary part of cost; Hamiltonian is not Hermitian"
            );
        }
        Ok(breakdown.cost())
    }

    /// Estimate every term and return the per-term breakdown.
    #[instrument(
        skip(self, preparation, hamiltonian),
        fields(backend = self.backend.name(), terms = hamiltonian.len(), shots = self.shots)
    )]
    pub fn evaluate_terms(
        &self,
        preparation: &Circuit,
        hamiltonian: &WeightedHamiltonian,
    ) -> VqaResult<CostBreakdown> {
        self.check(preparation, hamiltonian)?;

        let terms = if self.parallel {
            hamiltonian
                .terms()
                .par_iter()
                .map(|term| self.estimate_term(preparation, term))
                .collect::<VqaResult<Vec<_>>>()?
        } else {
            hamiltonian
                .terms()
                .iter()
                .map(|term| self.estimate_term(preparation, term))
                .collect::<VqaResult<Vec<_>>>()?
        };

        let breakdown = CostBreakdown::from_terms(terms);
        debug!(cost = breakdown.total.re, "Cost evaluated");
        Ok(breakdown)
    }

    fn check(&self, preparation: &Circuit, hamiltonian: &WeightedHamiltonian) -> VqaResult<()> {
        if self.shots == 0 {
            return Err(VqaError::ZeroShots);
        }
        let width = preparation.num_qubits();
        if let Some(term) = hamiltonian.terms().iter().find(|t| t.pauli.len() != width) {
            return Err(VqaError::LengthMismatch {
                context: "Pauli string length vs circuit qubits",
                expected: width,
                actual: term.pauli.len(),
            });
        }
        if preparation.has_measurements() {
            return Err(VqaError::MeasuredPreparation(preparation.name().to_string()));
        }
        Ok(())
    }

    fn estimate_term(&self, preparation: &Circuit, term: &PauliTerm) -> VqaResult<TermEstimate> {
        let estimate = if term.pauli.is_identity() {
            ExpectationEstimate::exact(1.0)
        } else {
            let circuit = measurement_circuit(preparation, &term.pauli)?;
            let result = self.backend.run(&circuit, self.shots)?;
            ExpectationEstimate::from_counts(&result.counts, u64::from(self.shots))?
        };
        debug!(
            pauli = %term.pauli,
            expectation = estimate.value,
            "Term estimated"
        );
        Ok(TermEstimate {
            coefficient: term.coefficient,
            pauli: term.pauli.clone(),
            estimate,
            contribution: term.coefficient * estimate.value,
        })
    }
}

/// Estimate `Re Σ w_k ⟨P_k⟩` for `preparation` with `shots` samples per term.
pub fn evaluate_cost<B: Backend + ?Sized>(
    backend: &B,
    preparation: &Circuit,
    hamiltonian: &WeightedHamiltonian,
    shots: u32,
) -> VqaResult<f64> {
    CostEvaluator::new(backend)
        .with_shots(shots)
        .evaluate_cost(preparation, hamiltonian)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use vqa_hal::{Counts, ExecutionResult, HalError, HalResult};
    use vqa_ir::QubitId;

    /// Returns all-zero outcomes and counts how often it was called.
    struct ZeroBackend {
        calls: AtomicUsize,
    }

    impl ZeroBackend {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Backend for ZeroBackend {
        fn name(&self) -> &str {
            "zero"
        }

        fn max_qubits(&self) -> usize {
            8
        }

        fn run(&self, circuit: &Circuit, shots: u32) -> HalResult<ExecutionResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut counts = Counts::new();
            counts.insert("0".repeat(circuit.num_clbits()), u64::from(shots));
            Ok(ExecutionResult::new(counts, shots))
        }
    }

    struct FailingBackend;

    impl Backend for FailingBackend {
        fn name(&self) -> &str {
            "failing"
        }

        fn max_qubits(&self) -> usize {
            8
        }

        fn run(&self, _circuit: &Circuit, _shots: u32) -> HalResult<ExecutionResult> {
            Err(HalError::JobFailed("device offline".into()))
        }
    }

    fn prep(n: u32) -> Circuit {
        Circuit::with_size("prep", n, 0)
    }

    #[test]
    fn test_sum_of_weights_on_zero_outcomes() {
        let backend = ZeroBackend::new();
        let h = WeightedHamiltonian::from_real(&[0.5, -0.25, 2.0], &["ZI", "IZ", "ZZ"]).unwrap();
        let cost = CostEvaluator::new(&backend)
            .with_shots(16)
            .evaluate_cost(&prep(2), &h)
            .unwrap();
        assert!((cost - 2.25).abs() < 1e-12);
        assert_eq!(backend.calls(), 3);
    }

    #[test]
    fn test_identity_terms_are_not_sampled() {
        let backend = ZeroBackend::new();
        let h = WeightedHamiltonian::from_real(&[3.0, 1.0], &["II", "ZI"]).unwrap();
        let breakdown = CostEvaluator::new(&backend)
            .evaluate_terms(&prep(2), &h)
            .unwrap();
        assert_eq!(backend.calls(), 1);
        assert_eq!(breakdown.terms[0].estimate, ExpectationEstimate::exact(1.0));
        assert!((breakdown.cost() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_hamiltonian_costs_zero() {
        let backend = ZeroBackend::new();
        let h = WeightedHamiltonian::default();
        let cost = evaluate_cost(&backend, &prep(2), &h, 100).unwrap();
        assert_eq!(cost, 0.0);
        assert_eq!(backend.calls(), 0);
    }

    #[test]
    fn test_validation_precedes_sampling() {
        let backend = ZeroBackend::new();
        let h = WeightedHamiltonian::from_real(&[1.0, 1.0], &["ZZ", "ZZZ"]);
        assert!(h.is_err());

        let h = WeightedHamiltonian::from_real(&[1.0, 1.0], &["ZZZ", "XXX"]).unwrap();
        let err = evaluate_cost(&backend, &prep(2), &h, 100).unwrap_err();
        assert!(matches!(err, VqaError::LengthMismatch { .. }));

        let err = evaluate_cost(&backend, &prep(3), &h, 0).unwrap_err();
        assert!(matches!(err, VqaError::ZeroShots));

        let mut measured = prep(3);
        measured.measure_all().unwrap();
        let err = evaluate_cost(&backend, &measured, &h, 100).unwrap_err();
        assert!(matches!(err, VqaError::MeasuredPreparation(_)));

        assert_eq!(backend.calls(), 0);
    }

    #[test]
    fn test_backend_error_propagates() {
        let h = WeightedHamiltonian::from_real(&[1.0], &["Z"]).unwrap();
        let err = evaluate_cost(&FailingBackend, &prep(1), &h, 10).unwrap_err();
        assert!(matches!(err, VqaError::Backend(HalError::JobFailed(_))));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let backend = ZeroBackend::new();
        let h = WeightedHamiltonian::from_real(
            &[0.1, 0.2, 0.3, 0.4, 0.5],
            &["ZII", "IZI", "IIZ", "XXI", "IYY"],
        )
        .unwrap();
        let mut p = prep(3);
        p.h(QubitId(0)).unwrap();

        let seq = CostEvaluator::new(&backend).evaluate_terms(&p, &h).unwrap();
        let par = CostEvaluator::new(&backend)
            .with_parallel(true)
            .evaluate_terms(&p, &h)
            .unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn test_complex_weights_keep_real_part() {
        let backend = ZeroBackend::new();
        let h = WeightedHamiltonian::from_parts(
            [Complex64::new(1.5, 0.75)],
            [PauliString::parse("Z").unwrap()],
        )
        .unwrap();
        let cost = evaluate_cost(&backend, &prep(1), &h, 10).unwrap();
        assert!((cost - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_dyn_backend() {
        let backend = ZeroBackend::new();
        let dyn_backend: &dyn Backend = &backend;
        let h = WeightedHamiltonian::from_real(&[1.0], &["Z"]).unwrap();
        let cost = CostEvaluator::new(dyn_backend)
            .evaluate_cost(&prep(1), &h)
            .unwrap();
        assert_eq!(cost, 1.0);
    }
}
