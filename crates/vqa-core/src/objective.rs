//! Parameter-vector objective functions for classical optimizers.
//!
//! An [`Objective`] maps a parameter vector θ to the estimated cost of the
//! state `U(θ)|0⟩`. It holds no mutable state besides an informational call
//! counter, so optimizers may call it in any order, any number of times,
//! and from several threads.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::trace;
use vqa_hal::Backend;
use vqa_ir::{Circuit, IrError};

use crate::cost::CostEvaluator;
use crate::error::{VqaError, VqaResult};
use crate::hamiltonian::WeightedHamiltonian;

/// A parameterized state-preparation family.
pub trait Ansatz: Send + Sync {
    /// Human-readable name.
    fn name(&self) -> &str;

    /// Register width of every prepared circuit.
    fn num_qubits(&self) -> usize;

    /// Length of the parameter vector accepted by [`Ansatz::prepare`].
    fn num_parameters(&self) -> usize;

    /// Build the bound, measurement-free preparation for `params`.
    ///
    /// Fails with [`VqaError::LengthMismatch`] when `params` has the wrong
    /// length.
    fn prepare(&self, params: &[f64]) -> VqaResult<Circuit>;
}

/// An [`Ansatz`] backed by a symbolic template circuit.
///
/// Parameter `k` binds the `k`-th name of [`ParameterizedCircuit::parameter_names`]:
/// sorted order for [`ParameterizedCircuit::new`], caller order for
/// [`ParameterizedCircuit::with_order`].
#[derive(Debug, Clone)]
pub struct ParameterizedCircuit {
    template: Circuit,
    names: Vec<String>,
}

impl ParameterizedCircuit {
    /// Wrap a template circuit, binding its symbols in sorted-name order.
    pub fn new(template: Circuit) -> Self {
        let names = template.parameters().into_iter().collect();
        Self { template, names }
    }

    /// Wrap a template circuit with an explicit binding order.
    ///
    /// `names` must list every free symbol of `template` exactly once.
    pub fn with_order(template: Circuit, names: Vec<String>) -> VqaResult<Self> {
        let symbols = template.parameters();
        if names.len() != symbols.len() {
            return Err(VqaError::LengthMismatch {
                context: "parameter order vs template symbols",
                expected: symbols.len(),
                actual: names.len(),
            });
        }
        if let Some(missing) = symbols.into_iter().find(|s| !names.contains(s)) {
            return Err(IrError::UnboundParameter(missing).into());
        }
        Ok(Self { template, names })
    }

    /// The unbound template.
    pub fn template(&self) -> &Circuit {
        &self.template
    }

    /// Symbol names in binding order.
    pub fn parameter_names(&self) -> &[String] {
        &self.names
    }
}

impl Ansatz for ParameterizedCircuit {
    fn name(&self) -> &str {
        self.template.name()
    }

    fn num_qubits(&self) -> usize {
        self.template.num_qubits()
    }

    fn num_parameters(&self) -> usize {
        self.names.len()
    }

    fn prepare(&self, params: &[f64]) -> VqaResult<Circuit> {
        if params.len() != self.names.len() {
            return Err(VqaError::LengthMismatch {
                context: "parameter vector vs ansatz parameters",
                expected: self.names.len(),
                actual: params.len(),
            });
        }
        let bindings: BTreeMap<String, f64> =
            self.names.iter().cloned().zip(params.iter().copied()).collect();
        Ok(self.template.bind_parameters(&bindings))
    }
}

/// θ ↦ estimated ⟨ψ(θ)|H|ψ(θ)⟩.
pub struct Objective<'a, B: Backend + ?Sized> {
    ansatz: &'a dyn Ansatz,
    hamiltonian: &'a WeightedHamiltonian,
    evaluator: CostEvaluator<'a, B>,
    evaluations: AtomicUsize,
}

impl<'a, B: Backend + ?Sized> Objective<'a, B> {
    /// Create an objective.
    pub fn new(
        ansatz: &'a dyn Ansatz,
        hamiltonian: &'a WeightedHamiltonian,
        evaluator: CostEvaluator<'a, B>,
    ) -> Self {
        Self {
            ansatz,
            hamiltonian,
            evaluator,
            evaluations: AtomicUsize::new(0),
        }
    }

    /// Estimate the cost at `params`.
    pub fn evaluate(&self, params: &[f64]) -> VqaResult<f64> {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        let circuit = self.ansatz.prepare(params)?;
        let cost = self.evaluator.evaluate_cost(&circuit, self.hamiltonian)?;
        trace!(?params, cost, "Objective evaluated");
        Ok(cost)
    }

    /// Number of calls to [`Objective::evaluate`] so far.
    pub fn evaluations(&self) -> usize {
        self.evaluations.load(Ordering::Relaxed)
    }

    /// The ansatz being optimized.
    pub fn ansatz(&self) -> &'a dyn Ansatz {
        self.ansatz
    }

    /// The cost operator.
    pub fn hamiltonian(&self) -> &'a WeightedHamiltonian {
        self.hamiltonian
    }
}
