//! End-to-end variational eigensolver loop.
//!
//! Ties an [`Ansatz`], a [`WeightedHamiltonian`] and a sampling backend
//! together through an [`Objective`] and hands it to an [`Optimizer`].

use std::f64::consts::FRAC_PI_2;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;
use vqa_hal::Backend;

use crate::cost::{CostEvaluator, DEFAULT_SHOTS};
use crate::error::{VqaError, VqaResult};
use crate::hamiltonian::WeightedHamiltonian;
use crate::objective::{Ansatz, Objective};
use crate::optimizer::{Optimizer, OptimizerKind};

/// Outcome of a VQE run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VqeResult {
    /// Lowest estimated energy.
    pub optimal_energy: f64,
    /// Parameters at `optimal_energy`.
    pub optimal_params: Vec<f64>,
    /// Optimizer iterations.
    pub iterations: usize,
    /// Objective evaluations (one cost estimate each).
    pub evaluations: usize,
    /// Best energy after each improvement.
    pub energy_history: Vec<f64>,
    /// Whether the optimizer met its stopping criterion.
    pub converged: bool,
}

/// Builder and driver for a VQE run.
pub struct VqeRunner<'a, B: Backend + ?Sized> {
    hamiltonian: WeightedHamiltonian,
    ansatz: Box<dyn Ansatz>,
    backend: &'a B,
    shots: u32,
    optimizer: OptimizerKind,
    seed: Option<u64>,
    parallel: bool,
    initial_params: Option<Vec<f64>>,
}

impl<'a, B: Backend + ?Sized> VqeRunner<'a, B> {
    /// Create a runner with default COBYLA settings and [`DEFAULT_SHOTS`].
    pub fn new(hamiltonian: WeightedHamiltonian, ansatz: Box<dyn Ansatz>, backend: &'a B) -> Self {
        Self {
            hamiltonian,
            ansatz,
            backend,
            shots: DEFAULT_SHOTS,
            optimizer: OptimizerKind::default(),
            seed: None,
            parallel: false,
            initial_params: None,
        }
    }

    /// Set shots per term.
    pub fn with_shots(mut self, shots: u32) -> Self {
        self.shots = shots;
        self
    }

    /// Set the optimizer iteration limit.
    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.optimizer = self.optimizer.with_maxiter(maxiter);
        self
    }

    /// Set the optimizer tolerance.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.optimizer = self.optimizer.with_tol(tol);
        self
    }

    /// Choose the optimizer.
    pub fn with_optimizer(mut self, optimizer: OptimizerKind) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// Seed the initial parameters and the SPSA perturbations.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Evaluate Hamiltonian terms in parallel.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Start from explicit parameters instead of random ones.
    pub fn with_initial_params(mut self, params: Vec<f64>) -> Self {
        self.initial_params = Some(params);
        self
    }

    /// Parameter count of the ansatz.
    pub fn num_parameters(&self) -> usize {
        self.ansatz.num_parameters()
    }

    /// Run the optimization.
    pub fn run(&self) -> VqaResult<VqeResult> {
        if let Some(width) = self.hamiltonian.num_qubits() {
            if width != self.ansatz.num_qubits() {
                return Err(VqaError::LengthMismatch {
                    context: "Hamiltonian qubits vs ansatz qubits",
                    expected: self.ansatz.num_qubits(),
                    actual: width,
                });
            }
        }
        let initial = self.initial_parameters()?;

        let optimizer = match (&self.optimizer, self.seed) {
            (OptimizerKind::Spsa(spsa), Some(seed)) => {
                OptimizerKind::Spsa(spsa.clone().with_seed(seed))
            }
            (other, _) => other.clone(),
        };

        info!(
            ansatz = self.ansatz.name(),
            parameters = initial.len(),
            terms = self.hamiltonian.len(),
            optimizer = optimizer.name(),
            shots = self.shots,
            "Starting VQE"
        );

        let evaluator = CostEvaluator::new(self.backend)
            .with_shots(self.shots)
            .with_parallel(self.parallel);
        let objective = Objective::new(self.ansatz.as_ref(), &self.hamiltonian, evaluator);
        let result = optimizer.minimize(|params| objective.evaluate(params), initial)?;

        info!(
            energy = result.optimal_value,
            iterations = result.num_iterations,
            evaluations = objective.evaluations(),
            converged = result.converged,
            "VQE finished"
        );

        Ok(VqeResult {
            optimal_energy: result.optimal_value,
            optimal_params: result.optimal_params,
            iterations: result.num_iterations,
            evaluations: objective.evaluations(),
            energy_history: result.history,
            converged: result.converged,
        })
    }

    fn initial_parameters(&self) -> VqaResult<Vec<f64>> {
        let n = self.ansatz.num_parameters();
        if let Some(params) = &self.initial_params {
            if params.len() != n {
                return Err(VqaError::LengthMismatch {
                    context: "initial parameters vs ansatz parameters",
                    expected: n,
                    actual: params.len(),
                });
            }
            return Ok(params.clone());
        }
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok((0..n).map(|_| rng.gen_range(-FRAC_PI_2..FRAC_PI_2)).collect())
    }
}
