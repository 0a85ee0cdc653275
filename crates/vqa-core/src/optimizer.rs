//! Derivative-free classical optimizers.
//!
//! Objectives are fallible: the first `Err` returned by the objective aborts
//! the optimization and is handed back to the caller unchanged.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Result of an optimization run.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Best parameters found.
    pub optimal_params: Vec<f64>,
    /// Objective value at `optimal_params`.
    pub optimal_value: f64,
    /// Number of objective evaluations.
    pub num_evaluations: usize,
    /// Number of iterations performed.
    pub num_iterations: usize,
    /// Best value after each improvement, starting with the initial value.
    pub history: Vec<f64>,
    /// Whether the stopping criterion was met before `maxiter`.
    pub converged: bool,
}

/// A minimizer over real parameter vectors.
pub trait Optimizer {
    /// Minimize `objective` starting from `initial`.
    fn minimize<F, E>(&self, objective: F, initial: Vec<f64>) -> Result<OptimizationResult, E>
    where
        F: FnMut(&[f64]) -> Result<f64, E>;
}

/// Objective wrapper that counts calls.
struct Counted<F> {
    f: F,
    calls: usize,
}

impl<F> Counted<F> {
    fn new(f: F) -> Self {
        Self { f, calls: 0 }
    }

    fn call<E>(&mut self, x: &[f64]) -> Result<f64, E>
    where
        F: FnMut(&[f64]) -> Result<f64, E>,
    {
        self.calls += 1;
        (self.f)(x)
    }
}

/// Simplex vertices with their objective values.
struct Simplex {
    points: Vec<Vec<f64>>,
    values: Vec<f64>,
}

impl Simplex {
    /// Axis-aligned simplex of size `rho` around an evaluated center.
    fn around<F, E>(center: Vec<f64>, value: f64, rho: f64, f: &mut Counted<F>) -> Result<Self, E>
    where
        F: FnMut(&[f64]) -> Result<f64, E>,
    {
        let n = center.len();
        let mut points = Vec::with_capacity(n + 1);
        let mut values = Vec::with_capacity(n + 1);
        for axis in 0..n {
            let mut vertex = center.clone();
            vertex[axis] += rho;
            values.push(f.call(&vertex)?);
            points.push(vertex);
        }
        points.insert(0, center);
        values.insert(0, value);
        Ok(Self { points, values })
    }

    /// Vertex indices from best to worst.
    fn order(&self) -> Vec<usize> {
        let mut idx: Vec<usize> = (0..self.values.len()).collect();
        idx.sort_by(|&a, &b| self.values[a].total_cmp(&self.values[b]));
        idx
    }

    fn best(&self) -> usize {
        self.order()[0]
    }

    /// Centroid of every vertex except `skip`.
    #[allow(clippy::cast_precision_loss)]
    fn centroid(&self, skip: usize) -> Vec<f64> {
        let n = self.points[0].len();
        let mut c = vec![0.0; n];
        for (_, p) in self.points.iter().enumerate().filter(|(i, _)| *i != skip) {
            for (ci, pi) in c.iter_mut().zip(p) {
                *ci += pi;
            }
        }
        let m = (self.points.len() - 1) as f64;
        c.iter_mut().for_each(|ci| *ci /= m);
        c
    }

    fn replace(&mut self, i: usize, point: Vec<f64>, value: f64) {
        self.points[i] = point;
        self.values[i] = value;
    }
}

/// Trust-region simplex search in the spirit of COBYLA.
///
/// Reflection steps are clipped to the current radius `rho`. Once the
/// simplex values agree within `tol` the radius is halved and the simplex
/// rebuilt around the best vertex, until `rho` reaches `rhoend`.
#[derive(Debug, Clone)]
pub struct Cobyla {
    /// Maximum number of iterations.
    pub maxiter: usize,
    /// Spread of simplex values treated as flat.
    pub tol: f64,
    /// Initial trust-region radius.
    pub rhobeg: f64,
    /// Final trust-region radius.
    pub rhoend: f64,
}

impl Default for Cobyla {
    fn default() -> Self {
        Self {
            maxiter: 100,
            tol: 1e-6,
            rhobeg: 0.5,
            rhoend: 1e-4,
        }
    }
}

impl Cobyla {
    /// Create with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum iterations.
    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;
        self
    }

    /// Set convergence tolerance.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set the trust-region radii.
    pub fn with_trust_region(mut self, rhobeg: f64, rhoend: f64) -> Self {
        self.rhobeg = rhobeg;
        self.rhoend = rhoend;
        self
    }
}

impl Optimizer for Cobyla {
    fn minimize<F, E>(&self, objective: F, initial: Vec<f64>) -> Result<OptimizationResult, E>
    where
        F: FnMut(&[f64]) -> Result<f64, E>,
    {
        let mut f = Counted::new(objective);
        let n = initial.len();
        let f0 = f.call(&initial)?;
        let mut history = vec![f0];

        if n == 0 {
            return Ok(OptimizationResult {
                optimal_params: initial,
                optimal_value: f0,
                num_evaluations: f.calls,
                num_iterations: 0,
                history,
                converged: true,
            });
        }

        let mut simplex = Simplex::around(initial, f0, self.rhobeg, &mut f)?;
        let mut best_value = f0;
        let mut rho = self.rhobeg;
        let mut converged = false;
        let mut iterations = 0;

        while iterations < self.maxiter {
            iterations += 1;
            let order = simplex.order();
            let (lo, second_worst, hi) = (order[0], order[n - 1], order[n]);

            if simplex.values[hi] - simplex.values[lo] < self.tol {
                if rho <= self.rhoend {
                    converged = true;
                    break;
                }
                rho = (rho * 0.5).max(self.rhoend);
                let center = simplex.points[lo].clone();
                let value = simplex.values[lo];
                simplex = Simplex::around(center, value, rho, &mut f)?;
                continue;
            }

            let centroid = simplex.centroid(hi);
            let reflected: Vec<f64> = centroid
                .iter()
                .zip(&simplex.points[hi])
                .map(|(c, w)| c + (c - w).clamp(-rho, rho))
                .collect();
            let f_reflected = f.call(&reflected)?;

            if f_reflected < simplex.values[lo] {
                let expanded: Vec<f64> = centroid
                    .iter()
                    .zip(&reflected)
                    .map(|(c, r)| c + 2.0 * (r - c))
                    .collect();
                let f_expanded = f.call(&expanded)?;
                if f_expanded < f_reflected {
                    simplex.replace(hi, expanded, f_expanded);
                } else {
                    simplex.replace(hi, reflected, f_reflected);
                }
            } else if f_reflected < simplex.values[second_worst] {
                simplex.replace(hi, reflected, f_reflected);
            } else {
                let contracted: Vec<f64> = centroid
                    .iter()
                    .zip(&simplex.points[hi])
                    .map(|(c, w)| 0.5 * (c + w))
                    .collect();
                let f_contracted = f.call(&contracted)?;
                if f_contracted < simplex.values[hi] {
                    simplex.replace(hi, contracted, f_contracted);
                } else {
                    let anchor = simplex.points[lo].clone();
                    for i in (0..=n).filter(|&i| i != lo) {
                        let shrunk: Vec<f64> = anchor
                            .iter()
                            .zip(&simplex.points[i])
                            .map(|(a, p)| 0.5 * (a + p))
                            .collect();
                        let value = f.call(&shrunk)?;
                        simplex.replace(i, shrunk, value);
                    }
                }
            }

            let best = simplex.values[simplex.best()];
            if best < best_value {
                best_value = best;
                history.push(best);
            }
        }

        let best = simplex.best();
        Ok(OptimizationResult {
            optimal_params: simplex.points[best].clone(),
            optimal_value: simplex.values[best],
            num_evaluations: f.calls,
            num_iterations: iterations,
            history,
            converged,
        })
    }
}

/// Simultaneous-perturbation stochastic approximation.
///
/// Each iteration estimates the gradient from two evaluations along a random
/// ±1 direction. Gains decay as `a / (k+1)^alpha` and `c / (k+1)^gamma`.
#[derive(Debug, Clone)]
pub struct Spsa {
    /// Maximum number of iterations.
    pub maxiter: usize,
    /// Step-size gain.
    pub a: f64,
    /// Perturbation size.
    pub c: f64,
    /// Step-size decay exponent.
    pub alpha: f64,
    /// Perturbation decay exponent.
    pub gamma: f64,
    /// Stop once an update moves every coordinate by less than this.
    pub tol: f64,
    /// Seed for the perturbation directions.
    pub seed: u64,
}

impl Default for Spsa {
    fn default() -> Self {
        Self {
            maxiter: 100,
            a: 0.1,
            c: 0.1,
            alpha: 0.602,
            gamma: 0.101,
            tol: 0.0,
            seed: 42,
        }
    }
}

impl Spsa {
    /// Create with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum iterations.
    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;
        self
    }

    /// Set the step-size and perturbation gains.
    pub fn with_gains(mut self, a: f64, c: f64) -> Self {
        self.a = a;
        self.c = c;
        self
    }

    /// Set the step tolerance.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Seed the perturbation directions.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Optimizer for Spsa {
    #[allow(clippy::cast_precision_loss)]
    fn minimize<F, E>(&self, objective: F, initial: Vec<f64>) -> Result<OptimizationResult, E>
    where
        F: FnMut(&[f64]) -> Result<f64, E>,
    {
        let mut f = Counted::new(objective);
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut x = initial;
        let f0 = f.call(&x)?;
        let mut history = vec![f0];
        let mut best = (x.clone(), f0);
        let mut converged = false;
        let mut iterations = 0;

        while iterations < self.maxiter {
            let k = (iterations + 1) as f64;
            iterations += 1;
            let a_k = self.a / k.powf(self.alpha);
            let c_k = self.c / k.powf(self.gamma);

            let delta: Vec<f64> = (0..x.len())
                .map(|_| if rng.gen_bool(0.5) { 1.0 } else { -1.0 })
                .collect();
            let plus: Vec<f64> = x.iter().zip(&delta).map(|(xi, d)| xi + c_k * d).collect();
            let minus: Vec<f64> = x.iter().zip(&delta).map(|(xi, d)| xi - c_k * d).collect();
            let diff = f.call(&plus)? - f.call(&minus)?;

            let mut largest_step = 0.0f64;
            for (xi, d) in x.iter_mut().zip(&delta) {
                let step = a_k * diff / (2.0 * c_k * d);
                *xi -= step;
                largest_step = largest_step.max(step.abs());
            }

            let value = f.call(&x)?;
            if value < best.1 {
                best = (x.clone(), value);
                history.push(value);
            }
            if largest_step < self.tol {
                converged = true;
                break;
            }
        }

        Ok(OptimizationResult {
            optimal_params: best.0,
            optimal_value: best.1,
            num_evaluations: f.calls,
            num_iterations: iterations,
            history,
            converged,
        })
    }
}

/// Runtime choice between the built-in optimizers.
#[derive(Debug, Clone)]
pub enum OptimizerKind {
    /// Trust-region simplex.
    Cobyla(Cobyla),
    /// Stochastic perturbation.
    Spsa(Spsa),
}

impl Default for OptimizerKind {
    fn default() -> Self {
        OptimizerKind::Cobyla(Cobyla::default())
    }
}

impl OptimizerKind {
    /// Short name for logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            OptimizerKind::Cobyla(_) => "cobyla",
            OptimizerKind::Spsa(_) => "spsa",
        }
    }

    /// Override the iteration limit.
    pub fn with_maxiter(self, maxiter: usize) -> Self {
        match self {
            OptimizerKind::Cobyla(o) => OptimizerKind::Cobyla(o.with_maxiter(maxiter)),
            OptimizerKind::Spsa(o) => OptimizerKind::Spsa(o.with_maxiter(maxiter)),
        }
    }

    /// Override the tolerance.
    pub fn with_tol(self, tol: f64) -> Self {
        match self {
            OptimizerKind::Cobyla(o) => OptimizerKind::Cobyla(o.with_tol(tol)),
            OptimizerKind::Spsa(o) => OptimizerKind::Spsa(o.with_tol(tol)),
        }
    }
}

impl Optimizer for OptimizerKind {
    fn minimize<F, E>(&self, objective: F, initial: Vec<f64>) -> Result<OptimizationResult, E>
    where
        F: FnMut(&[f64]) -> Result<f64, E>,
    {
        match self {
            OptimizerKind::Cobyla(o) => o.minimize(objective, initial),
            OptimizerKind::Spsa(o) => o.minimize(objective, initial),
        }
    }
}
