//! Simulator backend implementation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::{FxHashMap, FxHasher};
use std::hash::Hasher;
use std::time::Instant;
use tracing::{debug, instrument};

use vqa_hal::{
    Backend, BackendConfig, BackendFactory, Counts, ExecutionResult, HalError, HalResult,
    ValidationResult,
};
use vqa_ir::{Circuit, InstructionKind};

use crate::statevector::{Statevector, sample_index};

const DEFAULT_MAX_QUBITS: usize = 20;

/// Local statevector sampling backend.
///
/// Measurements must be terminal: once a qubit has been measured no further
/// gate may touch it. The state is then evolved once and all shots are
/// drawn from the final distribution.
///
/// An unseeded simulator draws from OS entropy. A seeded simulator derives
/// each run's generator from the seed, the circuit and the shot count, so an
/// identical request always returns identical counts regardless of how many
/// runs came before it or which thread issued them.
#[derive(Debug, Clone)]
pub struct SimulatorBackend {
    config: BackendConfig,
    max_qubits: usize,
    seed: Option<u64>,
}

impl SimulatorBackend {
    /// Create a new simulator backend with default settings.
    pub fn new() -> Self {
        Self {
            config: BackendConfig::new("simulator"),
            max_qubits: DEFAULT_MAX_QUBITS,
            seed: None,
        }
    }

    /// Limit the accepted circuit width.
    #[must_use]
    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits;
        self
    }

    /// Make sampling reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The configured seed, if any.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    fn rng_for(&self, circuit: &Circuit, shots: u32) -> HalResult<StdRng> {
        match self.seed {
            None => Ok(StdRng::from_entropy()),
            Some(seed) => {
                let mut hasher = FxHasher::default();
                hasher.write(&serde_json::to_vec(circuit)?);
                hasher.write_u64(seed);
                hasher.write_u32(shots);
                Ok(StdRng::seed_from_u64(hasher.finish()))
            }
        }
    }

    /// Evolve the state and collect the `(qubit, clbit)` measurement map.
    fn evolve(circuit: &Circuit) -> HalResult<(Statevector, Vec<(usize, usize)>)> {
        let mut sv = Statevector::new(circuit.num_qubits());
        let mut measured = vec![false; circuit.num_qubits()];
        let mut measurements = Vec::new();

        for inst in circuit.instructions() {
            match &inst.kind {
                InstructionKind::Gate(gate) => {
                    if let Some(q) = inst.qubits.iter().find(|q| measured[q.index()]) {
                        return Err(HalError::Unsupported(format!(
                            "mid-circuit measurement: gate '{}' acts on {q} after it was measured",
                            gate.name()
                        )));
                    }
                    let qubits: Vec<usize> = inst.qubits.iter().map(|q| q.index()).collect();
                    sv.apply_gate(gate, &qubits)?;
                }
                InstructionKind::Measure => {
                    for (q, c) in inst.qubits.iter().zip(&inst.clbits) {
                        measured[q.index()] = true;
                        measurements.push((q.index(), c.index()));
                    }
                }
            }
        }
        Ok((sv, measurements))
    }

    #[instrument(
        skip(self, circuit),
        fields(circuit = circuit.name(), qubits = circuit.num_qubits())
    )]
    fn run_simulation(&self, circuit: &Circuit, shots: u32) -> HalResult<ExecutionResult> {
        let start = Instant::now();

        let (sv, measurements) = Self::evolve(circuit)?;
        let cdf = sv.cumulative_probabilities();
        debug!(
            num_qubits = sv.num_qubits(),
            measured = measurements.len(),
            instructions = circuit.instructions().len(),
            "state evolved"
        );

        let mut rng = self.rng_for(circuit, shots)?;
        let mut outcomes: FxHashMap<usize, u64> = FxHashMap::default();
        for _ in 0..shots {
            let r: f64 = rng.r#gen();
            *outcomes.entry(sample_index(&cdf, r)).or_insert(0) += 1;
        }

        let mut counts = Counts::new();
        for (outcome, n) in outcomes {
            counts.insert(clbit_string(outcome, &measurements, circuit.num_clbits()), n);
        }

        let elapsed = start.elapsed();
        debug!(distinct = counts.len(), ?elapsed, "sampling complete");

        let ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        Ok(ExecutionResult::new(counts, shots).with_execution_time(ms))
    }
}

/// Render the classical register for one basis-state outcome. Character `c`
/// is clbit `c`. Unwritten bits read `'0'`; a later measurement into the same
/// bit wins.
fn clbit_string(outcome: usize, measurements: &[(usize, usize)], num_clbits: usize) -> String {
    let mut bits = vec![b'0'; num_clbits];
    for &(qubit, clbit) in measurements {
        bits[clbit] = if (outcome >> qubit) & 1 == 1 { b'1' } else { b'0' };
    }
    bits.into_iter().map(char::from).collect()
}

impl Default for SimulatorBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn max_qubits(&self) -> usize {
        self.max_qubits
    }

    fn run(&self, circuit: &Circuit, shots: u32) -> HalResult<ExecutionResult> {
        if shots == 0 {
            return Err(HalError::InvalidShots("shots must be positive".into()));
        }
        if let ValidationResult::Invalid { reasons } = self.validate(circuit) {
            return Err(HalError::CircuitTooLarge(reasons.join("; ")));
        }
        if circuit.is_parameterized() {
            let names: Vec<_> = circuit.parameters().into_iter().collect();
            return Err(HalError::InvalidCircuit(format!(
                "unbound parameters: {}",
                names.join(", ")
            )));
        }
        self.run_simulation(circuit, shots)
    }
}

impl BackendFactory for SimulatorBackend {
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        let max_qubits = match config.get_u64("max_qubits")? {
            Some(v) => usize::try_from(v)
                .map_err(|_| HalError::Configuration(format!("max_qubits {v} out of range")))?,
            None => DEFAULT_MAX_QUBITS,
        };
        let seed = config.get_u64("seed")?;

        Ok(Self {
            config,
            max_qubits,
            seed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vqa_ir::{ClbitId, ParameterExpression, QubitId};

    fn bell() -> Circuit {
        let mut circuit = Circuit::with_size("bell", 2, 2);
        circuit
            .h(QubitId(0))
            .unwrap()
            .cx(QubitId(0), QubitId(1))
            .unwrap()
            .measure(QubitId(0), ClbitId(0))
            .unwrap()
            .measure(QubitId(1), ClbitId(1))
            .unwrap();
        circuit
    }

    #[test]
    fn test_simulator_bell_state() {
        let backend = SimulatorBackend::new();
        let result = backend.run(&bell(), 1000).unwrap();

        assert_eq!(result.shots, 1000);
        let counts = &result.counts;
        assert_eq!(counts.get("00") + counts.get("11"), 1000);
        assert_eq!(counts.get("01") + counts.get("10"), 0);
    }

    #[test]
    fn test_bitstring_character_order_is_clbit_order() {
        // X on q1 only; q1 -> c0, q0 -> c1. Character 0 must be '1'.
        let mut circuit = Circuit::with_size("order", 2, 2);
        circuit
            .x(QubitId(1))
            .unwrap()
            .measure(QubitId(1), ClbitId(0))
            .unwrap()
            .measure(QubitId(0), ClbitId(1))
            .unwrap();
        let result = SimulatorBackend::new().run(&circuit, 50).unwrap();
        assert_eq!(result.counts.get("10"), 50);
    }

    #[test]
    fn test_unmeasured_clbits_read_zero() {
        let mut circuit = Circuit::with_size("partial", 1, 3);
        circuit
            .x(QubitId(0))
            .unwrap()
            .measure(QubitId(0), ClbitId(2))
            .unwrap();
        let result = SimulatorBackend::new().run(&circuit, 10).unwrap();
        assert_eq!(result.counts.get("001"), 10);
    }

    #[test]
    fn test_no_clbits_yields_empty_bitstrings() {
        let mut circuit = Circuit::with_size("none", 1, 0);
        circuit.h(QubitId(0)).unwrap();
        let result = SimulatorBackend::new().run(&circuit, 25).unwrap();
        assert_eq!(result.counts.get(""), 25);
    }

    #[test]
    fn test_builder_gates_on_every_wire() {
        use std::f64::consts::PI;

        let mut circuit = Circuit::with_size("gates", 9, 0);
        let q = QubitId;
        circuit.h(q(0)).unwrap().z(q(0)).unwrap().h(q(0)).unwrap();
        circuit.h(q(1)).unwrap().s(q(1)).unwrap().s(q(1)).unwrap().h(q(1)).unwrap();
        circuit
            .h(q(2))
            .unwrap()
            .t(q(2))
            .unwrap()
            .t(q(2))
            .unwrap()
            .sdg(q(2))
            .unwrap()
            .h(q(2))
            .unwrap();
        circuit.h(q(3)).unwrap().p(PI, q(3)).unwrap().h(q(3)).unwrap();
        circuit.rx(PI, q(4)).unwrap();
        circuit.y(q(5)).unwrap();
        circuit.h(q(6)).unwrap().rz(PI, q(6)).unwrap().h(q(6)).unwrap();
        circuit
            .x(q(7))
            .unwrap()
            .h(q(8))
            .unwrap()
            .cz(q(7), q(8))
            .unwrap()
            .h(q(8))
            .unwrap();
        circuit.measure_all().unwrap();

        let result = SimulatorBackend::new().with_seed(3).run(&circuit, 200).unwrap();
        assert_eq!(result.counts.get("110111111"), 200);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let mut circuit = Circuit::with_size("plus", 1, 1);
        circuit
            .h(QubitId(0))
            .unwrap()
            .measure(QubitId(0), ClbitId(0))
            .unwrap();

        let backend = SimulatorBackend::new().with_seed(7);
        let first = backend.run(&circuit, 500).unwrap().counts;
        let second = backend.run(&circuit, 500).unwrap().counts;
        assert_eq!(first, second);

        let other = SimulatorBackend::new().with_seed(7);
        assert_eq!(other.run(&circuit, 500).unwrap().counts, first);
    }

    #[test]
    fn test_simulator_too_many_qubits() {
        let backend = SimulatorBackend::new().with_max_qubits(5);
        let circuit = Circuit::with_size("test", 10, 0);
        let result = backend.run(&circuit, 100);
        assert!(matches!(result, Err(HalError::CircuitTooLarge(_))));
    }

    #[test]
    fn test_zero_shots_rejected() {
        let result = SimulatorBackend::new().run(&bell(), 0);
        assert!(matches!(result, Err(HalError::InvalidShots(_))));
    }

    #[test]
    fn test_unbound_parameters_rejected() {
        let mut circuit = Circuit::with_size("template", 1, 0);
        circuit
            .ry(ParameterExpression::symbol("theta_000"), QubitId(0))
            .unwrap();
        let err = SimulatorBackend::new().run(&circuit, 10).unwrap_err();
        assert!(matches!(err, HalError::InvalidCircuit(msg) if msg.contains("theta_000")));
    }

    #[test]
    fn test_mid_circuit_measurement_rejected() {
        let mut circuit = Circuit::with_size("mid", 1, 1);
        circuit
            .measure(QubitId(0), ClbitId(0))
            .unwrap()
            .h(QubitId(0))
            .unwrap();
        let err = SimulatorBackend::new().run(&circuit, 10).unwrap_err();
        assert!(matches!(err, HalError::Unsupported(_)));
    }

    #[test]
    fn test_from_config() {
        let config = BackendConfig::new("sim")
            .with_extra("max_qubits", serde_json::json!(4))
            .with_extra("seed", serde_json::json!(11));
        let backend = SimulatorBackend::from_config(config).unwrap();
        assert_eq!(backend.name(), "sim");
        assert_eq!(backend.max_qubits(), 4);
        assert_eq!(backend.seed(), Some(11));
    }
}
