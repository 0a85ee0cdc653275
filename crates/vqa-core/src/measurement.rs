//! Measurement-basis rewriting.
//!
//! To estimate ⟨P⟩ for a Pauli string `P` from computational-basis samples,
//! each qubit is first rotated so that the eigenbasis of its label becomes
//! the Z basis:
//!
//! | Label | Rotation | Measured |
//! |-------|----------|----------|
//! | `I` | none | no |
//! | `X` | H | yes |
//! | `Y` | S† then H | yes |
//! | `Z` | none | yes |
//!
//! Identity-labeled qubits are left out of the measurement altogether, so
//! the parity of every sampled bitstring is exactly the eigenvalue sign of
//! `P`. An all-identity string therefore measures nothing.

use vqa_ir::{Circuit, Instruction, QubitId, StandardGate};

use crate::error::{VqaError, VqaResult};
use crate::pauli::{Pauli, PauliString};

/// Name of the classical register appended by [`MeasurementPlan::apply`].
pub const MEASUREMENT_REGISTER: &str = "meas";

/// How a single qubit is read out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementBasis {
    /// Not measured.
    Skip,
    /// Hadamard, then measure.
    X,
    /// S-dagger and Hadamard, then measure.
    Y,
    /// Measure directly.
    Z,
}

impl MeasurementBasis {
    /// Basis that diagonalizes `pauli`.
    pub fn for_pauli(pauli: Pauli) -> Self {
        match pauli {
            Pauli::I => MeasurementBasis::Skip,
            Pauli::X => MeasurementBasis::X,
            Pauli::Y => MeasurementBasis::Y,
            Pauli::Z => MeasurementBasis::Z,
        }
    }

    /// Gates applied before measuring, in order.
    pub fn rotation(self) -> &'static [StandardGate] {
        match self {
            MeasurementBasis::Skip | MeasurementBasis::Z => &[],
            MeasurementBasis::X => &[StandardGate::H],
            MeasurementBasis::Y => &[StandardGate::Sdg, StandardGate::H],
        }
    }

    /// Check if the qubit is read out at all.
    pub fn is_measured(self) -> bool {
        self != MeasurementBasis::Skip
    }
}

/// Per-qubit readout recipe for one Pauli string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementPlan {
    bases: Vec<MeasurementBasis>,
}

/// Build the readout recipe for `pauli`.
pub fn prepare_measurement(pauli: &PauliString) -> MeasurementPlan {
    MeasurementPlan {
        bases: pauli
            .labels()
            .iter()
            .map(|&p| MeasurementBasis::for_pauli(p))
            .collect(),
    }
}

impl MeasurementPlan {
    /// Per-qubit bases in qubit order.
    pub fn bases(&self) -> &[MeasurementBasis] {
        &self.bases
    }

    /// Width of the register the plan was built for.
    pub fn num_qubits(&self) -> usize {
        self.bases.len()
    }

    /// Qubits that will be measured, ascending.
    pub fn measured_qubits(&self) -> Vec<usize> {
        self.bases
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_measured())
            .map(|(k, _)| k)
            .collect()
    }

    /// Basis-change gate instructions, qubit by qubit.
    pub fn rotations(&self) -> Vec<Instruction> {
        self.bases
            .iter()
            .enumerate()
            .flat_map(|(k, basis)| {
                basis
                    .rotation()
                    .iter()
                    .map(move |g| Instruction::single_qubit_gate(g.clone(), qubit(k)))
            })
            .collect()
    }

    /// Produce a measured copy of `preparation`.
    ///
    /// The copy gains a fresh classical register of one bit per measured
    /// qubit, placed after any existing bits; the `j`-th measured qubit
    /// (ascending) writes the `j`-th bit of that register. `preparation`
    /// itself is left untouched.
    pub fn apply(&self, preparation: &Circuit) -> VqaResult<Circuit> {
        if preparation.num_qubits() != self.num_qubits() {
            return Err(VqaError::LengthMismatch {
                context: "Pauli string length vs circuit qubits",
                expected: preparation.num_qubits(),
                actual: self.num_qubits(),
            });
        }
        if preparation.has_measurements() {
            return Err(VqaError::MeasuredPreparation(preparation.name().to_string()));
        }

        let measured = self.measured_qubits();
        let mut circuit = preparation.clone();
        let register = circuit.add_creg(MEASUREMENT_REGISTER, register_width(measured.len()));

        for inst in self.rotations() {
            circuit.apply(inst)?;
        }
        for (&k, &clbit) in measured.iter().zip(&register) {
            circuit.measure(qubit(k), clbit)?;
        }
        Ok(circuit)
    }
}

/// Rewrite `preparation` to measure `pauli`; see [`MeasurementPlan::apply`].
pub fn measurement_circuit(preparation: &Circuit, pauli: &PauliString) -> VqaResult<Circuit> {
    prepare_measurement(pauli).apply(preparation)
}

// Register widths come from circuits whose qubit count already fits in u32.
#[allow(clippy::cast_possible_truncation)]
fn qubit(k: usize) -> QubitId {
    QubitId(k as u32)
}

#[allow(clippy::cast_possible_truncation)]
fn register_width(n: usize) -> u32 {
    n as u32
}
