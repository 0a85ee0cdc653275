//! Statevector simulation engine.
//!
//! Amplitude index bit `q` is the computational-basis value of qubit `q`.

use num_complex::Complex64;
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_4};

use vqa_hal::{HalError, HalResult};
use vqa_ir::{ParameterExpression, StandardGate};

type Matrix2 = [[Complex64; 2]; 2];

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);

/// A pure state over `num_qubits` qubits.
pub struct Statevector {
    amplitudes: Vec<Complex64>,
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let mut amplitudes = vec![ZERO; 1 << num_qubits];
        amplitudes[0] = ONE;
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Apply a gate to the given qubit indices.
    ///
    /// Symbolic angles are rejected: the caller must bind every parameter
    /// before simulating.
    pub fn apply_gate(&mut self, gate: &StandardGate, qubits: &[usize]) -> HalResult<()> {
        match gate {
            StandardGate::I => {}
            StandardGate::X => self.apply_single(qubits[0], [[ZERO, ONE], [ONE, ZERO]]),
            StandardGate::Y => self.apply_single(qubits[0], [[ZERO, -I], [I, ZERO]]),
            StandardGate::Z => self.apply_diagonal(qubits[0], ONE, -ONE),
            StandardGate::H => {
                let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
                self.apply_single(qubits[0], [[h, h], [h, -h]]);
            }
            StandardGate::S => self.apply_diagonal(qubits[0], ONE, I),
            StandardGate::Sdg => self.apply_diagonal(qubits[0], ONE, -I),
            StandardGate::T => {
                self.apply_diagonal(qubits[0], ONE, Complex64::from_polar(1.0, FRAC_PI_4));
            }
            StandardGate::Rx(theta) => self.apply_single(qubits[0], rx_matrix(angle(theta)?)),
            StandardGate::Ry(theta) => self.apply_single(qubits[0], ry_matrix(angle(theta)?)),
            StandardGate::Rz(theta) => {
                let t = angle(theta)?;
                self.apply_diagonal(
                    qubits[0],
                    Complex64::from_polar(1.0, -t / 2.0),
                    Complex64::from_polar(1.0, t / 2.0),
                );
            }
            StandardGate::P(theta) => {
                self.apply_diagonal(qubits[0], ONE, Complex64::from_polar(1.0, angle(theta)?));
            }
            StandardGate::CX => {
                self.apply_controlled(qubits[0], qubits[1], [[ZERO, ONE], [ONE, ZERO]]);
            }
            StandardGate::CZ => self.apply_cz(qubits[0], qubits[1]),
            StandardGate::Swap => self.apply_swap(qubits[0], qubits[1]),
        }
        Ok(())
    }

    /// General single-qubit unitary.
    fn apply_single(&mut self, qubit: usize, m: Matrix2) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let (a, b) = (self.amplitudes[i], self.amplitudes[j]);
                self.amplitudes[i] = m[0][0] * a + m[0][1] * b;
                self.amplitudes[j] = m[1][0] * a + m[1][1] * b;
            }
        }
    }

    fn apply_diagonal(&mut self, qubit: usize, d0: Complex64, d1: Complex64) {
        let mask = 1 << qubit;
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            *amp *= if i & mask == 0 { d0 } else { d1 };
        }
    }

    /// Single-qubit unitary on `target`, applied where `control` is |1⟩.
    fn apply_controlled(&mut self, control: usize, target: usize, m: Matrix2) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        for i in 0..self.amplitudes.len() {
            if i & ctrl_mask != 0 && i & tgt_mask == 0 {
                let j = i | tgt_mask;
                let (a, b) = (self.amplitudes[i], self.amplitudes[j]);
                self.amplitudes[i] = m[0][0] * a + m[0][1] * b;
                self.amplitudes[j] = m[1][0] * a + m[1][1] * b;
            }
        }
    }

    fn apply_cz(&mut self, q1: usize, q2: usize) {
        let both = (1 << q1) | (1 << q2);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & both == both {
                *amp = -*amp;
            }
        }
    }

    fn apply_swap(&mut self, q1: usize, q2: usize) {
        let (m1, m2) = (1 << q1, 1 << q2);
        for i in 0..self.amplitudes.len() {
            if i & m1 != 0 && i & m2 == 0 {
                self.amplitudes.swap(i, (i & !m1) | m2);
            }
        }
    }

    /// Cumulative outcome distribution, normalized so the last entry is 1.
    pub fn cumulative_probabilities(&self) -> Vec<f64> {
        let mut acc = 0.0;
        let mut cdf: Vec<f64> = self
            .amplitudes
            .iter()
            .map(|a| {
                acc += a.norm_sqr();
                acc
            })
            .collect();
        if acc > 0.0 {
            for p in &mut cdf {
                *p /= acc;
            }
        }
        cdf
    }

    /// Probability of each basis state.
    #[cfg(test)]
    fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(Complex64::norm_sqr).collect()
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }
}

fn angle(p: &ParameterExpression) -> HalResult<f64> {
    p.value().map_err(|e| HalError::InvalidCircuit(e.to_string()))
}

fn rx_matrix(theta: f64) -> Matrix2 {
    let c = Complex64::new((theta / 2.0).cos(), 0.0);
    let s = Complex64::new(0.0, -(theta / 2.0).sin());
    [[c, s], [s, c]]
}

fn ry_matrix(theta: f64) -> Matrix2 {
    let c = Complex64::new((theta / 2.0).cos(), 0.0);
    let s = Complex64::new((theta / 2.0).sin(), 0.0);
    [[c, -s], [s, c]]
}

/// Index of the outcome selected by a uniform draw `r` in `[0, 1)`.
pub fn sample_index(cdf: &[f64], r: f64) -> usize {
    cdf.partition_point(|&p| p <= r).min(cdf.len().saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-10
    }

    #[test]
    fn test_initial_state() {
        let sv = Statevector::new(2);
        assert_eq!(sv.probabilities(), vec![1.0, 0.0, 0.0, 0.0]);
        assert_eq!(sv.num_qubits(), 2);
    }

    #[test]
    fn test_hadamard_then_sdg_h_maps_plus_i_to_zero() {
        // S·H|0⟩ = |+i⟩, and the Y-basis rotation Sdg then H sends it to |0⟩.
        let mut sv = Statevector::new(1);
        sv.apply_gate(&StandardGate::H, &[0]).unwrap();
        sv.apply_gate(&StandardGate::S, &[0]).unwrap();
        sv.apply_gate(&StandardGate::Sdg, &[0]).unwrap();
        sv.apply_gate(&StandardGate::H, &[0]).unwrap();
        let p = sv.probabilities();
        assert!(close(p[0], 1.0));
    }

    #[test]
    fn test_single_qubit_gates() {
        let c = |t: f64| StandardGate::P(ParameterExpression::constant(t));
        // (gate sequence from |0⟩, expected probability of |1⟩)
        let cases: Vec<(Vec<StandardGate>, f64)> = vec![
            (vec![StandardGate::I], 0.0),
            (vec![StandardGate::X], 1.0),
            (vec![StandardGate::Y], 1.0),
            (vec![StandardGate::H, StandardGate::Z, StandardGate::H], 1.0),
            (vec![StandardGate::H, StandardGate::S, StandardGate::S, StandardGate::H], 1.0),
            (
                vec![
                    StandardGate::H,
                    StandardGate::T,
                    StandardGate::T,
                    StandardGate::Sdg,
                    StandardGate::H,
                ],
                0.0,
            ),
            (vec![StandardGate::H, c(PI), StandardGate::H], 1.0),
            (vec![StandardGate::H, c(PI / 2.0), StandardGate::Sdg, StandardGate::H], 0.0),
            (vec![StandardGate::Rx(ParameterExpression::constant(PI))], 1.0),
            (vec![StandardGate::Ry(ParameterExpression::constant(PI / 2.0))], 0.5),
            (
                vec![
                    StandardGate::H,
                    StandardGate::Rz(ParameterExpression::constant(PI)),
                    StandardGate::H,
                ],
                1.0,
            ),
        ];

        for (gates, expected) in cases {
            let mut sv = Statevector::new(1);
            for gate in &gates {
                sv.apply_gate(gate, &[0]).unwrap();
            }
            let p1 = sv.probabilities()[1];
            assert!(close(p1, expected), "{gates:?}: P(1) = {p1}");
        }
    }

    #[test]
    fn test_cz_phase_kickback() {
        // With the control set, H·CZ·H on the target acts as CX.
        let mut sv = Statevector::new(2);
        sv.apply_gate(&StandardGate::X, &[0]).unwrap();
        sv.apply_gate(&StandardGate::H, &[1]).unwrap();
        sv.apply_gate(&StandardGate::CZ, &[0, 1]).unwrap();
        sv.apply_gate(&StandardGate::H, &[1]).unwrap();
        assert!(close(sv.probabilities()[0b11], 1.0));
    }

    #[test]
    fn test_bell_state() {
        let mut sv = Statevector::new(2);
        sv.apply_gate(&StandardGate::H, &[0]).unwrap();
        sv.apply_gate(&StandardGate::CX, &[0, 1]).unwrap();
        let p = sv.probabilities();
        assert!(close(p[0], 0.5));
        assert!(close(p[1], 0.0));
        assert!(close(p[2], 0.0));
        assert!(close(p[3], 0.5));
    }

    #[test]
    fn test_ry_populations() {
        let mut sv = Statevector::new(1);
        sv.apply_gate(&StandardGate::Ry(ParameterExpression::constant(PI / 3.0)), &[0])
            .unwrap();
        let p = sv.probabilities();
        assert!(close(p[0], (PI / 6.0).cos().powi(2)));
    }

    #[test]
    fn test_swap_moves_excitation() {
        let mut sv = Statevector::new(2);
        sv.apply_gate(&StandardGate::X, &[0]).unwrap();
        sv.apply_gate(&StandardGate::Swap, &[0, 1]).unwrap();
        assert!(close(sv.probabilities()[0b10], 1.0));
    }

    #[test]
    fn test_unbound_angle_is_invalid_circuit() {
        let mut sv = Statevector::new(1);
        let err = sv
            .apply_gate(&StandardGate::Rz(ParameterExpression::symbol("t")), &[0])
            .unwrap_err();
        assert!(matches!(err, HalError::InvalidCircuit(_)));
    }

    #[test]
    fn test_sample_index_edges() {
        let cdf = [0.25, 0.25, 1.0];
        assert_eq!(sample_index(&cdf, 0.0), 0);
        assert_eq!(sample_index(&cdf, 0.25), 2);
        assert_eq!(sample_index(&cdf, 0.999_999), 2);
    }
}
