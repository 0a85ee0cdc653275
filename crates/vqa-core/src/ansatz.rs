//! Ready-made ansatz circuits.
//!
//! Each template is built once with symbolic angles `theta_000`,
//! `theta_001`, … and binds parameter `k` to the `k`-th angle in gate
//! order, independent of how the names sort.

use vqa_ir::{Circuit, ParameterExpression, QubitId};

use crate::error::VqaResult;
use crate::objective::{Ansatz, ParameterizedCircuit};

/// Hands out fresh angle symbols and remembers their order.
#[derive(Default)]
struct Angles {
    names: Vec<String>,
}

impl Angles {
    fn fresh(&mut self) -> ParameterExpression {
        let name = format!("theta_{:03}", self.names.len());
        self.names.push(name.clone());
        ParameterExpression::symbol(name)
    }

    fn finish(self, template: Circuit) -> VqaResult<ParameterizedCircuit> {
        ParameterizedCircuit::with_order(template, self.names)
    }
}

#[allow(clippy::cast_possible_truncation)]
fn q(k: usize) -> QubitId {
    QubitId(k as u32)
}

#[allow(clippy::cast_possible_truncation)]
fn empty(name: &str, n: usize) -> Circuit {
    Circuit::with_size(name, n as u32, 0)
}

/// Linear nearest-neighbour CZ ladder.
fn entangle(circuit: &mut Circuit, n: usize) -> VqaResult<()> {
    for k in 1..n {
        circuit.cz(q(k - 1), q(k))?;
    }
    Ok(())
}

/// One Ry per qubit.
///
/// Parameters: `n`.
#[derive(Debug, Clone)]
pub struct RyAnsatz {
    inner: ParameterizedCircuit,
}

impl RyAnsatz {
    /// Build the template on `n` qubits.
    pub fn new(n: usize) -> VqaResult<Self> {
        let mut c = empty("ry_ansatz", n);
        let mut angles = Angles::default();
        for k in 0..n {
            c.ry(angles.fresh(), q(k))?;
        }
        Ok(Self {
            inner: angles.finish(c)?,
        })
    }
}

/// Ry layers separated by CZ entanglers.
///
/// Parameters: `n · (reps + 1)`.
#[derive(Debug, Clone)]
pub struct TwoLocal {
    inner: ParameterizedCircuit,
    reps: usize,
}

impl TwoLocal {
    /// Build the template on `n` qubits with `reps` entangling layers.
    pub fn new(n: usize, reps: usize) -> VqaResult<Self> {
        let mut c = empty("two_local", n);
        let mut angles = Angles::default();
        for layer in 0..=reps {
            if layer > 0 {
                entangle(&mut c, n)?;
            }
            for k in 0..n {
                c.ry(angles.fresh(), q(k))?;
            }
        }
        Ok(Self {
            inner: angles.finish(c)?,
            reps,
        })
    }

    /// Number of entangling layers.
    pub fn reps(&self) -> usize {
        self.reps
    }
}

/// Ry·Rz layers separated by CZ entanglers.
///
/// Parameters: `2 · n · (reps + 1)`.
#[derive(Debug, Clone)]
pub struct HardwareEfficient {
    inner: ParameterizedCircuit,
    reps: usize,
}

impl HardwareEfficient {
    /// Build the template on `n` qubits with `reps` entangling layers.
    pub fn new(n: usize, reps: usize) -> VqaResult<Self> {
        let mut c = empty("hw_efficient", n);
        let mut angles = Angles::default();
        for layer in 0..=reps {
            if layer > 0 {
                entangle(&mut c, n)?;
            }
            for k in 0..n {
                c.ry(angles.fresh(), q(k))?;
                c.rz(angles.fresh(), q(k))?;
            }
        }
        Ok(Self {
            inner: angles.finish(c)?,
            reps,
        })
    }

    /// Number of entangling layers.
    pub fn reps(&self) -> usize {
        self.reps
    }
}

macro_rules! delegate_ansatz {
    ($($ty:ty),*) => {$(
        impl Ansatz for $ty {
            fn name(&self) -> &str {
                self.inner.name()
            }

            fn num_qubits(&self) -> usize {
                self.inner.num_qubits()
            }

            fn num_parameters(&self) -> usize {
                self.inner.num_parameters()
            }

            fn prepare(&self, params: &[f64]) -> VqaResult<Circuit> {
                self.inner.prepare(params)
            }
        }
    )*};
}

delegate_ansatz!(RyAnsatz, TwoLocal, HardwareEfficient);
