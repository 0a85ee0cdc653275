//! Circuit representation for variational state preparation.
//!
//! A [`Circuit`] is a qubit count, a list of classical bits and an ordered
//! list of [`Instruction`]s. Gate angles are [`ParameterExpression`]s, so one
//! circuit can serve as an ansatz template and be bound to concrete
//! values with [`Circuit::bind_parameters`].
//!
//! # Example: a parameterized preparation
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use vqa_ir::{Circuit, ParameterExpression, QubitId};
//!
//! let mut template = Circuit::with_size("ry_layer", 2, 0);
//! template.ry(ParameterExpression::symbol("theta_000"), QubitId(0)).unwrap();
//! template.ry(ParameterExpression::symbol("theta_001"), QubitId(1)).unwrap();
//! template.cz(QubitId(0), QubitId(1)).unwrap();
//!
//! let values = BTreeMap::from([
//!     ("theta_000".to_string(), 0.3),
//!     ("theta_001".to_string(), -0.7),
//! ]);
//! let bound = template.bind_parameters(&values);
//! assert!(!bound.is_parameterized());
//! assert_eq!(bound.depth(), 2);
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `I`, `X`, `Y`, `Z` | 1 | Pauli gates |
//! | `H` | 1 | Hadamard gate |
//! | `S`, `Sdg`, `T` | 1 | Phase gates |
//! | `Rx`, `Ry`, `Rz`, `P` | 1 | Rotation and phase gates |
//! | `CX`, `CZ` | 2 | Controlled Paulis |
//! | `Swap` | 2 | SWAP gate |

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod parameter;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::StandardGate;
pub use instruction::{Instruction, InstructionKind};
pub use parameter::ParameterExpression;
pub use qubit::{Clbit, ClbitId, QubitId};
