//! Weighted sums of Pauli strings.
//!
//! A cost operator is
//!
//!   H = Σ_k  w_k · P_k
//!
//! where every `P_k` is a [`PauliString`] over the same register and
//! `w_k ∈ ℂ`. Terms are kept in insertion order and never merged.
//!
//! # Example
//!
//! ```rust
//! use vqa_core::WeightedHamiltonian;
//!
//! let h = WeightedHamiltonian::from_real(&[0.5, -0.3, 1.2], &["IZZ", "ZZI", "ZIZ"]).unwrap();
//! assert_eq!(h.len(), 3);
//! assert_eq!(h.num_qubits(), Some(3));
//! ```

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{VqaError, VqaResult};
use crate::pauli::PauliString;

/// One weighted Pauli term: `coefficient · pauli`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PauliTerm {
    /// Term weight.
    pub coefficient: Complex64,
    /// The Pauli string.
    pub pauli: PauliString,
}

impl PauliTerm {
    /// Create a new term.
    pub fn new(coefficient: impl Into<Complex64>, pauli: PauliString) -> Self {
        Self {
            coefficient: coefficient.into(),
            pauli,
        }
    }
}

/// An ordered list of weighted Pauli terms sharing one qubit count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PauliTerm>", into = "Vec<PauliTerm>")]
pub struct WeightedHamiltonian {
    terms: Vec<PauliTerm>,
}

impl WeightedHamiltonian {
    /// Create from terms, checking that all Pauli strings have one length.
    pub fn new(terms: Vec<PauliTerm>) -> VqaResult<Self> {
        if let Some(first) = terms.first() {
            let expected = first.pauli.len();
            if let Some(bad) = terms.iter().find(|t| t.pauli.len() != expected) {
                return Err(VqaError::LengthMismatch {
                    context: "Pauli string length across terms",
                    expected,
                    actual: bad.pauli.len(),
                });
            }
        }
        Ok(Self { terms })
    }

    /// Zip parallel weight and Pauli sequences.
    pub fn from_parts(
        weights: impl IntoIterator<Item = Complex64>,
        paulis: impl IntoIterator<Item = PauliString>,
    ) -> VqaResult<Self> {
        let weights: Vec<_> = weights.into_iter().collect();
        let paulis: Vec<_> = paulis.into_iter().collect();
        if weights.len() != paulis.len() {
            return Err(VqaError::LengthMismatch {
                context: "weights vs Pauli strings",
                expected: weights.len(),
                actual: paulis.len(),
            });
        }
        Self::new(
            weights
                .into_iter()
                .zip(paulis)
                .map(|(w, p)| PauliTerm::new(w, p))
                .collect(),
        )
    }

    /// Real weights and textual Pauli labels.
    pub fn from_real(weights: &[f64], paulis: &[&str]) -> VqaResult<Self> {
        let parsed = paulis
            .iter()
            .map(|s| PauliString::parse(s))
            .collect::<VqaResult<Vec<_>>>()?;
        Self::from_parts(weights.iter().map(|&w| Complex64::new(w, 0.0)), parsed)
    }

    /// All terms in insertion order.
    pub fn terms(&self) -> &[PauliTerm] {
        &self.terms
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Check if there are no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Shared Pauli-string length, or `None` for an empty Hamiltonian.
    pub fn num_qubits(&self) -> Option<usize> {
        self.terms.first().map(|t| t.pauli.len())
    }

    /// Sum of coefficients of the all-identity terms (the constant offset).
    pub fn identity_coefficient(&self) -> Complex64 {
        self.terms
            .iter()
            .filter(|t| t.pauli.is_identity())
            .map(|t| t.coefficient)
            .sum()
    }

    /// Check if every coefficient is real within `tol`.
    pub fn is_real(&self, tol: f64) -> bool {
        self.terms.iter().all(|t| t.coefficient.im.abs() <= tol)
    }
}

impl TryFrom<Vec<PauliTerm>> for WeightedHamiltonian {
    type Error = VqaError;

    fn try_from(terms: Vec<PauliTerm>) -> Result<Self, Self::Error> {
        Self::new(terms)
    }
}

impl From<WeightedHamiltonian> for Vec<PauliTerm> {
    fn from(h: WeightedHamiltonian) -> Self {
        h.terms
    }
}

impl fmt::Display for WeightedHamiltonian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        for (i, term) in self.terms.iter().enumerate() {
            let c = term.coefficient;
            let sep = if i == 0 { "" } else { " + " };
            if c.im == 0.0 {
                write!(f, "{sep}{:.4} {}", c.re, term.pauli)?;
            } else {
                write!(f, "{sep}({:.4}{:+.4}i) {}", c.re, c.im, term.pauli)?;
            }
        }
        Ok(())
    }
}
