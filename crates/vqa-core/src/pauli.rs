//! Single-qubit Pauli labels and Pauli strings.
//!
//! A [`PauliString`] assigns one label to every qubit of a register.
//! Character `k` of the textual form addresses qubit `k`, so `"XIZ"` is
//! X on qubit 0, identity on qubit 1 and Z on qubit 2.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{VqaError, VqaResult};

/// Single-qubit Pauli operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pauli {
    /// Identity.
    I,
    /// Pauli-X.
    X,
    /// Pauli-Y.
    Y,
    /// Pauli-Z.
    Z,
}

impl Pauli {
    /// Parse one label, case-insensitively.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'I' => Some(Pauli::I),
            'X' => Some(Pauli::X),
            'Y' => Some(Pauli::Y),
            'Z' => Some(Pauli::Z),
            _ => None,
        }
    }

    /// Upper-case label.
    pub fn as_char(self) -> char {
        match self {
            Pauli::I => 'I',
            Pauli::X => 'X',
            Pauli::Y => 'Y',
            Pauli::Z => 'Z',
        }
    }

    /// Check if this is the identity.
    pub fn is_identity(self) -> bool {
        self == Pauli::I
    }
}

impl fmt::Display for Pauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A tensor product of Pauli labels, one per qubit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PauliString {
    labels: Vec<Pauli>,
}

impl PauliString {
    /// Build from explicit labels.
    pub fn new(labels: Vec<Pauli>) -> Self {
        Self { labels }
    }

    /// The all-identity string on `n` qubits.
    pub fn identity(n: usize) -> Self {
        Self::new(vec![Pauli::I; n])
    }

    /// Parse a label string such as `"xIz"`.
    ///
    /// Labels are case-insensitive and normalized to upper case. The empty
    /// string is the 0-qubit identity.
    pub fn parse(s: &str) -> VqaResult<Self> {
        s.chars()
            .enumerate()
            .map(|(position, label)| {
                Pauli::from_char(label).ok_or(VqaError::InvalidPauliLabel { label, position })
            })
            .collect::<VqaResult<Vec<_>>>()
            .map(Self::new)
    }

    /// Number of qubits addressed.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Check if the string addresses no qubits.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels in qubit order.
    pub fn labels(&self) -> &[Pauli] {
        &self.labels
    }

    /// Label on qubit `k`.
    pub fn get(&self, k: usize) -> Option<Pauli> {
        self.labels.get(k).copied()
    }

    /// Check if every label is the identity.
    pub fn is_identity(&self) -> bool {
        self.labels.iter().all(|p| p.is_identity())
    }

    /// Number of non-identity labels.
    pub fn weight(&self) -> usize {
        self.labels.iter().filter(|p| !p.is_identity()).count()
    }

    /// Indices of non-identity labels, ascending.
    pub fn support(&self) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_identity())
            .map(|(k, _)| k)
            .collect()
    }
}

impl fmt::Display for PauliString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for p in &self.labels {
            write!(f, "{p}")?;
        }
        Ok(())
    }
}

impl FromStr for PauliString {
    type Err = VqaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PauliString {
    type Error = VqaError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<PauliString> for String {
    fn from(p: PauliString) -> Self {
        p.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        let p: PauliString = "xIzY".parse().unwrap();
        assert_eq!(p.to_string(), "XIZY");
        assert_eq!(p.labels(), &[Pauli::X, Pauli::I, Pauli::Z, Pauli::Y]);
    }

    #[test]
    fn test_invalid_label_reports_position() {
        match PauliString::parse("XZQ") {
            Err(VqaError::InvalidPauliLabel { label, position }) => {
                assert_eq!(label, 'Q');
                assert_eq!(position, 2);
            }
            other => panic!("expected InvalidPauliLabel, got {other:?}"),
        }
    }

    #[test]
    fn test_whitespace_is_not_a_label() {
        assert!(PauliString::parse("X Z").is_err());
    }

    #[test]
    fn test_empty_string_is_zero_qubit_identity() {
        let p = PauliString::parse("").unwrap();
        assert!(p.is_empty());
        assert!(p.is_identity());
        assert_eq!(p.weight(), 0);
    }

    #[test]
    fn test_weight_and_support() {
        let p = PauliString::parse("IXIYZ").unwrap();
        assert_eq!(p.weight(), 3);
        assert_eq!(p.support(), vec![1, 3, 4]);
        assert_eq!(p.get(0), Some(Pauli::I));
        assert_eq!(p.get(5), None);
        assert!(PauliString::identity(3).is_identity());
    }
}
