//! Expectation estimation from sampled bitstrings.
//!
//! With the circuit rewritten by [`crate::measurement`], every sampled
//! bitstring holds exactly the measured (non-identity) qubits, and the
//! eigenvalue of the Pauli string on that outcome is the parity
//!
//!   sign(b) = (−1)^(number of '1' bits in b)
//!
//! The estimate is the count-weighted mean of those signs. Accumulation is
//! done in integers so the result only rounds once.

use serde::{Deserialize, Serialize};
use vqa_hal::Counts;

use crate::error::{VqaError, VqaResult};
use crate::pauli::PauliString;

/// Eigenvalue sign of a measured bitstring: `+1` for even parity, `-1` for odd.
pub fn parity_sign(bitstring: &str) -> VqaResult<i64> {
    let mut ones = 0usize;
    for c in bitstring.chars() {
        match c {
            '0' => {}
            '1' => ones += 1,
            other => return Err(invalid_char(bitstring, other)),
        }
    }
    Ok(if ones % 2 == 0 { 1 } else { -1 })
}

/// Estimate ⟨P⟩ from counts whose bitstrings hold only the measured qubits.
///
/// Fails with [`VqaError::ZeroShots`] when `total_shots` is zero,
/// [`VqaError::InvalidBitstring`] for keys that are not equal-length strings
/// over `{0, 1}`, and [`VqaError::InconsistentShotCount`] when the counts do
/// not add up to `total_shots`.
///
/// ```rust
/// use vqa_core::estimate_expectation;
/// use vqa_hal::Counts;
///
/// let counts: Counts = [("00", 40), ("11", 40), ("01", 20)].into_iter().collect();
/// let e = estimate_expectation(&counts, 100).unwrap();
/// assert!((e - 0.6).abs() < 1e-12);
/// ```
#[allow(clippy::cast_precision_loss)]
pub fn estimate_expectation(counts: &Counts, total_shots: u64) -> VqaResult<f64> {
    if total_shots == 0 {
        return Err(VqaError::ZeroShots);
    }
    check_uniform_width(counts)?;

    let signed = signed_sum(counts, total_shots, |bitstring| {
        Ok(i128::from(parity_sign(bitstring)?))
    })?;
    Ok(signed as f64 / total_shots as f64)
}

/// Estimate ⟨P⟩ from full-register counts.
///
/// Here every qubit was measured (character `k` is qubit `k`) after the
/// rotations for `pauli`, as `Circuit::measure_all` would produce. Bits at
/// identity positions do not contribute to the sign.
#[allow(clippy::cast_precision_loss)]
pub fn estimate_pauli_expectation(
    counts: &Counts,
    total_shots: u64,
    pauli: &PauliString,
) -> VqaResult<f64> {
    if total_shots == 0 {
        return Err(VqaError::ZeroShots);
    }
    if let Some(width) = check_uniform_width(counts)? {
        if width != pauli.len() {
            return Err(VqaError::LengthMismatch {
                context: "bitstring width vs Pauli string length",
                expected: pauli.len(),
                actual: width,
            });
        }
    }

    let support = pauli.support();
    let signed = signed_sum(counts, total_shots, |bitstring| {
        let bytes = bitstring.as_bytes();
        let ones = support.iter().filter(|&&k| bytes[k] == b'1').count();
        Ok(if ones % 2 == 0 { 1 } else { -1 })
    })?;
    Ok(signed as f64 / total_shots as f64)
}

/// Binomial standard error of a ±1-valued mean: `sqrt((1 − e²) / shots)`.
#[allow(clippy::cast_precision_loss)]
pub fn standard_error(expectation: f64, shots: u64) -> f64 {
    if shots == 0 {
        return 0.0;
    }
    ((1.0 - expectation * expectation).max(0.0) / shots as f64).sqrt()
}

/// An expectation value with its sampling uncertainty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpectationEstimate {
    /// Estimated ⟨P⟩ in [−1, 1].
    pub value: f64,
    /// One-sigma standard error.
    pub standard_error: f64,
    /// Shots the estimate is based on (zero when computed exactly).
    pub shots: u64,
}

impl ExpectationEstimate {
    /// Estimate from counts.
    pub fn from_counts(counts: &Counts, total_shots: u64) -> VqaResult<Self> {
        let value = estimate_expectation(counts, total_shots)?;
        Ok(Self {
            value,
            standard_error: standard_error(value, total_shots),
            shots: total_shots,
        })
    }

    /// A value known without sampling.
    pub fn exact(value: f64) -> Self {
        Self {
            value,
            standard_error: 0.0,
            shots: 0,
        }
    }
}

/// Σ sign(b)·count(b), checking that the counts add up to `total_shots`.
///
/// A histogram whose sum overflows `u64` cannot match any declared total; it
/// is reported as inconsistent with `observed` saturated at `u64::MAX`.
fn signed_sum(
    counts: &Counts,
    total_shots: u64,
    mut sign: impl FnMut(&str) -> VqaResult<i128>,
) -> VqaResult<i128> {
    let mut observed = 0u64;
    let mut signed = 0i128;
    for (bitstring, &count) in counts.iter() {
        observed = observed
            .checked_add(count)
            .ok_or(VqaError::InconsistentShotCount {
                expected: total_shots,
                observed: u64::MAX,
            })?;
        signed += sign(bitstring)? * i128::from(count);
    }
    if observed != total_shots {
        return Err(VqaError::InconsistentShotCount {
            expected: total_shots,
            observed,
        });
    }
    Ok(signed)
}

/// Validate every key and return the shared width (`None` when empty).
fn check_uniform_width(counts: &Counts) -> VqaResult<Option<usize>> {
    let mut width = None;
    for (bitstring, _) in counts.iter() {
        if let Some(bad) = bitstring.chars().find(|c| !matches!(c, '0' | '1')) {
            return Err(invalid_char(bitstring, bad));
        }
        match width {
            None => width = Some(bitstring.len()),
            Some(w) if w != bitstring.len() => {
                return Err(VqaError::InvalidBitstring {
                    bitstring: bitstring.clone(),
                    reason: format!("length {} differs from {w}", bitstring.len()),
                });
            }
            Some(_) => {}
        }
    }
    Ok(width)
}

fn invalid_char(bitstring: &str, c: char) -> VqaError {
    VqaError::InvalidBitstring {
        bitstring: bitstring.to_string(),
        reason: format!("unexpected character '{c}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(&str, u64)]) -> Counts {
        pairs.iter().map(|&(b, c)| (b, c)).collect()
    }

    #[test]
    fn test_parity_sign() {
        assert_eq!(parity_sign("").unwrap(), 1);
        assert_eq!(parity_sign("0").unwrap(), 1);
        assert_eq!(parity_sign("1").unwrap(), -1);
        assert_eq!(parity_sign("1011").unwrap(), -1);
        assert_eq!(parity_sign("0110").unwrap(), 1);
        assert!(parity_sign("012").is_err());
    }

    #[test]
    fn test_definite_outcomes() {
        assert_eq!(estimate_expectation(&counts(&[("0", 100)]), 100).unwrap(), 1.0);
        assert_eq!(estimate_expectation(&counts(&[("1", 100)]), 100).unwrap(), -1.0);
    }

    #[test]
    fn test_balanced_outcomes() {
        let e = estimate_expectation(&counts(&[("0", 50), ("1", 50)]), 100).unwrap();
        assert_eq!(e, 0.0);
    }

    #[test]
    fn test_empty_bitstrings_give_one() {
        assert_eq!(estimate_expectation(&counts(&[("", 1024)]), 1024).unwrap(), 1.0);
    }

    #[test]
    fn test_zero_shots() {
        assert!(matches!(
            estimate_expectation(&Counts::new(), 0),
            Err(VqaError::ZeroShots)
        ));
        assert!(matches!(
            estimate_expectation(&counts(&[("0", 5)]), 0),
            Err(VqaError::ZeroShots)
        ));
    }

    #[test]
    fn test_inconsistent_total() {
        match estimate_expectation(&counts(&[("0", 60), ("1", 30)]), 100) {
            Err(VqaError::InconsistentShotCount { expected, observed }) => {
                assert_eq!(expected, 100);
                assert_eq!(observed, 90);
            }
            other => panic!("expected InconsistentShotCount, got {other:?}"),
        }
    }

    #[test]
    fn test_overflowing_counts_are_inconsistent() {
        let c = counts(&[("0", u64::MAX), ("1", 2)]);
        assert!(matches!(
            estimate_expectation(&c, 1),
            Err(VqaError::InconsistentShotCount {
                expected: 1,
                observed: u64::MAX
            })
        ));
        assert!(matches!(
            estimate_expectation(&c, u64::MAX),
            Err(VqaError::InconsistentShotCount { .. })
        ));

        let p = PauliString::parse("Z").unwrap();
        assert!(matches!(
            estimate_pauli_expectation(&c, 1, &p),
            Err(VqaError::InconsistentShotCount {
                expected: 1,
                observed: u64::MAX
            })
        ));
    }

    #[test]
    fn test_single_huge_count() {
        let c = counts(&[("1", u64::MAX)]);
        assert_eq!(estimate_expectation(&c, u64::MAX).unwrap(), -1.0);
    }

    #[test]
    fn test_bad_bitstrings() {
        assert!(matches!(
            estimate_expectation(&counts(&[("0x", 10)]), 10),
            Err(VqaError::InvalidBitstring { .. })
        ));
        assert!(matches!(
            estimate_expectation(&counts(&[("00", 5), ("1", 5)]), 10),
            Err(VqaError::InvalidBitstring { .. })
        ));
    }

    #[test]
    fn test_full_register_ignores_identity_positions() {
        // Qubit 1 is identity; its bit must not flip the sign.
        let c = counts(&[("010", 30), ("111", 10), ("000", 60)]);
        let p = PauliString::parse("ZIZ").unwrap();
        let e = estimate_pauli_expectation(&c, 100, &p).unwrap();
        assert!((e - 1.0).abs() < 1e-12);

        let q = PauliString::parse("ZZI").unwrap();
        let e = estimate_pauli_expectation(&c, 100, &q).unwrap();
        assert!((e - (-30.0 + 10.0 + 60.0) / 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_full_register_width_mismatch() {
        let c = counts(&[("01", 10)]);
        let p = PauliString::parse("ZZZ").unwrap();
        assert!(matches!(
            estimate_pauli_expectation(&c, 10, &p),
            Err(VqaError::LengthMismatch {
                expected: 3,
                actual: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_standard_error() {
        assert_eq!(standard_error(1.0, 100), 0.0);
        assert!((standard_error(0.0, 100) - 0.1).abs() < 1e-12);
        assert_eq!(standard_error(0.3, 0), 0.0);
    }

    #[test]
    fn test_estimate_from_counts() {
        let est = ExpectationEstimate::from_counts(&counts(&[("0", 75), ("1", 25)]), 100).unwrap();
        assert!((est.value - 0.5).abs() < 1e-12);
        assert_eq!(est.shots, 100);
        assert!(est.standard_error > 0.0);
        assert_eq!(ExpectationEstimate::exact(1.0).standard_error, 0.0);
    }
}
