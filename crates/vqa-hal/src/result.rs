//! Measurement outcome counts and execution results.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Histogram of sampled bitstrings.
///
/// Character `c` of every key is classical bit `c` of the executed circuit.
/// Bitstrings that were never observed are simply absent (count zero).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Counts {
    counts: FxHashMap<String, u64>,
}

impl Counts {
    /// Create an empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` observations of `bitstring`, saturating at `u64::MAX`.
    pub fn insert(&mut self, bitstring: impl Into<String>, count: u64) {
        let slot = self.counts.entry(bitstring.into()).or_insert(0);
        *slot = slot.saturating_add(count);
    }

    /// Observations of `bitstring` (zero when absent).
    pub fn get(&self, bitstring: &str) -> u64 {
        self.counts.get(bitstring).copied().unwrap_or(0)
    }

    /// Sum of all observations, saturating at `u64::MAX`.
    ///
    /// Use [`Counts::checked_total`] where a saturated sum must not be
    /// mistaken for a real one.
    pub fn total_shots(&self) -> u64 {
        self.counts
            .values()
            .fold(0u64, |acc, &n| acc.saturating_add(n))
    }

    /// Sum of all observations, or `None` if it does not fit in a `u64`.
    pub fn checked_total(&self) -> Option<u64> {
        self.counts
            .values()
            .try_fold(0u64, |acc, &n| acc.checked_add(n))
    }

    /// Number of distinct bitstrings observed.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Check if nothing was observed.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterate over `(bitstring, count)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &u64)> {
        self.counts.iter()
    }

    /// Pairs sorted by descending count, ties broken by bitstring.
    pub fn sorted(&self) -> Vec<(&String, &u64)> {
        let mut pairs: Vec<_> = self.counts.iter().collect();
        pairs.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        pairs
    }

    /// The most frequently observed bitstring.
    pub fn most_frequent(&self) -> Option<(&String, &u64)> {
        self.sorted().into_iter().next()
    }

    /// Empirical probability of each bitstring.
    pub fn probabilities(&self) -> FxHashMap<String, f64> {
        let total = self.total_shots();
        if total == 0 {
            return FxHashMap::default();
        }
        self.counts
            .iter()
            .map(|(k, &v)| (k.clone(), v as f64 / total as f64))
            .collect()
    }
}

impl FromIterator<(String, u64)> for Counts {
    fn from_iter<T: IntoIterator<Item = (String, u64)>>(iter: T) -> Self {
        let mut counts = Counts::new();
        for (bitstring, n) in iter {
            counts.insert(bitstring, n);
        }
        counts
    }
}

impl<'a> FromIterator<(&'a str, u64)> for Counts {
    fn from_iter<T: IntoIterator<Item = (&'a str, u64)>>(iter: T) -> Self {
        iter.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }
}

/// Output of one backend run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Sampled outcomes.
    pub counts: Counts,
    /// Shots requested.
    pub shots: u32,
    /// Wall-clock execution time, when the backend measures it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
}

impl ExecutionResult {
    /// Create a result from sampled counts.
    pub fn new(counts: Counts, shots: u32) -> Self {
        Self {
            counts,
            shots,
            execution_time_ms: None,
        }
    }

    /// Attach an execution time.
    #[must_use]
    pub fn with_execution_time(mut self, ms: u64) -> Self {
        self.execution_time_ms = Some(ms);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_accumulates() {
        let mut counts = Counts::new();
        counts.insert("01", 3);
        counts.insert("01", 2);
        counts.insert("10", 1);
        assert_eq!(counts.get("01"), 5);
        assert_eq!(counts.get("11"), 0);
        assert_eq!(counts.total_shots(), 6);
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_totals_do_not_overflow() {
        let counts: Counts = [("0", u64::MAX), ("1", 2)].into_iter().collect();
        assert_eq!(counts.total_shots(), u64::MAX);
        assert_eq!(counts.checked_total(), None);

        let mut repeated = Counts::new();
        repeated.insert("0", u64::MAX);
        repeated.insert("0", 1);
        assert_eq!(repeated.get("0"), u64::MAX);

        let fits: Counts = [("0", u64::MAX - 2), ("1", 2)].into_iter().collect();
        assert_eq!(fits.checked_total(), Some(u64::MAX));
        assert_eq!(Counts::new().checked_total(), Some(0));
    }

    #[test]
    fn test_sorted_and_most_frequent() {
        let counts: Counts = [("00", 4), ("11", 4), ("01", 9)].into_iter().collect();
        let sorted: Vec<_> = counts.sorted().into_iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(sorted, vec!["01", "00", "11"]);
        assert_eq!(counts.most_frequent().map(|(k, _)| k.as_str()), Some("01"));
    }

    #[test]
    fn test_probabilities() {
        let counts: Counts = [("0", 1), ("1", 3)].into_iter().collect();
        let p = counts.probabilities();
        assert!((p["1"] - 0.75).abs() < 1e-12);
        assert!(Counts::new().probabilities().is_empty());
    }

    #[test]
    fn test_counts_json_is_a_plain_object() {
        let counts: Counts = serde_json::from_str(r#"{"00": 7, "11": 3}"#).unwrap();
        assert_eq!(counts.total_shots(), 10);
        let back = serde_json::to_value(&counts).unwrap();
        assert_eq!(back["00"], 7);
    }

    #[test]
    fn test_execution_result_builder() {
        let result = ExecutionResult::new(Counts::new(), 100).with_execution_time(12);
        assert_eq!(result.shots, 100);
        assert_eq!(result.execution_time_ms, Some(12));
    }
}
