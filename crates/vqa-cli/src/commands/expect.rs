//! Expect command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use vqa_core::{PauliString, estimate_expectation, estimate_pauli_expectation, standard_error};

use super::common::{load_counts, print_histogram};

/// Execute the expect command.
pub fn execute(counts_path: &Path, shots: Option<u64>, pauli: Option<&str>) -> Result<()> {
    let counts = load_counts(counts_path)?;
    let shots = match shots {
        Some(shots) => shots,
        None => counts
            .checked_total()
            .context("Shot counts sum past u64::MAX; pass --shots explicitly")?,
    };

    println!(
        "{} Estimating from {} ({} distinct outcomes, {} shots)",
        style("→").cyan().bold(),
        style(counts_path.display()).green(),
        counts.len(),
        shots
    );
    print_histogram(&counts, 8);

    let (label, value) = match pauli {
        Some(text) => {
            let pauli = PauliString::parse(text).context("Invalid --pauli")?;
            let value = estimate_pauli_expectation(&counts, shots, &pauli)?;
            (pauli.to_string(), value)
        }
        None => ("parity".to_string(), estimate_expectation(&counts, shots)?),
    };

    println!(
        "\n{} ⟨{}⟩ = {} ± {:.6}",
        style("✓").green().bold(),
        label,
        style(format!("{value:.6}")).yellow().bold(),
        standard_error(value, shots)
    );
    Ok(())
}
