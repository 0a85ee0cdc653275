//! Cost command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use vqa_core::CostEvaluator;

use super::common::{load_config, simulator_for};

/// Execute the cost command.
pub fn execute(config_path: &Path, params: &[f64], shots: Option<u32>) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(shots) = shots {
        config.shots = shots;
    }

    let hamiltonian = config.hamiltonian()?;
    let ansatz = config.ansatz()?;
    let preparation = ansatz.prepare(params).with_context(|| {
        format!(
            "Ansatz '{}' takes {} parameters",
            ansatz.name(),
            ansatz.num_parameters()
        )
    })?;

    println!(
        "{} Evaluating {} terms on {} qubits ({} shots/term)",
        style("→").cyan().bold(),
        hamiltonian.len(),
        preparation.num_qubits(),
        config.shots
    );
    println!("  Ansatz: {}, depth {}", ansatz.name(), preparation.depth());

    let backend = simulator_for(&config)?;
    let breakdown = CostEvaluator::new(&backend)
        .with_shots(config.shots)
        .with_parallel(config.parallel)
        .evaluate_terms(&preparation, &hamiltonian)?;

    println!();
    for term in &breakdown.terms {
        println!(
            "  {:>10.4} · {}  ⟨P⟩ = {:>9.6} ± {:.6}  → {:>10.6}",
            term.coefficient.re,
            style(&term.pauli).cyan(),
            term.estimate.value,
            term.estimate.standard_error,
            term.contribution.re
        );
    }

    println!(
        "\n{} Cost = {}",
        style("✓").green().bold(),
        style(format!("{:.6}", breakdown.cost())).yellow().bold()
    );
    if breakdown.total.im.abs() > 1e-9 {
        println!(
            "  {} discarded imaginary part {:.3e}",
            style("warning:").yellow(),
            breakdown.total.im
        );
    }
    Ok(())
}
