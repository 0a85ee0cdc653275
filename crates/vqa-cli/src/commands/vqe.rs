//! VQE command implementation.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use vqa_core::VqeRunner;

use super::common::{load_config, simulator_for};

/// Execute the vqe command.
pub fn execute(config_path: &Path, output: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let hamiltonian = config.hamiltonian()?;
    let ansatz = config.ansatz()?;
    let optimizer = config.optimizer();

    println!(
        "{} VQE: {} terms, ansatz {} ({} parameters), optimizer {}",
        style("→").cyan().bold(),
        hamiltonian.len(),
        style(ansatz.name()).green(),
        ansatz.num_parameters(),
        style(optimizer.name()).yellow()
    );

    let backend = simulator_for(&config)?;
    let mut runner = VqeRunner::new(hamiltonian, ansatz, &backend)
        .with_optimizer(optimizer)
        .with_shots(config.shots)
        .with_parallel(config.parallel);
    if let Some(seed) = config.seed {
        runner = runner.with_seed(seed);
    }
    let result = runner.run()?;

    println!(
        "\n{} Energy = {}",
        style("✓").green().bold(),
        style(format!("{:.6}", result.optimal_energy)).yellow().bold()
    );
    println!(
        "  Iterations: {}, evaluations: {}, converged: {}",
        result.iterations, result.evaluations, result.converged
    );
    let params: Vec<String> = result
        .optimal_params
        .iter()
        .map(|p| format!("{p:.4}"))
        .collect();
    println!("  Parameters: [{}]", params.join(", "));

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&result)?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write output: {}", path.display()))?;
        println!("  Written to {}", style(path.display()).green());
    }
    Ok(())
}
