//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use tracing::debug;

use vqa_adapter_sim::SimulatorBackend;
use vqa_core::RunConfig;
use vqa_hal::{BackendConfig, BackendFactory, Counts};

/// Load a bitstring histogram from a JSON object file.
pub fn load_counts(path: &Path) -> Result<Counts> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let counts: Counts = serde_json::from_str(&source)
        .with_context(|| format!("Invalid counts JSON in {}", path.display()))?;
    debug!(outcomes = counts.len(), shots = counts.total_shots(), "loaded counts");
    Ok(counts)
}

/// Load a run configuration and apply `VQA_*` environment overrides.
pub fn load_config(path: &Path) -> Result<RunConfig> {
    let config = RunConfig::load(Some(path))
        .with_context(|| format!("Failed to load configuration: {}", path.display()))?;
    debug!(terms = config.hamiltonian.len(), shots = config.shots, "loaded configuration");
    Ok(config)
}

/// Local simulator, seeded when the configuration carries a seed.
pub fn simulator_for(config: &RunConfig) -> Result<SimulatorBackend> {
    let mut backend = BackendConfig::new("simulator");
    if let Some(seed) = config.seed {
        backend = backend.with_extra("seed", serde_json::json!(seed));
    }
    SimulatorBackend::from_config(backend).context("Failed to configure simulator")
}

/// Print the most frequent outcomes as a bar chart.
pub fn print_histogram(counts: &Counts, limit: usize) {
    let sorted = counts.sorted();
    #[allow(clippy::cast_precision_loss)]
    let total = counts.total_shots().max(1) as f64;

    for (bitstring, count) in sorted.iter().take(limit) {
        #[allow(clippy::cast_precision_loss)]
        let prob = **count as f64 / total * 100.0;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let bar_len = (prob / 2.0).round() as usize;
        let label = if bitstring.is_empty() { "∅" } else { bitstring.as_str() };

        println!(
            "  {}: {:>8} ({:>6.2}%) {}",
            style(label).cyan(),
            count,
            prob,
            style("█".repeat(bar_len)).green()
        );
    }

    if sorted.len() > limit {
        println!("  ... and {} more outcomes", sorted.len() - limit);
    }
}
