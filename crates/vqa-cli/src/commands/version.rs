//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - Pauli expectations and variational cost evaluation",
        style("vqa").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  vqa-ir           Circuit intermediate representation");
    println!("  vqa-hal          Sampling backend contract");
    println!("  vqa-core         Estimator, cost evaluator and optimizers");
    println!("  vqa-adapter-sim  Local statevector simulator");
    println!();
    println!("License:    {}", style("Apache-2.0").dim());
}
