//! `vqa` command-line interface.
//!
//! ```text
//! vqa expect --counts counts.json [--shots N] [--pauli XIZ]
//! vqa cost   --config run.yaml --params 0.1,0.2,0.3 [--shots N]
//! vqa vqe    --config run.yaml [--output result.json]
//! vqa version
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{cost, expect, version, vqe};

/// Pauli-expectation estimation and variational cost evaluation
#[derive(Parser)]
#[command(name = "vqa")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate a Pauli expectation from a counts file
    Expect {
        /// JSON histogram, e.g. {"01": 12, "10": 4}
        #[arg(short, long)]
        counts: PathBuf,

        /// Declared shot total (defaults to the sum of counts)
        #[arg(short, long)]
        shots: Option<u64>,

        /// Pauli string for full-register counts
        #[arg(short, long)]
        pauli: Option<String>,
    },

    /// Evaluate the cost at fixed parameters on the simulator
    Cost {
        /// Run configuration (YAML or JSON)
        #[arg(short, long, env = "VQA_CONFIG")]
        config: PathBuf,

        /// Comma-separated parameter values
        #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true)]
        params: Vec<f64>,

        /// Shots per term (overrides the configuration)
        #[arg(short, long)]
        shots: Option<u32>,
    },

    /// Minimize the cost with a classical optimizer
    Vqe {
        /// Run configuration (YAML or JSON)
        #[arg(short, long, env = "VQA_CONFIG")]
        config: PathBuf,

        /// Write the result as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Expect {
            counts,
            shots,
            pauli,
        } => expect::execute(&counts, shots, pauli.as_deref()),

        Commands::Cost {
            config,
            params,
            shots,
        } => cost::execute(&config, &params, shots),

        Commands::Vqe { config, output } => vqe::execute(&config, output.as_deref()),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
