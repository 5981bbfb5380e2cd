use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

/// Top-level CLI argument parser for the `mim` command
#[derive(Parser)]
#[command(
    name = "mim",
    about = "mimicry — trait declarations to test doubles",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands for the `mim` CLI
#[derive(Subcommand)]
enum Commands {
    /// Generate mock source files from trait declarations
    Generate {
        /// Source files or directories to scan for trait declarations
        #[arg(required = true)]
        sources: Vec<PathBuf>,
        /// Generate only the named contracts (defaults to all)
        #[arg(long = "contract")]
        contracts: Vec<String>,
        /// Output directory for generated files
        #[arg(short, long, default_value = "generated")]
        output: PathBuf,
    },
    /// List the contracts found in the given sources
    List {
        /// Source files or directories to scan for trait declarations
        #[arg(required = true)]
        sources: Vec<PathBuf>,
    },
    /// Dump extracted contract descriptors as JSON
    Model {
        /// Source files or directories to scan for trait declarations
        #[arg(required = true)]
        sources: Vec<PathBuf>,
        /// Dump only the named contracts (defaults to all)
        #[arg(long = "contract")]
        contracts: Vec<String>,
    },
    /// Check contracts for misuse-prone shapes
    Check {
        /// Source files or directories to scan for trait declarations
        #[arg(required = true)]
        sources: Vec<PathBuf>,
    },
}

/// Dispatch a parsed CLI subcommand to its handler
fn run_command(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Generate {
            sources,
            contracts,
            output,
        } => commands::generate::run(&sources, &contracts, &output),
        Commands::List { sources } => commands::list::run(&sources),
        Commands::Model { sources, contracts } => commands::model::run(&sources, &contracts),
        Commands::Check { sources } => commands::check::run(&sources),
    }
}

/// Entry point: parse CLI arguments and run the selected subcommand
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run_command(cli.command) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
