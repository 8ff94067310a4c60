//! Mosaic CLI - drives the concatenative synthesis engine from the command line.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{InspectCommand, RunCommand};

/// Mosaic CLI - real-time concatenative synthesis.
///
/// Feature frames from an external analyzer are matched against a model of
/// library audio windows; the nearest windows are played back on a fixed
/// pool of voices.
///
///   - `run` plays a finite frames file (virtual clock) or live stdin frames
///   - `inspect` summarises a model and queries its neighbours
#[derive(Parser)]
#[command(name = "mosaic")]
#[command(about = "Concatenative synthesis engine")]
#[command(version)]
pub struct Cli {
    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Match analyzer frames against a model and play the results
    Run(RunCommand),
    /// Summarise a model file
    Inspect(InspectCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging; RUST_LOG wins over --verbose
    let default = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Run(cmd) => cmd.run(&cli),
        Commands::Inspect(cmd) => cmd.run(&cli),
    }
}
