//! specpub CLI - specification publisher.
//!
//! Provides commands for:
//! - `build`: Publish every page of the specification
//! - `expand`: Expand one page template to stdout
//! - `directives`: List the registered directive commands

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, DirectivesArgs, ExpandArgs};
use output::Output;

/// specpub - specification publisher.
#[derive(Parser)]
#[command(name = "specpub", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish the whole specification.
    Build(BuildArgs),
    /// Expand a single page template and print the result.
    Expand(ExpandArgs),
    /// List registered directive commands.
    Directives(DirectivesArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = match &cli.command {
        Commands::Build(args) => args.verbose,
        Commands::Expand(args) => args.verbose,
        Commands::Directives(_) => false,
    };

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Build(args) => args.execute(),
        Commands::Expand(args) => args.execute(),
        Commands::Directives(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
