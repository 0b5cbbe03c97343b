//! NBLAST batch driver.
//!
//! Wraps the blocking engine calls in a small CLI: JSON records in, JSON
//! records out. Asynchronous job semantics (queueing, claiming, retries)
//! belong to whatever executor invokes this binary; here every run is one
//! bounded unit of work whose terminal entity is written to `--output`.
//!
//! # Commands
//!
//! - `nblast sample`: accumulate a matched or random sample histogram
//! - `nblast config`: derive a score matrix from two completed samples
//! - `nblast similarity`: score queries against targets under a config

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod error;
mod records;

use error::exit_code;

/// NBLAST similarity engine batch driver.
#[derive(Parser)]
#[command(name = "nblast")]
#[command(version)]
#[command(about = "Morphological similarity scoring for skeletonized 3D structures")]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Accumulate a sample histogram over object pairs
    Sample(commands::SampleArgs),
    /// Derive a score matrix from a matched and a random sample
    Config(commands::ConfigArgs),
    /// Compute a pairwise similarity matrix under a complete config
    Similarity(commands::SimilarityArgs),
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt().with_env_filter(filter).with_target(false).init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Sample(args) => commands::run_sample(args),
        Commands::Config(args) => commands::run_config(args),
        Commands::Similarity(args) => commands::run_similarity(args),
    };

    if let Err(error) = result {
        eprintln!("error: {error}");
        std::process::exit(exit_code(&error));
    }
}
