//! Subcommand implementations: each one loads plain JSON records, runs the
//! corresponding blocking engine call, and writes the terminal entity back
//! out as JSON.

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use nblast_core::engine::NblastEngine;
use nblast_core::job::{CancelToken, JobStatus};
use nblast_core::registry::Registry;
use nblast_core::types::{Config, Sample};

use crate::error::CliError;
use crate::records::{read_json, write_json, ConfigSpec, GeometryFile, SampleSpec, SimilaritySpec};

/// Arguments for `nblast sample`.
#[derive(Debug, Args)]
pub struct SampleArgs {
    /// Geometry file with every referenced object.
    #[arg(long)]
    pub geometry: PathBuf,
    /// Sample request record.
    #[arg(long)]
    pub spec: PathBuf,
    /// Where to write the computed Sample entity.
    #[arg(long)]
    pub output: PathBuf,
}

/// Arguments for `nblast config`.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config request record.
    #[arg(long)]
    pub spec: PathBuf,
    /// Completed matched Sample entity.
    #[arg(long)]
    pub matched: PathBuf,
    /// Completed random Sample entity.
    #[arg(long)]
    pub random: PathBuf,
    /// Where to write the computed Config entity.
    #[arg(long)]
    pub output: PathBuf,
}

/// Arguments for `nblast similarity`.
#[derive(Debug, Args)]
pub struct SimilarityArgs {
    /// Geometry file with every referenced object.
    #[arg(long)]
    pub geometry: PathBuf,
    /// Similarity request record.
    #[arg(long)]
    pub spec: PathBuf,
    /// Completed Config entity.
    #[arg(long)]
    pub config: PathBuf,
    /// Where to write the computed Similarity entity.
    #[arg(long)]
    pub output: PathBuf,
}

fn load_engine(geometry: &PathBuf) -> Result<NblastEngine<Registry>, CliError> {
    let file: GeometryFile = read_json(geometry)?;
    Ok(NblastEngine::new(file.into_registry()?))
}

/// Fail the process when the entity ended in `Error`, after writing it out
/// so the attempt is still on record.
fn check_terminal(status: JobStatus, message: Option<&str>) -> Result<(), CliError> {
    if status == JobStatus::Error {
        return Err(CliError::JobFailed(
            message.unwrap_or("unknown failure").to_string(),
        ));
    }
    Ok(())
}

/// Run `nblast sample`.
pub fn run_sample(args: SampleArgs) -> Result<(), CliError> {
    let engine = load_engine(&args.geometry)?;
    let spec: SampleSpec = read_json(&args.spec)?;
    info!(pairs = spec.pairs.len(), "building sample");

    let sample = engine.build_sample(
        spec.name,
        &spec.pairs,
        &spec.distance_breaks,
        &spec.dot_breaks,
        spec.tuning,
        &CancelToken::new(),
    )?;
    write_json(&args.output, &sample)?;
    check_terminal(sample.job.status, sample.job.error_message.as_deref())
}

/// Run `nblast config`.
pub fn run_config(args: ConfigArgs) -> Result<(), CliError> {
    let spec: ConfigSpec = read_json(&args.spec)?;
    let matched: Sample = read_json(&args.matched)?;
    let random: Sample = read_json(&args.random)?;
    info!(name = %spec.name, "building config");

    // The config build needs no geometry; any resolver works.
    let engine = NblastEngine::new(Registry::new());
    let config = engine.build_config(
        spec.name,
        spec.distance_breaks,
        spec.dot_breaks,
        spec.tuning,
        &matched,
        &random,
        &CancelToken::new(),
    )?;
    write_json(&args.output, &config)?;
    check_terminal(config.job.status, config.job.error_message.as_deref())
}

/// Run `nblast similarity`.
pub fn run_similarity(args: SimilarityArgs) -> Result<(), CliError> {
    let engine = load_engine(&args.geometry)?;
    let spec: SimilaritySpec = read_json(&args.spec)?;
    let config: Config = read_json(&args.config)?;
    info!(
        name = %spec.name,
        queries = spec.queries.len(),
        targets = spec.targets.len(),
        "computing similarity"
    );

    let similarity = engine.compute_similarity(
        spec.name,
        &config,
        spec.queries,
        spec.targets,
        spec.mode,
        spec.symmetry,
        &CancelToken::new(),
    )?;
    write_json(&args.output, &similarity)?;
    check_terminal(similarity.job.status, similarity.job.error_message.as_deref())
}
