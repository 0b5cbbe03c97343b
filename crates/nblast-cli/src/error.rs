//! CLI error type and exit-code mapping.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Reading or writing a file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// A JSON record could not be parsed or written.
    #[error("JSON error in {path}: {source}")]
    Json {
        /// File involved
        path: PathBuf,
        /// Underlying error
        source: serde_json::Error,
    },

    /// The engine rejected the request synchronously.
    #[error(transparent)]
    Engine(#[from] nblast_core::NblastError),

    /// The computed entity finished in `Error` status.
    #[error("Job finished with error: {0}")]
    JobFailed(String),
}

/// Process exit code for an error: validation and precondition failures are
/// caller mistakes (2), everything else is a runtime failure (1).
pub fn exit_code(error: &CliError) -> i32 {
    match error {
        CliError::Engine(
            nblast_core::NblastError::Validation(_) | nblast_core::NblastError::Precondition(_),
        ) => 2,
        _ => 1,
    }
}
