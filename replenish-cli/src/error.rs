//! Error types emitted by the replenish CLI.
//!
//! Keep this error type reasonably small, as every CLI helper returns
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use replenish_core::SolveError;
use thiserror::Error;

/// Errors emitted by the replenish CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (pass it as an argument or set {env})")]
    MissingArgument {
        /// Name of the missing argument.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// Opening the instance file failed.
    #[error("failed to open instance at {path:?}: {source}")]
    OpenInstance {
        /// Path that could not be opened.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// Instance JSON could not be decoded.
    #[error("failed to parse instance JSON at {path:?}: {source}")]
    ParseInstance {
        /// Path of the malformed file.
        path: Utf8PathBuf,
        /// Underlying decoding failure.
        #[source]
        source: serde_json::Error,
    },
    /// The solver rejected the instance or found no solution.
    #[error("solver failed: {source}")]
    Solve {
        /// Failure reported by the pipeline.
        #[source]
        source: SolveError,
    },
    /// Serializing the solution record failed.
    #[error("failed to serialize solution: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing the solution record failed.
    #[error("failed to write solution: {0}")]
    WriteOutput(#[source] std::io::Error),
}
