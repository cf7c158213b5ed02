//! Command-line interface for solving replenishment routing instances.
//!
//! The `replenish` binary reads one JSON instance, solves it with the guided
//! local search solver and prints the `{nodes, vehicles, time}` record as
//! pretty JSON on stdout.
#![forbid(unsafe_code)]

use clap::Parser;

mod error;
mod solve;

pub use error::CliError;

use solve::{SolveArgs, run_solve};

const ARG_REQUEST: &str = "request-path";
const ARG_SEED: &str = "seed";
const ARG_MAX_ITERATIONS: &str = "max-iterations";
const ENV_REQUEST: &str = "REPLENISH_REQUEST_PATH";

/// Run the replenish CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when arguments or configuration are invalid, the
/// instance cannot be read, the solver fails or output cannot be written.
pub fn run() -> Result<(), CliError> {
    let args = SolveArgs::try_parse().map_err(CliError::ArgumentParsing)?;
    run_solve(args)
}

#[cfg(test)]
mod tests;
