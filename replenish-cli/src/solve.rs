//! Solve command implementation for the replenish CLI.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use replenish_core::{Instance, Solution, SolvingService};
use replenish_solver_gls::{GlsSolver, GlsSolverConfig};
use serde::{Deserialize, Serialize};
use std::io::{BufReader, Write};

use crate::{ARG_MAX_ITERATIONS, ARG_REQUEST, ARG_SEED, CliError, ENV_REQUEST};

/// CLI arguments for the `replenish` binary.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "replenish",
    long_about = "Solve a capacitated vehicle routing instance with time \
                 windows, letting vehicles return to the depot to reload. \
                 The instance is a JSON file; the solution record is \
                 printed to stdout as JSON.",
    about = "Solve a routing instance with depot reloads",
    version
)]
#[ortho_config(prefix = "REPLENISH")]
pub(crate) struct SolveArgs {
    /// Path to a JSON file containing the routing instance.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Seed for the local search scan order.
    #[arg(long = ARG_SEED, value_name = "n")]
    #[serde(default)]
    pub(crate) seed: Option<u64>,
    /// Stop the guided search after this many iterations.
    #[arg(long = ARG_MAX_ITERATIONS, value_name = "n")]
    #[serde(default)]
    pub(crate) max_iterations: Option<usize>,
}

impl SolveArgs {
    pub(crate) fn into_config(self) -> Result<SolveConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SolveConfig::try_from(merged)
    }
}

/// Resolved solve configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SolveConfig {
    /// Path to the JSON instance file.
    pub(crate) request_path: Utf8PathBuf,
    /// Solver tuning after layering.
    pub(crate) solver: GlsSolverConfig,
}

impl TryFrom<SolveArgs> for SolveConfig {
    type Error = CliError;

    fn try_from(args: SolveArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_REQUEST,
            env: ENV_REQUEST,
        })?;
        let defaults = GlsSolverConfig::default();
        let solver = GlsSolverConfig {
            seed: args.seed.unwrap_or(defaults.seed),
            max_iterations: args.max_iterations.or(defaults.max_iterations),
            ..defaults
        };
        Ok(Self {
            request_path,
            solver,
        })
    }
}

/// Builds the solving service for the current invocation.
pub(super) trait SolverBuilder {
    fn build(&self, config: &SolveConfig) -> Box<dyn SolvingService>;
}

pub(super) struct DefaultSolverBuilder;

impl SolverBuilder for DefaultSolverBuilder {
    fn build(&self, config: &SolveConfig) -> Box<dyn SolvingService> {
        Box::new(GlsSolver::with_config(config.solver.clone()))
    }
}

pub(super) fn run_solve(args: SolveArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_solve_with(args, &DefaultSolverBuilder, &mut stdout)
}

pub(super) fn run_solve_with(
    args: SolveArgs,
    builder: &dyn SolverBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let solution = execute_solve(args, builder)?;
    write_solution(writer, &solution)
}

fn execute_solve(args: SolveArgs, builder: &dyn SolverBuilder) -> Result<Solution, CliError> {
    let config = args.into_config()?;
    let instance = load_instance(&config.request_path)?;
    log::debug!(
        "loaded instance with {} nodes from {}",
        instance.node_count(),
        config.request_path
    );
    let solver = builder.build(&config);
    replenish_core::solve(&instance, solver.as_ref()).map_err(|source| CliError::Solve { source })
}

/// Loads a JSON-encoded [`Instance`] from disk.
pub(super) fn load_instance(path: &Utf8Path) -> Result<Instance, CliError> {
    let file = fs_utf8::File::open_ambient(path, ambient_authority()).map_err(|source| {
        CliError::OpenInstance {
            path: path.to_path_buf(),
            source,
        }
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParseInstance {
        path: path.to_path_buf(),
        source,
    })
}

fn write_solution(writer: &mut dyn Write, solution: &Solution) -> Result<(), CliError> {
    let payload =
        serde_json::to_string_pretty(&solution.to_record()).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SolveConfig, CliError> {
    let merged = SolveArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SolveConfig::try_from(merged)
}
