//! Shared test harness modules for the replenish CLI.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]

use super::*;
use super::solve::{
    DefaultSolverBuilder, SolveConfig, SolverBuilder, config_from_layers_for_test, load_instance,
    run_solve_with,
};

mod helpers;
mod solve_steps;
