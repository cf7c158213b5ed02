//! Facade crate for depot-reload vehicle routing.
//!
//! This crate re-exports the core model and pipeline and exposes the guided
//! local search solver behind the `solver-gls` feature.

#![forbid(unsafe_code)]

pub use replenish_core::{
    Assignment, AugmentedGraph, FirstSolutionStrategy, Instance, InstanceError,
    LocalSearchMetaheuristic, NodeId, NodeKind, Route, RoutingModel, SearchParameters, Solution,
    SolutionRecord, SolveError, SolvingService, Stop, TimeWindow, solve, solve_with_parameters,
};

#[cfg(feature = "solver-gls")]
pub use replenish_solver_gls::{GlsSolver, GlsSolverConfig};
