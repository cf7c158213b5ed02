//! Core model for capacitated vehicle routing with time windows and
//! mid-route depot reloads.
//!
//! A solve runs five stages in order:
//!
//! 1. [`Instance::validate`] rejects malformed input.
//! 2. [`AugmentedGraph::build`] adds virtual reload nodes co-located with the
//!    depot.
//! 3. [`RoutingModel`] defines capacity, duration and time-window tracking
//!    over the augmented graph.
//! 4. A [`SolvingService`] searches for an [`Assignment`].
//! 5. [`decode`] checks the assignment and produces a [`Solution`].
//!
//! [`solve`] chains all five.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod decode;
mod error;
mod graph;
mod instance;
mod model;
mod service;
mod solve;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use decode::{Route, Solution, SolutionRecord, Stop, decode};
pub use error::{InstanceError, SolveError};
pub use graph::{AugmentedGraph, Node, NodeId, NodeKind, reload_count};
pub use instance::{Instance, TimeWindow};
pub use model::{
    Dimension, Disjunction, RouteSchedule, RouteViolation, RoutingModel, StartCumul, Transit,
    TransitContext, UNBOUNDED, VEHICLE_FIXED_COST, arc_transit, load_transit,
};
pub use service::{
    Assignment, FirstSolutionStrategy, LocalSearchMetaheuristic, SearchParameters, SolvingService,
    Visit,
};
pub use solve::{solve, solve_with_parameters};
