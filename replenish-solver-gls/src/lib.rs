//! Guided local search solving service for `replenish-core`.
//!
//! [`GlsSolver`] implements [`SolvingService`](replenish_core::SolvingService):
//! parallel cheapest insertion builds a first feasible assignment, then a
//! guided local search improves it until the wall-clock budget in
//! [`SearchParameters`](replenish_core::SearchParameters) runs out. Every
//! candidate route is checked through
//! [`RoutingModel::evaluate`](replenish_core::RoutingModel::evaluate), so the
//! search never needs to know how capacity, duration or windows are tracked.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod construct;
mod deadline;
mod plan;
mod search;
mod solver;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use solver::{GlsSolver, GlsSolverConfig};
