//! Contract between the routing model and a solving service.
//!
//! A solving service receives a fully configured [`RoutingModel`] and a set
//! of [`SearchParameters`] and returns an [`Assignment`] of node sequences to
//! vehicle slots. Search internals stay behind the trait.

use std::time::Duration;

use crate::error::SolveError;
use crate::graph::NodeId;
use crate::model::RoutingModel;

/// Strategy used to build the first feasible assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum FirstSolutionStrategy {
    /// Let the service choose.
    Automatic,
    /// Grow all routes at once, always taking the globally cheapest
    /// customer insertion.
    #[default]
    ParallelCheapestInsertion,
}

/// Metaheuristic used to improve on the first assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum LocalSearchMetaheuristic {
    /// Let the service choose.
    Automatic,
    /// Accept improving moves only and stop at the first local optimum.
    GreedyDescent,
    /// Escape local optima by penalising frequently used costly arcs.
    #[default]
    GuidedLocalSearch,
}

/// Search configuration passed to [`SolvingService::solve`].
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use replenish_core::{FirstSolutionStrategy, LocalSearchMetaheuristic, SearchParameters};
///
/// let parameters = SearchParameters::new(Duration::from_secs(2));
/// assert_eq!(parameters.first_solution, FirstSolutionStrategy::ParallelCheapestInsertion);
/// assert_eq!(parameters.metaheuristic, LocalSearchMetaheuristic::GuidedLocalSearch);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParameters {
    /// Construction heuristic.
    pub first_solution: FirstSolutionStrategy,
    /// Improvement metaheuristic.
    pub metaheuristic: LocalSearchMetaheuristic,
    /// Wall-clock budget for the whole search.
    pub time_limit: Duration,
}

impl SearchParameters {
    /// Default strategies with the given time limit.
    #[must_use]
    pub fn new(time_limit: Duration) -> Self {
        Self {
            first_solution: FirstSolutionStrategy::default(),
            metaheuristic: LocalSearchMetaheuristic::default(),
            time_limit,
        }
    }
}

/// Position in a vehicle's chain of next links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visit {
    /// The vehicle's depot start.
    Start,
    /// A visited node.
    Node(NodeId),
    /// The vehicle's depot end.
    End,
}

/// Node sequences per vehicle slot, as returned by a solving service.
///
/// Each sequence lists the visited nodes between the depot start and end; an
/// empty sequence is an unused vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assignment {
    routes: Vec<Vec<NodeId>>,
}

impl Assignment {
    /// Wrap one node sequence per vehicle slot.
    #[must_use]
    pub const fn new(routes: Vec<Vec<NodeId>>) -> Self {
        Self { routes }
    }

    /// An assignment with `vehicles` unused slots.
    #[must_use]
    pub fn empty(vehicles: usize) -> Self {
        Self::new(vec![Vec::new(); vehicles])
    }

    /// Number of vehicle slots.
    #[must_use]
    pub fn vehicle_count(&self) -> usize {
        self.routes.len()
    }

    /// All node sequences, indexed by vehicle slot.
    #[must_use]
    pub fn routes(&self) -> &[Vec<NodeId>] {
        &self.routes
    }

    /// The node sequence of one vehicle slot.
    #[must_use]
    pub fn route(&self, vehicle: usize) -> Option<&[NodeId]> {
        self.routes.get(vehicle).map(Vec::as_slice)
    }

    /// Return whether the vehicle leaves the depot.
    #[must_use]
    pub fn is_used(&self, vehicle: usize) -> bool {
        self.route(vehicle).is_some_and(|route| !route.is_empty())
    }

    /// Follow the next link from `visit` on `vehicle`.
    ///
    /// Returns `None` past the end, for an unknown vehicle, or for a node
    /// the vehicle does not visit.
    ///
    /// # Examples
    /// ```
    /// use replenish_core::{Assignment, Visit};
    ///
    /// let assignment = Assignment::new(vec![vec![2, 1], vec![]]);
    /// assert_eq!(assignment.next(0, Visit::Start), Some(Visit::Node(2)));
    /// assert_eq!(assignment.next(0, Visit::Node(1)), Some(Visit::End));
    /// assert_eq!(assignment.next(1, Visit::Start), Some(Visit::End));
    /// ```
    #[must_use]
    pub fn next(&self, vehicle: usize, visit: Visit) -> Option<Visit> {
        let route = self.route(vehicle)?;
        let position = match visit {
            Visit::Start => 0,
            Visit::Node(node) => route.iter().position(|id| *id == node)?.checked_add(1)?,
            Visit::End => return None,
        };
        Some(route.get(position).map_or(Visit::End, |id| Visit::Node(*id)))
    }

    /// The whole chain of a vehicle, from [`Visit::Start`] to
    /// [`Visit::End`].
    pub fn chain(&self, vehicle: usize) -> impl Iterator<Item = Visit> + '_ {
        let start = (vehicle < self.routes.len()).then_some(Visit::Start);
        std::iter::successors(start, move |visit| self.next(vehicle, *visit))
    }
}

/// A search engine able to solve a configured [`RoutingModel`].
///
/// Implementations must honour `parameters.time_limit` and return the best
/// feasible assignment found by then. Services must be `Send + Sync` so one
/// instance can serve concurrent solves.
pub trait SolvingService: Send + Sync {
    /// Search for an assignment.
    ///
    /// # Errors
    ///
    /// Returns [`SolveError::NoFeasibleSolution`] when no feasible
    /// assignment is found within the budget and
    /// [`SolveError::UnsupportedStrategy`] for parameters the service does
    /// not implement.
    fn solve(
        &self,
        model: &RoutingModel<'_>,
        parameters: &SearchParameters,
    ) -> Result<Assignment, SolveError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn walks_chain_from_start_to_end() {
        let assignment = Assignment::new(vec![vec![3, 5, 1], vec![]]);
        let chain: Vec<Visit> = assignment.chain(0).collect();
        assert_eq!(
            chain,
            vec![
                Visit::Start,
                Visit::Node(3),
                Visit::Node(5),
                Visit::Node(1),
                Visit::End
            ]
        );
        assert_eq!(
            assignment.chain(1).collect::<Vec<_>>(),
            vec![Visit::Start, Visit::End]
        );
        assert_eq!(assignment.chain(2).count(), 0);
    }

    #[rstest]
    fn reports_usage_per_slot() {
        let assignment = Assignment::new(vec![vec![], vec![1]]);
        assert!(!assignment.is_used(0));
        assert!(assignment.is_used(1));
        assert!(!assignment.is_used(7));
        assert_eq!(assignment.vehicle_count(), 2);
    }

    #[rstest]
    fn next_ignores_foreign_nodes() {
        let assignment = Assignment::new(vec![vec![1, 2]]);
        assert_eq!(assignment.next(0, Visit::Node(9)), None);
        assert_eq!(assignment.next(0, Visit::End), None);
        assert_eq!(assignment.next(3, Visit::Start), None);
    }

    #[rstest]
    fn empty_assignment_has_unused_slots() {
        let assignment = Assignment::empty(3);
        assert_eq!(assignment.vehicle_count(), 3);
        assert!((0..3).all(|vehicle| !assignment.is_used(vehicle)));
    }
}
