//! Error types shared by the validator, the solve pipeline and solving
//! services.

use thiserror::Error;

use crate::graph::NodeId;

/// Reasons an [`Instance`](crate::Instance) is rejected before any search.
///
/// Each variant names the offending node or row so callers can repair the
/// input without re-running the validator by hand.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InstanceError {
    /// The instance contains no nodes at all.
    #[error("instance must contain at least the depot node")]
    Empty,
    /// `depot_idx` does not address a node.
    #[error("depot index {depot} is out of range for {nodes} nodes")]
    DepotOutOfRange {
        /// Supplied depot index.
        depot: usize,
        /// Number of nodes implied by `demands`.
        nodes: usize,
    },
    /// The travel-time matrix has the wrong number of rows.
    #[error("time matrix has {found} rows but there are {expected} nodes")]
    MatrixRowCount {
        /// Number of nodes implied by `demands`.
        expected: usize,
        /// Number of rows supplied.
        found: usize,
    },
    /// A travel-time matrix row has the wrong number of columns.
    #[error("time matrix row {row} has {found} entries but there are {expected} nodes")]
    MatrixRowLength {
        /// Offending row.
        row: NodeId,
        /// Number of nodes implied by `demands`.
        expected: usize,
        /// Number of entries supplied.
        found: usize,
    },
    /// The time-window array has the wrong length.
    #[error("{found} time windows supplied for {expected} nodes")]
    TimeWindowCount {
        /// Number of nodes implied by `demands`.
        expected: usize,
        /// Number of windows supplied.
        found: usize,
    },
    /// The service-time array has the wrong length.
    #[error("{found} service times supplied for {expected} nodes")]
    ServiceTimeCount {
        /// Number of nodes implied by `demands`.
        expected: usize,
        /// Number of service times supplied.
        found: usize,
    },
    /// The depot carries demand.
    #[error("depot demand must be zero, found {demand}")]
    DepotDemand {
        /// Demand found at the depot.
        demand: i64,
    },
    /// A node has negative demand.
    #[error("node {node} has negative demand {demand}")]
    NegativeDemand {
        /// Offending node.
        node: NodeId,
        /// Demand found.
        demand: i64,
    },
    /// A travel time is negative.
    #[error("travel time from {from} to {to} is negative ({value})")]
    NegativeTravelTime {
        /// Row of the offending entry.
        from: NodeId,
        /// Column of the offending entry.
        to: NodeId,
        /// Value found.
        value: i64,
    },
    /// A service time is negative.
    #[error("node {node} has negative service time {value}")]
    NegativeServiceTime {
        /// Offending node.
        node: NodeId,
        /// Value found.
        value: i64,
    },
    /// A time window closes before it opens.
    #[error("node {node} has time window [{earliest}, {latest}] with earliest > latest")]
    InvertedTimeWindow {
        /// Offending node.
        node: NodeId,
        /// Window start.
        earliest: i64,
        /// Window end.
        latest: i64,
    },
    /// Vehicle capacity is zero or negative.
    #[error("vehicle capacity must be positive, found {0}")]
    NonPositiveCapacity(i64),
    /// Maximum route duration is zero or negative.
    #[error("maximum route duration must be positive, found {0}")]
    NonPositiveRouteDuration(i64),
    /// The solve budget is not a positive, finite number of seconds.
    #[error("timeout must be a positive, finite number of seconds, found {0}")]
    InvalidTimeout(f64),
}

/// Errors returned by [`solve`](crate::solve) and by
/// [`SolvingService`](crate::SolvingService) implementations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    /// The instance failed validation; no search was attempted.
    #[error("invalid instance: {0}")]
    InvalidInstance(#[from] InstanceError),
    /// The time budget elapsed before any feasible assignment was found.
    #[error("no feasible solution found within the time budget")]
    NoFeasibleSolution,
    /// The solving service does not implement the requested strategy.
    #[error("unsupported search strategy: {0}")]
    UnsupportedStrategy(String),
    /// The solving service returned an assignment the model rejects.
    #[error("solving service returned an invalid assignment: {0}")]
    InvalidAssignment(String),
}
