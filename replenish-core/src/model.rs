//! Constraint model over the augmented graph.
//!
//! The model defines three cumulative dimensions and the arc cost:
//!
//! - **Capacity**: load carried since the route start or the last reload,
//!   bounded by the vehicle capacity. Leaving a node adds its demand; leaving
//!   a reload node releases a full vehicle load, which resets the running
//!   load to zero.
//! - **Time**: elapsed route time, starting at zero and capped by the maximum
//!   route duration.
//! - **Window**: the same transit as *Time* but with a free start value and a
//!   per-customer `[earliest, latest]` bound.
//!
//! Both time tracks use zero slack, so the only freedom in a route's schedule
//! is the window track's start value. [`RoutingModel::evaluate`] computes the
//! feasible interval for that start and everything derived from it.
//!
//! All lookups are pure functions over an explicit [`TransitContext`]; the
//! model never captures mutable state.

use thiserror::Error;

use crate::graph::{AugmentedGraph, Node, NodeId, NodeKind};
use crate::instance::Instance;

/// Fixed cost charged once for every vehicle that leaves the depot.
///
/// It dwarfs any realistic travel cost so the objective minimises the number
/// of vehicles before route length.
pub const VEHICLE_FIXED_COST: i64 = 1_000_000;

/// Upper bound of the window track; cumulative arithmetic saturates here.
pub const UNBOUNDED: i64 = i64::MAX;

/// Cost of moving along an arc of the augmented graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transit {
    /// Travel time between the endpoints plus service time at the origin.
    Cost(i64),
    /// The arc may never appear in a route.
    Forbidden,
}

impl Transit {
    /// Return the cost, or `None` for a forbidden arc.
    #[must_use]
    pub const fn cost(self) -> Option<i64> {
        match self {
            Self::Cost(cost) => Some(cost),
            Self::Forbidden => None,
        }
    }
}

/// Explicit inputs for transit lookups.
#[derive(Debug, Clone, Copy)]
pub struct TransitContext<'a> {
    /// Node table of the augmented graph.
    pub nodes: &'a [Node],
    /// Travel-time matrix over real nodes.
    pub matrix: &'a [Vec<i64>],
}

/// Transit from `from` to `to`.
///
/// Reload endpoints use the depot's location. Reload to reload, reload to
/// depot and depot to reload arcs are forbidden: a reload stop is only useful
/// with customer work on both sides. Unknown ids are forbidden as well.
///
/// # Examples
/// ```
/// use replenish_core::{arc_transit, AugmentedGraph, Instance, TimeWindow, Transit, TransitContext};
///
/// let instance = Instance {
///     demands: vec![0, 5, 6],
///     depot_idx: 0,
///     time_matrix: vec![vec![0, 3, 4], vec![3, 0, 5], vec![4, 5, 0]],
///     time_windows: vec![TimeWindow::new(0, 100); 3],
///     service_time: vec![0, 2, 1],
///     capacity: 10,
///     travel_time: 100,
///     timeout: 1.0,
/// };
/// let graph = AugmentedGraph::build(&instance);
/// let context = TransitContext { nodes: graph.nodes(), matrix: &instance.time_matrix };
///
/// assert_eq!(arc_transit(&context, 1, 2), Transit::Cost(7));
/// // Node 3 is the first reload node, co-located with the depot.
/// assert_eq!(arc_transit(&context, 1, 3), Transit::Cost(5));
/// assert_eq!(arc_transit(&context, 0, 3), Transit::Forbidden);
/// ```
#[must_use]
pub fn arc_transit(context: &TransitContext<'_>, from: NodeId, to: NodeId) -> Transit {
    let (Some(origin), Some(target)) = (context.nodes.get(from), context.nodes.get(to)) else {
        return Transit::Forbidden;
    };
    if matches!(
        (origin.kind, target.kind),
        (NodeKind::ReloadVirtual, NodeKind::ReloadVirtual | NodeKind::Depot)
            | (NodeKind::Depot, NodeKind::ReloadVirtual)
    ) {
        return Transit::Forbidden;
    }
    context
        .matrix
        .get(origin.location)
        .and_then(|row| row.get(target.location))
        .map_or(Transit::Forbidden, |travel| {
            Transit::Cost(travel.saturating_add(origin.service_time))
        })
}

/// Load change when leaving `node`: its demand, or minus a full vehicle load
/// for a reload node.
#[must_use]
pub const fn load_transit(node: &Node, capacity: i64) -> i64 {
    match node.kind {
        NodeKind::ReloadVirtual => capacity.saturating_neg(),
        NodeKind::Depot | NodeKind::Customer => node.demand,
    }
}

/// How a dimension's cumulative value is initialised at a route start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartCumul {
    /// The cumulative value starts at zero.
    Zero,
    /// The start value is free within the dimension's bounds.
    Free,
}

/// A cumulative quantity tracked along each route.
///
/// Every dimension is zero-slack: the value at a node is the value at its
/// predecessor plus the arc transit. Only the capacity track departs from
/// this, clamping at zero after a reload releases a full load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    /// Human-readable name used in logs.
    pub name: &'static str,
    /// Upper bound on the cumulative value at every node.
    pub upper: i64,
    /// Initialisation at route start.
    pub start: StartCumul,
}

impl Dimension {
    /// Smallest and largest start value allowed by [`Self::start`].
    ///
    /// ```
    /// use replenish_core::{Dimension, StartCumul};
    ///
    /// let mut window = Dimension { name: "Window", upper: 50, start: StartCumul::Free };
    /// assert_eq!(window.start_range(), (0, 50));
    /// window.start = StartCumul::Zero;
    /// assert_eq!(window.start_range(), (0, 0));
    /// ```
    #[must_use]
    pub const fn start_range(&self) -> (i64, i64) {
        match self.start {
            StartCumul::Zero => (0, 0),
            StartCumul::Free => (0, self.upper),
        }
    }
}

/// A set of optional nodes; at most one is visited and omitting all of them
/// costs `penalty`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disjunction {
    /// Nodes covered by the disjunction.
    pub nodes: Vec<NodeId>,
    /// Cost charged when none of the nodes is visited.
    pub penalty: i64,
}

/// Reasons a candidate route is infeasible.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteViolation {
    /// The route references a node outside the augmented graph.
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),
    /// The depot appears between a route's start and end.
    #[error("depot {0} may only start or end a route")]
    DepotInsideRoute(NodeId),
    /// The route uses a forbidden arc.
    #[error("arc {from} -> {to} is forbidden")]
    ForbiddenArc {
        /// Origin of the arc.
        from: NodeId,
        /// Target of the arc.
        to: NodeId,
    },
    /// Carried load exceeds the vehicle capacity on arrival at `node`.
    #[error("load {load} on arrival at node {node} exceeds capacity {capacity}")]
    CapacityExceeded {
        /// Node reached with too much load.
        node: NodeId,
        /// Load on arrival.
        load: i64,
        /// Vehicle capacity.
        capacity: i64,
    },
    /// Elapsed time exceeds the maximum route duration on arrival at `node`.
    #[error("elapsed time {elapsed} on arrival at node {node} exceeds route limit {limit}")]
    DurationExceeded {
        /// Node reached too late.
        node: NodeId,
        /// Elapsed time on arrival.
        elapsed: i64,
        /// Maximum route duration.
        limit: i64,
    },
    /// No start time lets the route meet this customer's window together
    /// with the windows of the customers before it.
    #[error("time window of node {node} cannot be met")]
    TimeWindowMissed {
        /// Customer whose window breaks the schedule.
        node: NodeId,
    },
}

/// Feasible schedule of a route, including the depot at both ends.
///
/// Vectors are indexed by path position: position 0 is the depot start and
/// the last position is the depot end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSchedule {
    /// Sum of arc transits along the route.
    pub transit_cost: i64,
    /// Time-track value at each position.
    pub elapsed: Vec<i64>,
    /// Capacity-track value at each position.
    pub loads: Vec<i64>,
    /// Smallest feasible window-track start value.
    pub earliest_start: i64,
    /// Largest feasible window-track start value.
    pub latest_start: i64,
}

impl RouteSchedule {
    /// Total elapsed time from depot start to depot end.
    #[must_use]
    pub fn duration(&self) -> i64 {
        self.elapsed.last().copied().unwrap_or(0)
    }

    /// Upper bound of the window-track value at each position.
    pub fn arrival_upper_bounds(&self) -> impl Iterator<Item = i64> + '_ {
        self.elapsed
            .iter()
            .map(|offset| self.latest_start.saturating_add(*offset))
    }
}

/// Routing model for one solve: graph, dimensions, disjunctions and costs.
///
/// The model borrows the augmented graph and the instance; neither is
/// mutated.
#[derive(Debug, Clone)]
pub struct RoutingModel<'a> {
    graph: &'a AugmentedGraph,
    context: TransitContext<'a>,
    capacity: Dimension,
    time: Dimension,
    window: Dimension,
    disjunctions: Vec<Disjunction>,
}

impl<'a> RoutingModel<'a> {
    /// Build the constraint model for `graph`, reading travel times from
    /// `instance`.
    #[must_use]
    pub fn new(graph: &'a AugmentedGraph, instance: &'a Instance) -> Self {
        let disjunctions = graph
            .reloads()
            .map(|reload| Disjunction {
                nodes: vec![reload.id],
                penalty: 0,
            })
            .collect();
        let model = Self {
            graph,
            context: TransitContext {
                nodes: graph.nodes(),
                matrix: &instance.time_matrix,
            },
            capacity: Dimension {
                name: "Capacity",
                upper: instance.vehicle_capacity(),
                start: StartCumul::Zero,
            },
            time: Dimension {
                name: "Time",
                upper: instance.max_route_duration(),
                start: StartCumul::Zero,
            },
            window: Dimension {
                name: "Window",
                upper: UNBOUNDED,
                start: StartCumul::Free,
            },
            disjunctions,
        };
        log::debug!(
            "model dimensions: {} <= {}, {} <= {}, {} <= {}; {} optional nodes",
            model.capacity.name,
            model.capacity.upper,
            model.time.name,
            model.time.upper,
            model.window.name,
            model.window.upper,
            model.disjunctions.len()
        );
        model
    }

    /// The augmented graph the model is defined over.
    #[must_use]
    pub const fn graph(&self) -> &'a AugmentedGraph {
        self.graph
    }

    /// Number of vehicle slots.
    #[must_use]
    pub const fn vehicle_count(&self) -> usize {
        self.graph.vehicle_count()
    }

    /// Id of the depot node.
    #[must_use]
    pub const fn depot(&self) -> NodeId {
        self.graph.depot()
    }

    /// The capacity dimension.
    #[must_use]
    pub const fn capacity_dimension(&self) -> &Dimension {
        &self.capacity
    }

    /// The route-duration dimension.
    #[must_use]
    pub const fn time_dimension(&self) -> &Dimension {
        &self.time
    }

    /// The time-window dimension.
    #[must_use]
    pub const fn window_dimension(&self) -> &Dimension {
        &self.window
    }

    /// Optional node sets; one zero-penalty disjunction per reload node.
    #[must_use]
    pub fn disjunctions(&self) -> &[Disjunction] {
        &self.disjunctions
    }

    /// Return whether `node` may be left out of every route.
    #[must_use]
    pub fn is_optional(&self, node: NodeId) -> bool {
        self.disjunctions
            .iter()
            .any(|disjunction| disjunction.nodes.contains(&node))
    }

    /// Nodes covered by a disjunction, in disjunction order.
    pub fn optional_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.disjunctions
            .iter()
            .flat_map(|disjunction| disjunction.nodes.iter().copied())
    }

    /// Non-depot nodes outside every disjunction; each must be visited.
    pub fn mandatory_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph
            .nodes()
            .iter()
            .filter(|node| node.kind != NodeKind::Depot && !self.is_optional(node.id))
            .map(|node| node.id)
    }

    /// Sum of penalties for disjunctions none of whose nodes is visited.
    ///
    /// `visited` is indexed by node id; ids past its end count as unvisited.
    #[must_use]
    pub fn omission_penalty(&self, visited: &[bool]) -> i64 {
        self.disjunctions
            .iter()
            .filter(|disjunction| {
                !disjunction
                    .nodes
                    .iter()
                    .any(|id| visited.get(*id).copied().unwrap_or(false))
            })
            .fold(0_i64, |total, disjunction| {
                total.saturating_add(disjunction.penalty)
            })
    }

    /// Fixed cost charged per used vehicle.
    #[must_use]
    pub const fn fixed_vehicle_cost(&self) -> i64 {
        VEHICLE_FIXED_COST
    }

    /// Transit from `from` to `to`.
    #[must_use]
    pub fn transit(&self, from: NodeId, to: NodeId) -> Transit {
        arc_transit(&self.context, from, to)
    }

    /// Load change when leaving `node`, or `None` for an unknown id.
    #[must_use]
    pub fn load_transit(&self, id: NodeId) -> Option<i64> {
        self.graph
            .node(id)
            .map(|node| load_transit(node, self.capacity.upper))
    }

    /// Check a route against every dimension and return its schedule.
    ///
    /// `route` lists the visited nodes between the depot start and end. An
    /// empty route is an unused vehicle and costs nothing.
    ///
    /// # Errors
    ///
    /// Returns the first [`RouteViolation`] found while walking the route.
    pub fn evaluate(&self, route: &[NodeId]) -> Result<RouteSchedule, RouteViolation> {
        let (initial_load, _) = self.capacity.start_range();
        let (time_start, mut time_latest) = self.time.start_range();
        let (mut earliest_start, mut latest_start) = self.window.start_range();
        if route.is_empty() {
            return Ok(RouteSchedule {
                transit_cost: 0,
                elapsed: vec![0, 0],
                loads: vec![initial_load, initial_load],
                earliest_start,
                latest_start,
            });
        }
        let depot = self.depot();
        let mut path = Vec::with_capacity(route.len().saturating_add(2));
        path.push(self.node_or_err(depot)?);
        for &id in route {
            let node = self.node_or_err(id)?;
            if node.kind == NodeKind::Depot {
                return Err(RouteViolation::DepotInsideRoute(id));
            }
            path.push(node);
        }
        path.push(self.node_or_err(depot)?);

        let mut elapsed = Vec::with_capacity(path.len());
        let mut loads = Vec::with_capacity(path.len());
        elapsed.push(0_i64);
        loads.push(initial_load);

        for pair in path.windows(2) {
            let [origin, target] = pair else { continue };
            let transit = self
                .transit(origin.id, target.id)
                .cost()
                .ok_or(RouteViolation::ForbiddenArc {
                    from: origin.id,
                    to: target.id,
                })?;

            let previous_load = loads.last().copied().unwrap_or(initial_load);
            let load = previous_load
                .saturating_add(load_transit(origin, self.capacity.upper))
                .max(0);
            if load > self.capacity.upper {
                return Err(RouteViolation::CapacityExceeded {
                    node: target.id,
                    load,
                    capacity: self.capacity.upper,
                });
            }

            let arrival = elapsed.last().copied().unwrap_or(0).saturating_add(transit);
            time_latest = time_latest.min(self.time.upper.saturating_sub(arrival));
            if time_start > time_latest {
                return Err(RouteViolation::DurationExceeded {
                    node: target.id,
                    elapsed: arrival,
                    limit: self.time.upper,
                });
            }

            if let Some(window) = target.time_window {
                earliest_start = earliest_start.max(window.earliest.saturating_sub(arrival));
                latest_start = latest_start.min(window.latest.saturating_sub(arrival));
            }
            latest_start = latest_start.min(self.window.upper.saturating_sub(arrival));
            if earliest_start > latest_start {
                return Err(RouteViolation::TimeWindowMissed { node: target.id });
            }

            loads.push(load);
            elapsed.push(arrival);
        }

        Ok(RouteSchedule {
            transit_cost: elapsed.last().copied().unwrap_or(0),
            elapsed,
            loads,
            earliest_start,
            latest_start,
        })
    }

    /// Objective contribution of one vehicle's route: transit cost plus the
    /// fixed vehicle cost, or zero for an unused vehicle.
    ///
    /// # Errors
    ///
    /// Returns the [`RouteViolation`] reported by [`Self::evaluate`].
    pub fn route_cost(&self, route: &[NodeId]) -> Result<i64, RouteViolation> {
        if route.is_empty() {
            return Ok(0);
        }
        let schedule = self.evaluate(route)?;
        Ok(schedule.transit_cost.saturating_add(self.fixed_vehicle_cost()))
    }

    fn node_or_err(&self, id: NodeId) -> Result<&'a Node, RouteViolation> {
        self.graph.node(id).ok_or(RouteViolation::UnknownNode(id))
    }
}
