//! Turn a solving service's [`Assignment`] into an independent [`Solution`].
//!
//! The decoder re-checks the assignment against the model: a service that
//! returns duplicate visits, skips a customer or breaks a dimension is
//! reported as [`SolveError::InvalidAssignment`] rather than emitted.

use crate::error::SolveError;
use crate::graph::{NodeId, NodeKind};
use crate::model::RoutingModel;
use crate::service::{Assignment, Visit};

/// One stop of a decoded route.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Stop {
    /// Real node visited; reload stops report the depot.
    pub node: NodeId,
    /// Kind of the augmented node behind this stop.
    pub kind: NodeKind,
    /// Upper bound of the window-track value on arrival.
    pub arrival_upper_bound: i64,
}

/// A used vehicle's route, depot start and end included.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Route {
    /// Vehicle slot in the assignment.
    pub vehicle: usize,
    /// Stops in visit order.
    pub stops: Vec<Stop>,
    /// Sum of arc transits along the route.
    pub cost: i64,
}

impl Route {
    /// Number of mid-route reloads.
    #[must_use]
    pub fn reload_count(&self) -> usize {
        self.stops
            .iter()
            .filter(|stop| stop.kind == NodeKind::ReloadVirtual)
            .count()
    }
}

/// Routes of every used vehicle and the objective they achieve.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Solution {
    routes: Vec<Route>,
    total_cost: i64,
}

impl Solution {
    /// Routes in increasing vehicle-slot order.
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Number of used vehicles.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Transit cost of all routes plus the fixed cost of each used vehicle.
    #[must_use]
    pub const fn total_cost(&self) -> i64 {
        self.total_cost
    }

    /// Flatten into the parallel-array output record.
    ///
    /// Vehicles are renumbered `0, 1, 2, ...` over used routes.
    #[must_use]
    pub fn to_record(&self) -> SolutionRecord {
        let mut record = SolutionRecord::default();
        for (vehicle, route) in self.routes.iter().enumerate() {
            for stop in &route.stops {
                record.nodes.push(stop.node);
                record.vehicles.push(vehicle);
                record.time.push(stop.arrival_upper_bound);
            }
        }
        record
    }
}

/// Output record: three parallel arrays, one entry per stop.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct SolutionRecord {
    /// Real node id of each stop.
    pub nodes: Vec<NodeId>,
    /// Contiguous vehicle number of each stop.
    pub vehicles: Vec<usize>,
    /// Arrival-time upper bound of each stop.
    pub time: Vec<i64>,
}

/// Decode `assignment` against `model`.
///
/// Unused vehicle slots are skipped. Reload nodes are reported as the depot
/// and keep their [`NodeKind::ReloadVirtual`] tag on the stop.
///
/// # Errors
///
/// Returns [`SolveError::InvalidAssignment`] when the assignment has the
/// wrong number of vehicles, visits a node twice, references an unknown
/// node, omits a customer, or breaks a model constraint.
pub fn decode(model: &RoutingModel<'_>, assignment: &Assignment) -> Result<Solution, SolveError> {
    if assignment.vehicle_count() != model.vehicle_count() {
        return Err(SolveError::InvalidAssignment(format!(
            "expected {} vehicle slots, found {}",
            model.vehicle_count(),
            assignment.vehicle_count()
        )));
    }
    let graph = model.graph();
    let depot = model.depot();
    let mut visited = vec![false; graph.len()];
    let mut routes = Vec::new();
    let mut total_cost = 0_i64;

    for vehicle in 0..assignment.vehicle_count() {
        if !assignment.is_used(vehicle) {
            continue;
        }
        let mut sequence = Vec::new();
        for visit in assignment.chain(vehicle) {
            let Visit::Node(id) = visit else { continue };
            let seen = visited.get_mut(id).ok_or_else(|| {
                SolveError::InvalidAssignment(format!("vehicle {vehicle} visits unknown node {id}"))
            })?;
            if *seen {
                return Err(SolveError::InvalidAssignment(format!(
                    "node {id} is visited more than once"
                )));
            }
            *seen = true;
            sequence.push(id);
        }

        let schedule = model
            .evaluate(&sequence)
            .map_err(|violation| SolveError::InvalidAssignment(format!("vehicle {vehicle}: {violation}")))?;

        let ids = std::iter::once(depot)
            .chain(sequence.iter().copied())
            .chain(std::iter::once(depot));
        let stops = ids
            .zip(schedule.arrival_upper_bounds())
            .map(|(id, arrival_upper_bound)| {
                let kind = graph.node(id).map_or(NodeKind::Depot, |node| node.kind);
                let node = match kind {
                    NodeKind::ReloadVirtual => depot,
                    NodeKind::Depot | NodeKind::Customer => id,
                };
                Stop {
                    node,
                    kind,
                    arrival_upper_bound,
                }
            })
            .collect();

        total_cost = total_cost
            .saturating_add(schedule.transit_cost)
            .saturating_add(model.fixed_vehicle_cost());
        routes.push(Route {
            vehicle,
            stops,
            cost: schedule.transit_cost,
        });
    }

    if let Some(missing) = model
        .mandatory_nodes()
        .find(|id| !visited.get(*id).copied().unwrap_or(false))
    {
        return Err(SolveError::InvalidAssignment(format!(
            "customer {missing} is not visited"
        )));
    }
    total_cost = total_cost.saturating_add(model.omission_penalty(&visited));

    log::debug!(
        "decoded {} routes with total cost {}",
        routes.len(),
        total_cost
    );
    Ok(Solution { routes, total_cost })
}
