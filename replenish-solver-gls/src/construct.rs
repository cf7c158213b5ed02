//! Parallel cheapest insertion.
//!
//! Every vehicle slot is open at once. Each step evaluates every pending
//! customer at every position of every route and commits the single
//! insertion with the smallest increase in objective. Opening an unused
//! vehicle pays the fixed vehicle cost, so existing routes are extended
//! (with a reload stop if that is what makes the customer fit) before a new
//! vehicle leaves the depot.

use replenish_core::{NodeId, RoutingModel, SolveError};

use crate::deadline::Deadline;
use crate::plan::{Plan, insertions};

struct Insertion {
    pending_index: usize,
    vehicle: usize,
    route: Vec<NodeId>,
    cost: i64,
    delta: i64,
}

/// Build a first feasible plan.
///
/// Fails with [`SolveError::NoFeasibleSolution`] when a customer fits
/// nowhere or the deadline passes before every customer is placed.
pub(crate) fn parallel_cheapest_insertion(
    model: &RoutingModel<'_>,
    deadline: &Deadline,
) -> Result<Plan, SolveError> {
    let mut plan = Plan::empty(model.vehicle_count());
    let mut pending: Vec<NodeId> = model.mandatory_nodes().collect();

    while !pending.is_empty() {
        if deadline.expired() {
            log::warn!(
                "time budget exhausted with {} customers still unrouted",
                pending.len()
            );
            return Err(SolveError::NoFeasibleSolution);
        }
        let Some(insertion) = cheapest_insertion(model, &plan, &pending) else {
            log::warn!("no feasible insertion for customers {pending:?}");
            return Err(SolveError::NoFeasibleSolution);
        };
        pending.remove(insertion.pending_index);
        plan.replace(insertion.vehicle, insertion.route, insertion.cost);
    }

    log::debug!(
        "cheapest insertion used {} vehicles at cost {}",
        plan.used_vehicles(),
        plan.total_cost()
    );
    Ok(plan)
}

fn cheapest_insertion(
    model: &RoutingModel<'_>,
    plan: &Plan,
    pending: &[NodeId],
) -> Option<Insertion> {
    let reload = plan.free_reload(model);
    let first_empty = plan.first_empty();
    let mut best: Option<Insertion> = None;

    for vehicle in 0..plan.vehicle_count() {
        let route = plan.route(vehicle);
        if route.is_empty() && Some(vehicle) != first_empty {
            continue;
        }
        let current = plan.cost(vehicle);
        for (pending_index, customer) in pending.iter().copied().enumerate() {
            for candidate in insertions(route, customer, reload) {
                let Ok(cost) = model.route_cost(&candidate) else {
                    continue;
                };
                let delta = cost.saturating_sub(current);
                if best.as_ref().is_none_or(|incumbent| delta < incumbent.delta) {
                    best = Some(Insertion {
                        pending_index,
                        vehicle,
                        route: candidate,
                        cost,
                        delta,
                    });
                }
            }
        }
    }
    best
}
