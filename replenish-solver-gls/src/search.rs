//! Local search guided by arc penalties.
//!
//! Moves are scored on the augmented objective
//! `cost + lambda * sum(arc penalties)` and accepted on strict improvement,
//! so every descent terminates. At each local optimum the arcs with the
//! highest utility `transit / (1 + penalty)` are penalised, which pushes the
//! search away from the expensive parts of the current plan. The plan with
//! the lowest true objective seen is returned.

use std::collections::HashMap;

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use replenish_core::{Node, NodeId, NodeKind, RoutingModel};

use crate::deadline::Deadline;
use crate::plan::{Plan, insertions, tidy_reloads, with_inserted, without};

/// When the search stops improving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    /// Stop at the first local optimum.
    Descent,
    /// Penalise and continue until the deadline or iteration cap.
    Guided,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Improved,
    Optimum,
    OutOfTime,
}

/// Settings for one run of [`GuidedSearch`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct SearchSettings {
    pub(crate) mode: Mode,
    pub(crate) seed: u64,
    pub(crate) lambda_coefficient: f64,
    pub(crate) max_iterations: Option<usize>,
}

type ArcKey = (NodeId, NodeId);

pub(crate) struct GuidedSearch<'m, 'a> {
    model: &'m RoutingModel<'a>,
    plan: Plan,
    augmented: Vec<i64>,
    penalties: HashMap<ArcKey, i64>,
    lambda: i64,
    rng: ChaCha8Rng,
}

impl<'m, 'a> GuidedSearch<'m, 'a> {
    pub(crate) fn new(model: &'m RoutingModel<'a>, plan: Plan, seed: u64) -> Self {
        let mut search = Self {
            model,
            augmented: vec![0; plan.vehicle_count()],
            plan,
            penalties: HashMap::new(),
            lambda: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        };
        search.refresh_augmented();
        search
    }

    /// Improve the plan until the deadline, the iteration cap, or (in
    /// descent mode) the first local optimum.
    pub(crate) fn run(mut self, settings: &SearchSettings, deadline: &Deadline) -> Plan {
        let mut best = self.plan.clone();
        let mut iterations = 0_usize;
        loop {
            let finished = self.descend(deadline);
            if self.plan.total_cost() < best.total_cost() {
                log::debug!(
                    "iteration {iterations}: improved cost to {}",
                    self.plan.total_cost()
                );
                best = self.plan.clone();
            }
            if finished || settings.mode == Mode::Descent {
                break;
            }
            if settings
                .max_iterations
                .is_some_and(|limit| iterations >= limit)
            {
                break;
            }
            if self.lambda == 0 {
                self.lambda = lambda_for(
                    settings.lambda_coefficient,
                    self.plan.travel_cost(self.model),
                    self.arcs().len(),
                );
                log::debug!("guided local search lambda set to {}", self.lambda);
            }
            self.penalise();
            iterations = iterations.saturating_add(1);
        }
        log::debug!(
            "local search finished after {iterations} penalty rounds at cost {}",
            best.total_cost()
        );
        best
    }

    /// Apply improving moves until none is left. Returns `true` when the
    /// deadline cut the descent short.
    fn descend(&mut self, deadline: &Deadline) -> bool {
        loop {
            let step = self.improve_once(deadline);
            match step {
                Step::Improved => {}
                Step::Optimum => return false,
                Step::OutOfTime => return true,
            }
        }
    }

    fn improve_once(&mut self, deadline: &Deadline) -> Step {
        let neighbourhoods: [fn(&mut Self, &Deadline) -> Step; 5] = [
            Self::remove_reload,
            Self::relocate,
            Self::exchange,
            Self::two_opt,
            Self::insert_reload,
        ];
        for neighbourhood in neighbourhoods {
            let step = neighbourhood(self, deadline);
            if step != Step::Optimum {
                return step;
            }
        }
        Step::Optimum
    }

    /// Move one customer elsewhere in its route or into another route.
    fn relocate(&mut self, deadline: &Deadline) -> Step {
        for (from, position) in self.customer_positions() {
            if deadline.expired() {
                return Step::OutOfTime;
            }
            let source = self.plan.route(from);
            let Some(customer) = source.get(position).copied() else {
                continue;
            };
            let reduced = tidy_reloads(self.model, without(source, position));
            let reload = self.plan.free_reload(self.model);
            let first_empty = self.plan.first_empty();

            for to in 0..self.plan.vehicle_count() {
                if to == from {
                    let candidates: Vec<Vec<NodeId>> =
                        insertions(&reduced, customer, reload).collect();
                    for candidate in candidates {
                        if self.try_apply(vec![(from, candidate)]) {
                            return Step::Improved;
                        }
                    }
                    continue;
                }
                let target = self.plan.route(to);
                if target.is_empty() && Some(to) != first_empty {
                    continue;
                }
                let candidates: Vec<Vec<NodeId>> = insertions(target, customer, reload).collect();
                for candidate in candidates {
                    if self.try_apply(vec![(from, reduced.clone()), (to, candidate)]) {
                        return Step::Improved;
                    }
                }
            }
        }
        Step::Optimum
    }

    /// Swap two customers on different routes.
    fn exchange(&mut self, deadline: &Deadline) -> Step {
        let positions = self.customer_positions();
        for (index, &(left, i)) in positions.iter().enumerate() {
            if deadline.expired() {
                return Step::OutOfTime;
            }
            for &(right, j) in positions.iter().skip(index.saturating_add(1)) {
                if left == right {
                    continue;
                }
                let mut left_route = self.plan.route(left).to_vec();
                let mut right_route = self.plan.route(right).to_vec();
                let (Some(a), Some(b)) = (left_route.get_mut(i), right_route.get_mut(j)) else {
                    continue;
                };
                std::mem::swap(a, b);
                if self.try_apply(vec![(left, left_route), (right, right_route)]) {
                    return Step::Improved;
                }
            }
        }
        Step::Optimum
    }

    /// Reverse a segment of one route.
    fn two_opt(&mut self, deadline: &Deadline) -> Step {
        for vehicle in self.used_vehicles() {
            if deadline.expired() {
                return Step::OutOfTime;
            }
            let len = self.plan.route(vehicle).len();
            for i in 0..len {
                for j in i.saturating_add(1)..len {
                    let mut candidate = self.plan.route(vehicle).to_vec();
                    if let Some(segment) = candidate.get_mut(i..=j) {
                        segment.reverse();
                    }
                    if self.try_apply(vec![(vehicle, candidate)]) {
                        return Step::Improved;
                    }
                }
            }
        }
        Step::Optimum
    }

    /// Put an unused reload node between two stops of a route.
    fn insert_reload(&mut self, deadline: &Deadline) -> Step {
        let Some(reload) = self.plan.free_reload(self.model) else {
            return Step::Optimum;
        };
        for vehicle in self.used_vehicles() {
            if deadline.expired() {
                return Step::OutOfTime;
            }
            let route = self.plan.route(vehicle).to_vec();
            for position in 1..route.len() {
                let candidate = with_inserted(&route, position, &[reload]);
                if self.try_apply(vec![(vehicle, candidate)]) {
                    return Step::Improved;
                }
            }
        }
        Step::Optimum
    }

    /// Drop a reload stop from a route.
    fn remove_reload(&mut self, deadline: &Deadline) -> Step {
        for vehicle in self.used_vehicles() {
            if deadline.expired() {
                return Step::OutOfTime;
            }
            let route = self.plan.route(vehicle).to_vec();
            for (position, id) in route.iter().enumerate() {
                if !self.is_kind(*id, NodeKind::ReloadVirtual) {
                    continue;
                }
                if self.try_apply(vec![(vehicle, without(&route, position))]) {
                    return Step::Improved;
                }
            }
        }
        Step::Optimum
    }

    /// Replace routes when the augmented objective strictly improves and
    /// every new route is feasible.
    fn try_apply(&mut self, changes: Vec<(usize, Vec<NodeId>)>) -> bool {
        let before = changes.iter().fold(0_i64, |total, (vehicle, _)| {
            total.saturating_add(self.augmented.get(*vehicle).copied().unwrap_or(0))
        });
        let mut scored = Vec::with_capacity(changes.len());
        let mut after = 0_i64;
        for (vehicle, route) in changes {
            let Some((cost, augmented)) = self.score(&route) else {
                return false;
            };
            after = after.saturating_add(augmented);
            scored.push((vehicle, route, cost, augmented));
        }
        if after >= before {
            return false;
        }
        for (vehicle, route, cost, augmented) in scored {
            self.plan.replace(vehicle, route, cost);
            if let Some(slot) = self.augmented.get_mut(vehicle) {
                *slot = augmented;
            }
        }
        true
    }

    /// True objective and augmented objective of a route, or `None` when the
    /// route is infeasible.
    fn score(&self, route: &[NodeId]) -> Option<(i64, i64)> {
        let cost = self.model.route_cost(route).ok()?;
        let penalty = path(self.model.depot(), route)
            .into_iter()
            .map(|arc| self.penalty(arc))
            .fold(0_i64, i64::saturating_add);
        Some((cost, cost.saturating_add(self.lambda.saturating_mul(penalty))))
    }

    fn refresh_augmented(&mut self) {
        let updated: Vec<i64> = (0..self.plan.vehicle_count())
            .map(|vehicle| {
                let route = self.plan.route(vehicle);
                self.score(route)
                    .map_or(self.plan.cost(vehicle), |(_, augmented)| augmented)
            })
            .collect();
        self.augmented = updated;
    }

    /// Increment the penalty of every maximum-utility arc in the plan.
    fn penalise(&mut self) {
        let mut chosen: Vec<ArcKey> = Vec::new();
        let mut best: Option<(i64, i64)> = None;
        for (from, to) in self.arcs() {
            let transit = self.model.transit(from, to).cost().unwrap_or(0);
            let key = self.key(from, to);
            let penalty = self.penalty((from, to));
            match best.map(|incumbent| compare_utility((transit, penalty), incumbent)) {
                None | Some(std::cmp::Ordering::Greater) => {
                    best = Some((transit, penalty));
                    chosen.clear();
                    chosen.push(key);
                }
                Some(std::cmp::Ordering::Equal) => {
                    if !chosen.contains(&key) {
                        chosen.push(key);
                    }
                }
                Some(std::cmp::Ordering::Less) => {}
            }
        }
        for key in chosen {
            let entry = self.penalties.entry(key).or_insert(0);
            *entry = entry.saturating_add(1);
        }
        self.refresh_augmented();
    }

    /// Arcs of every used route, depot start and end included.
    fn arcs(&self) -> Vec<(NodeId, NodeId)> {
        let depot = self.model.depot();
        self.plan
            .routes()
            .iter()
            .filter(|route| !route.is_empty())
            .flat_map(|route| path(depot, route))
            .collect()
    }

    /// Penalties are shared by arcs between the same physical locations, so
    /// every reload node sees the depot's penalties.
    fn key(&self, from: NodeId, to: NodeId) -> ArcKey {
        let location = |id: NodeId| self.model.graph().node(id).map_or(id, |node| node.location);
        (location(from), location(to))
    }

    fn penalty(&self, (from, to): (NodeId, NodeId)) -> i64 {
        self.penalties
            .get(&self.key(from, to))
            .copied()
            .unwrap_or(0)
    }

    fn is_kind(&self, id: NodeId, kind: NodeKind) -> bool {
        self.model.graph().node(id).is_some_and(|node| node.kind == kind)
    }

    /// Customer positions across all routes in shuffled order.
    fn customer_positions(&mut self) -> Vec<(usize, usize)> {
        let plan = &self.plan;
        let graph = self.model.graph();
        let mut positions: Vec<(usize, usize)> = (0..plan.vehicle_count())
            .flat_map(move |vehicle| {
                plan.route(vehicle)
                    .iter()
                    .enumerate()
                    .filter(move |(_, id)| graph.node(**id).is_some_and(Node::is_customer))
                    .map(move |(position, _)| (vehicle, position))
            })
            .collect();
        positions.shuffle(&mut self.rng);
        positions
    }

    fn used_vehicles(&mut self) -> Vec<usize> {
        let mut vehicles: Vec<usize> = (0..self.plan.vehicle_count())
            .filter(|vehicle| !self.plan.route(*vehicle).is_empty())
            .collect();
        vehicles.shuffle(&mut self.rng);
        vehicles
    }
}

/// Consecutive stop pairs of a route, depot start and end included.
fn path(depot: NodeId, route: &[NodeId]) -> Vec<(NodeId, NodeId)> {
    let stops: Vec<NodeId> = std::iter::once(depot)
        .chain(route.iter().copied())
        .chain(std::iter::once(depot))
        .collect();
    stops
        .windows(2)
        .filter_map(|pair| match pair {
            [from, to] => Some((*from, *to)),
            _ => None,
        })
        .collect()
}

/// Order arcs by utility `transit / (1 + penalty)` without division.
fn compare_utility((cost, penalty): (i64, i64), (other_cost, other_penalty): (i64, i64)) -> std::cmp::Ordering {
    let lhs = i128::from(cost).saturating_mul(i128::from(other_penalty).saturating_add(1));
    let rhs = i128::from(other_cost).saturating_mul(i128::from(penalty).saturating_add(1));
    lhs.cmp(&rhs)
}

/// Penalty weight: `coefficient` times the mean arc transit of the first
/// local optimum, never below one.
#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    reason = "lambda scales the mean arc cost by a fractional coefficient"
)]
fn lambda_for(coefficient: f64, travel_cost: i64, arcs: usize) -> i64 {
    if arcs == 0 {
        return 1;
    }
    let raw = coefficient * travel_cost as f64 / arcs as f64;
    if raw.is_finite() && raw >= 1.0 {
        raw.round() as i64
    } else {
        1
    }
}
