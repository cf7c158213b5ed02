//! Mutable working copy of an assignment plus route-editing helpers.

use replenish_core::{Assignment, Node, NodeId, RoutingModel};

/// Routes per vehicle slot with their cached objective contribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Plan {
    routes: Vec<Vec<NodeId>>,
    costs: Vec<i64>,
}

impl Plan {
    pub(crate) fn empty(vehicles: usize) -> Self {
        Self {
            routes: vec![Vec::new(); vehicles],
            costs: vec![0; vehicles],
        }
    }

    pub(crate) fn vehicle_count(&self) -> usize {
        self.routes.len()
    }

    pub(crate) fn routes(&self) -> &[Vec<NodeId>] {
        &self.routes
    }

    pub(crate) fn route(&self, vehicle: usize) -> &[NodeId] {
        self.routes
            .get(vehicle)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(crate) fn cost(&self, vehicle: usize) -> i64 {
        self.costs.get(vehicle).copied().unwrap_or(0)
    }

    /// Objective value: transit plus fixed cost over used vehicles.
    pub(crate) fn total_cost(&self) -> i64 {
        self.costs
            .iter()
            .fold(0_i64, |total, cost| total.saturating_add(*cost))
    }

    /// Objective value without fixed vehicle costs.
    pub(crate) fn travel_cost(&self, model: &RoutingModel<'_>) -> i64 {
        let used = self.routes.iter().filter(|route| !route.is_empty()).count();
        let fixed = i64::try_from(used)
            .unwrap_or(i64::MAX)
            .saturating_mul(model.fixed_vehicle_cost());
        self.total_cost().saturating_sub(fixed)
    }

    pub(crate) fn used_vehicles(&self) -> usize {
        self.routes.iter().filter(|route| !route.is_empty()).count()
    }

    /// First unused vehicle slot. Unused slots are interchangeable, so moves
    /// only ever open this one.
    pub(crate) fn first_empty(&self) -> Option<usize> {
        self.routes.iter().position(Vec::is_empty)
    }

    /// An optional node no route visits yet.
    pub(crate) fn free_reload(&self, model: &RoutingModel<'_>) -> Option<NodeId> {
        model
            .optional_nodes()
            .find(|id| !self.routes.iter().any(|route| route.contains(id)))
    }

    pub(crate) fn replace(&mut self, vehicle: usize, route: Vec<NodeId>, cost: i64) {
        if let (Some(slot), Some(cached)) = (self.routes.get_mut(vehicle), self.costs.get_mut(vehicle))
        {
            *slot = route;
            *cached = cost;
        }
    }

    pub(crate) fn into_assignment(self) -> Assignment {
        Assignment::new(self.routes)
    }
}

/// Copy of `route` with `nodes` spliced in before `position`.
pub(crate) fn with_inserted(route: &[NodeId], position: usize, nodes: &[NodeId]) -> Vec<NodeId> {
    let (head, tail) = route.split_at(position.min(route.len()));
    head.iter().chain(nodes).chain(tail).copied().collect()
}

/// Copy of `route` without the node at `position`.
pub(crate) fn without(route: &[NodeId], position: usize) -> Vec<NodeId> {
    route
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != position)
        .map(|(_, id)| *id)
        .collect()
}

/// Drop reload nodes left at either end of a route or next to another
/// reload, which the model forbids.
pub(crate) fn tidy_reloads(model: &RoutingModel<'_>, route: Vec<NodeId>) -> Vec<NodeId> {
    let is_reload = |id: NodeId| model.graph().node(id).is_some_and(Node::is_reload);
    let mut tidy: Vec<NodeId> = Vec::with_capacity(route.len());
    for id in route {
        if is_reload(id) && tidy.last().is_none_or(|last| is_reload(*last)) {
            continue;
        }
        tidy.push(id);
    }
    while tidy.last().is_some_and(|last| is_reload(*last)) {
        tidy.pop();
    }
    tidy
}

/// Every way to place `customer` into `route`: alone, preceded by `reload`,
/// or followed by `reload`.
pub(crate) fn insertions(
    route: &[NodeId],
    customer: NodeId,
    reload: Option<NodeId>,
) -> impl Iterator<Item = Vec<NodeId>> + '_ {
    (0..=route.len()).flat_map(move |position| {
        let plain = Some(with_inserted(route, position, &[customer]));
        let before = reload
            .filter(|_| position > 0)
            .map(|id| with_inserted(route, position, &[id, customer]));
        let after = reload
            .filter(|_| position < route.len())
            .map(|id| with_inserted(route, position, &[customer, id]));
        [plain, before, after].into_iter().flatten()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use replenish_core::AugmentedGraph;
    use replenish_core::test_support::InstanceBuilder;
    use rstest::rstest;

    #[rstest]
    fn splices_and_removes() {
        assert_eq!(with_inserted(&[1, 2], 1, &[7, 8]), vec![1, 7, 8, 2]);
        assert_eq!(with_inserted(&[1, 2], 9, &[7]), vec![1, 2, 7]);
        assert_eq!(without(&[1, 2, 3], 1), vec![1, 3]);
    }

    #[rstest]
    fn enumerates_reload_variants() {
        let all: Vec<Vec<NodeId>> = insertions(&[1], 2, Some(9)).collect();
        assert_eq!(
            all,
            vec![vec![2, 1], vec![2, 9, 1], vec![1, 2], vec![1, 9, 2]]
        );
        assert_eq!(insertions(&[], 2, None).count(), 1);
    }

    #[rstest]
    fn tidies_stranded_reloads() {
        // Depot 0, customers 1..=3, reloads 4 and 5.
        let instance = InstanceBuilder::uniform(&[0, 5, 6, 4], 1).build();
        let graph = AugmentedGraph::build(&instance);
        let model = RoutingModel::new(&graph, &instance);

        assert_eq!(tidy_reloads(&model, vec![4, 1, 4, 5, 2, 5]), vec![1, 4, 2]);
        assert_eq!(tidy_reloads(&model, vec![4]), Vec::<NodeId>::new());
    }

    #[rstest]
    fn tracks_costs_and_free_reloads() {
        let instance = InstanceBuilder::uniform(&[0, 5, 6, 4], 1).build();
        let graph = AugmentedGraph::build(&instance);
        let model = RoutingModel::new(&graph, &instance);
        let mut plan = Plan::empty(model.vehicle_count());

        assert_eq!(plan.free_reload(&model), Some(4));
        plan.replace(1, vec![1, 4, 2], 7);
        assert_eq!(plan.free_reload(&model), Some(5));
        assert_eq!(plan.first_empty(), Some(0));
        assert_eq!(plan.total_cost(), 7);
        assert_eq!(plan.used_vehicles(), 1);
        assert_eq!(plan.route(1), &[1, 4, 2]);
        assert!(plan.route(8).is_empty());
    }
}
