//! Tests for the `GlsSolver`.

use super::*;
use replenish_core::test_support::InstanceBuilder;
use replenish_core::{AugmentedGraph, Instance, NodeKind, solve, solve_with_parameters};
use rstest::rstest;
use std::time::Duration;

fn bounded() -> GlsSolver {
    GlsSolver::with_config(GlsSolverConfig {
        max_iterations: Some(20),
        ..GlsSolverConfig::default()
    })
}

fn four_nodes() -> Instance {
    InstanceBuilder::uniform(&[0, 5, 6, 4], 2)
        .capacity(10)
        .timeout(5.0)
        .build()
}

#[rstest]
fn serves_every_customer_with_one_reloading_vehicle() {
    let solution = solve(&four_nodes(), &bounded()).expect("solve should succeed");

    assert_eq!(solution.route_count(), 1);
    let route = solution.routes().first().expect("one route");
    assert_eq!(route.reload_count(), 1);
    let record = solution.to_record();
    let mut customers: Vec<usize> = record.nodes.iter().copied().filter(|id| *id != 0).collect();
    customers.sort_unstable();
    assert_eq!(customers, vec![1, 2, 3]);
}

#[rstest]
fn tight_shift_needs_several_vehicles() {
    let mut instance = four_nodes();
    instance.travel_time = 5;

    let solution = solve(&instance, &bounded()).expect("solve should succeed");
    assert!(solution.route_count() >= 2);
    for route in solution.routes() {
        assert_eq!(route.reload_count(), 0);
    }
}

#[rstest]
fn depot_only_instance_has_no_routes() {
    let instance = InstanceBuilder::uniform(&[0], 1).build();
    let solution = solve(&instance, &bounded()).expect("nothing to serve");
    assert_eq!(solution.route_count(), 0);
}

#[rstest]
fn greedy_descent_stops_at_first_optimum() {
    let instance = four_nodes();
    let mut parameters = SearchParameters::new(Duration::from_secs(5));
    parameters.metaheuristic = LocalSearchMetaheuristic::GreedyDescent;

    let solution = solve_with_parameters(&instance, &GlsSolver::new(), &parameters)
        .expect("solve should succeed");
    assert_eq!(solution.route_count(), 1);
}

#[rstest]
fn same_seed_gives_same_assignment() {
    let instance = InstanceBuilder::uniform(&[0, 3, 4, 5, 2, 6, 1], 3)
        .capacity(9)
        .travel(1, 4, 1)
        .travel(4, 1, 1)
        .travel(2, 5, 1)
        .timeout(5.0)
        .build();
    let graph = AugmentedGraph::build(&instance);
    let model = RoutingModel::new(&graph, &instance);
    let parameters = SearchParameters::new(Duration::from_secs(5));

    let first = bounded().solve(&model, &parameters).expect("feasible");
    let second = bounded().solve(&model, &parameters).expect("feasible");
    assert_eq!(first, second);
}

#[rstest]
fn unused_reloads_stay_out_of_routes() {
    let instance = InstanceBuilder::uniform(&[0, 1, 1, 1], 2)
        .capacity(10)
        .build();
    let graph = AugmentedGraph::build(&instance);
    let model = RoutingModel::new(&graph, &instance);

    let assignment = bounded()
        .solve(&model, &SearchParameters::new(Duration::from_secs(5)))
        .expect("feasible");
    let reloads = assignment
        .routes()
        .iter()
        .flatten()
        .filter(|id| graph.node(**id).is_some_and(|node| node.kind == NodeKind::ReloadVirtual))
        .count();
    assert_eq!(reloads, 0);
}

#[rstest]
fn infeasible_window_reports_no_solution() {
    let instance = InstanceBuilder::uniform(&[0, 1, 1], 10)
        .window(2, 0, 3)
        .timeout(1.0)
        .build();

    let err = solve(&instance, &bounded()).expect_err("window cannot be met");
    assert_eq!(err, SolveError::NoFeasibleSolution);
}

#[rstest]
fn automatic_strategies_are_accepted() {
    let instance = four_nodes();
    let graph = AugmentedGraph::build(&instance);
    let model = RoutingModel::new(&graph, &instance);
    let mut parameters = SearchParameters::new(Duration::from_secs(1));
    parameters.first_solution = FirstSolutionStrategy::Automatic;
    parameters.metaheuristic = LocalSearchMetaheuristic::Automatic;

    assert!(bounded().solve(&model, &parameters).is_ok());
}

#[rstest]
fn default_config_matches_documented_values() {
    let solver = GlsSolver::default();
    assert_eq!(solver.config(), &GlsSolverConfig::default());
    assert_eq!(solver.config().max_iterations, None);
    assert_eq!(solver.config().seed, 0);
}

#[rstest]
#[case(5, 1)]
#[case(12, 7)]
#[case(20, 42)]
fn random_instances_serve_every_customer(#[case] customers: usize, #[case] seed: u64) {
    let instance = crate::test_support::random_instance(customers, seed);

    let solution = solve(&instance, &bounded()).expect("random instances are feasible");
    let served = solution
        .routes()
        .iter()
        .flat_map(|route| &route.stops)
        .filter(|stop| stop.kind == NodeKind::Customer)
        .count();
    assert_eq!(served, customers);
}
