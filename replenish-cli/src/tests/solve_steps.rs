//! Behaviour-driven step definitions driving the replenish CLI scenarios.

use super::helpers::{reload_instance, temp_root, write_instance, write_utf8};
use super::*;
use camino::Utf8PathBuf;
use replenish_core::{
    Assignment, InstanceError, RoutingModel, SearchParameters, SolutionRecord, SolveError,
    SolvingService,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use std::collections::HashMap;
use tempfile::TempDir;

#[derive(Debug)]
struct SolveWorld {
    _tmp: TempDir,
    request_path: Utf8PathBuf,
    include_request: RefCell<bool>,
    infeasible: RefCell<bool>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl SolveWorld {
    fn new() -> Self {
        let (tmp, root) = temp_root();
        Self {
            _tmp: tmp,
            request_path: root.join("instance.json"),
            include_request: RefCell::new(true),
            infeasible: RefCell::new(false),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn build_command_line(&self) -> Vec<String> {
        let mut argv = vec!["replenish".to_string()];
        if *self.include_request.borrow() {
            argv.push(self.request_path.as_str().to_string());
        }
        argv.extend([format!("--{ARG_MAX_ITERATIONS}"), "20".to_string()]);
        argv
    }

    fn expect_error(&self) -> CliError {
        self.result
            .replace(None)
            .expect("result recorded")
            .expect_err("expected error")
    }
}

#[fixture]
fn world() -> SolveWorld {
    SolveWorld::new()
}

struct InfeasibleService;

impl SolvingService for InfeasibleService {
    fn solve(
        &self,
        _model: &RoutingModel<'_>,
        _parameters: &SearchParameters,
    ) -> Result<Assignment, SolveError> {
        Err(SolveError::NoFeasibleSolution)
    }
}

struct InfeasibleBuilder;

impl SolverBuilder for InfeasibleBuilder {
    fn build(&self, _config: &SolveConfig) -> Box<dyn SolvingService> {
        Box::new(InfeasibleService)
    }
}

#[given("a reloading instance exists on disk")]
fn reloading_instance_exists(#[from(world)] world: &SolveWorld) {
    write_instance(&world.request_path, &reload_instance());
}

#[given("the instance file contains invalid JSON")]
fn instance_contains_invalid_json(#[from(world)] world: &SolveWorld) {
    write_utf8(&world.request_path, b"{ not valid json");
}

#[given("I omit the instance path")]
fn omit_instance_path(#[from(world)] world: &SolveWorld) {
    *world.include_request.borrow_mut() = false;
}

#[given("an instance whose depot demands {demand} units exists on disk")]
fn depot_demand_instance_exists(#[from(world)] world: &SolveWorld, demand: i64) {
    let mut instance = reload_instance();
    if let Some(slot) = instance.demands.first_mut() {
        *slot = demand;
    }
    write_instance(&world.request_path, &instance);
}

#[given("the solver cannot find a solution")]
fn solver_cannot_find_solution(#[from(world)] world: &SolveWorld) {
    *world.infeasible.borrow_mut() = true;
}

#[when("I run the replenish command")]
fn run_replenish_command(#[from(world)] world: &SolveWorld) {
    let invocation = world.build_command_line();
    let outcome = SolveArgs::try_parse_from(invocation)
        .map_err(CliError::from)
        .and_then(|args| {
            let mut buffer = world.stdout.borrow_mut();
            if *world.infeasible.borrow() {
                run_solve_with(args, &InfeasibleBuilder, &mut *buffer)
            } else {
                run_solve_with(args, &DefaultSolverBuilder, &mut *buffer)
            }
        });
    world.result.replace(Some(outcome));
}

#[then("the command succeeds and prints the solution record")]
fn command_succeeds(#[from(world)] world: &SolveWorld) {
    let borrowed = world.result.borrow();
    let result = borrowed.as_ref().expect("result recorded");
    assert!(result.is_ok(), "expected success, found {result:?}");

    let stdout = String::from_utf8(world.stdout.borrow().clone()).expect("stdout utf-8");
    let record: SolutionRecord = serde_json::from_str(&stdout).expect("output should be JSON");
    assert_eq!(record.nodes.len(), record.vehicles.len());
    assert_eq!(record.nodes.len(), record.time.len());
}

#[then("every customer appears once in the record")]
fn every_customer_once(#[from(world)] world: &SolveWorld) {
    let stdout = String::from_utf8(world.stdout.borrow().clone()).expect("stdout utf-8");
    let record: SolutionRecord = serde_json::from_str(&stdout).expect("output should be JSON");
    let mut visits: HashMap<usize, usize> = HashMap::new();
    for node in record.nodes.iter().filter(|node| **node != 0) {
        *visits.entry(*node).or_default() += 1;
    }
    assert_eq!(visits.len(), 3);
    assert!(visits.values().all(|count| *count == 1));
}

#[then("the command fails because the instance JSON is invalid")]
fn command_fails_invalid_json(#[from(world)] world: &SolveWorld) {
    match world.expect_error() {
        CliError::ParseInstance { .. } => {}
        other => panic!("expected ParseInstance, found {other:?}"),
    }
}

#[then("the command fails because the instance path is missing")]
fn command_fails_missing_path(#[from(world)] world: &SolveWorld) {
    match world.expect_error() {
        CliError::MissingArgument { field, .. } => assert_eq!(field, ARG_REQUEST),
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[then("the command fails because the instance is invalid")]
fn command_fails_invalid_instance(#[from(world)] world: &SolveWorld) {
    match world.expect_error() {
        CliError::Solve {
            source: SolveError::InvalidInstance(InstanceError::DepotDemand { demand }),
        } => assert_eq!(demand, 3),
        other => panic!("expected an invalid instance, found {other:?}"),
    }
}

#[then("the command fails because no feasible solution exists")]
fn command_fails_infeasible(#[from(world)] world: &SolveWorld) {
    match world.expect_error() {
        CliError::Solve {
            source: SolveError::NoFeasibleSolution,
        } => {}
        other => panic!("expected NoFeasibleSolution, found {other:?}"),
    }
}

macro_rules! register_solve_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/solve_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: SolveWorld) {
            let _ = world;
        }
    };
}

register_solve_scenario!(solve_happy_path, "solving an instance from JSON");
register_solve_scenario!(solve_invalid_json, "rejecting invalid JSON input");
register_solve_scenario!(solve_missing_path, "rejecting missing instance paths");
register_solve_scenario!(solve_invalid_instance, "rejecting inconsistent instances");
register_solve_scenario!(solve_infeasible, "reporting an infeasible instance");
