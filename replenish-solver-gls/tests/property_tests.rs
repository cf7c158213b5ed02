//! Property-based tests for the GLS solver.
//!
//! These tests use `proptest` to assert invariants that must hold for every
//! feasible instance, complementing the behavioural scenarios.
//!
//! # Invariants tested
//!
//! - **Coverage:** every customer is served exactly once, depot at both ends.
//! - **Capacity:** load since the last reload never exceeds capacity.
//! - **Schedule:** arrival bounds sit in windows; routes respect the cap.
//! - **Reload placement:** reloads only ever sit between two customers.
//! - **Repeatability:** re-solving the same instance succeeds every time.


use proptest::prelude::*;
use replenish_core::solve;
use replenish_solver_gls::{GlsSolver, GlsSolverConfig};

use proptest_support::{
    assert_capacity_respected, assert_customers_served_once, assert_reloads_well_placed,
    assert_schedule_respected, instance_strategy,
};

fn solver(seed: u64) -> GlsSolver {
    GlsSolver::with_config(GlsSolverConfig {
        seed,
        max_iterations: Some(5),
        ..GlsSolverConfig::default()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Property: decoded solutions satisfy every routing constraint.
    #[test]
    fn solutions_respect_all_constraints(
        seed in any::<u64>(),
        instance in instance_strategy(1, 7),
    ) {
        let solution = solve(&instance, &solver(seed)).expect("generated instances are feasible");

        assert_customers_served_once(&instance, &solution)?;
        assert_capacity_respected(&instance, &solution)?;
        assert_schedule_respected(&instance, &solution)?;
        assert_reloads_well_placed(&solution)?;
    }

    /// Property: the output record has parallel arrays with contiguous
    /// vehicle numbers.
    #[test]
    fn record_arrays_are_parallel(
        instance in instance_strategy(1, 6),
    ) {
        let solution = solve(&instance, &solver(0)).expect("generated instances are feasible");
        let record = solution.to_record();

        prop_assert_eq!(record.nodes.len(), record.vehicles.len());
        prop_assert_eq!(record.nodes.len(), record.time.len());
        let mut expected = 0_usize;
        for pair in record.vehicles.windows(2) {
            if let [previous, next] = pair {
                prop_assert!(*next == *previous || *next == previous + 1);
            }
        }
        if let Some(last) = record.vehicles.last() {
            expected = last + 1;
        }
        prop_assert_eq!(expected, solution.route_count());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    /// Property: solving the same instance twice succeeds both times.
    #[test]
    fn re_solving_stays_feasible(
        instance in instance_strategy(2, 6),
    ) {
        let first = solve(&instance, &solver(11));
        let second = solve(&instance, &solver(11));

        prop_assert!(first.is_ok(), "first solve failed: {:?}", first);
        prop_assert!(second.is_ok(), "second solve failed: {:?}", second);
    }
}
