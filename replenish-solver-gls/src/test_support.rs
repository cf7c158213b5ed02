//! Test-only utilities for `replenish-solver-gls`.
//!
//! The helpers in this module are available to unit tests, behavioural
//! tests and benchmarks. They are gated behind the `test-support` feature
//! (and `cfg(test)`).

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use replenish_core::{Instance, TimeWindow};

/// Side of the square grid customers are scattered on.
const GRID: i64 = 100;

/// Generate a random instance that is always feasible with one vehicle per
/// customer.
///
/// The depot sits at the grid centre and travel times are Manhattan
/// distances. Every window opens by time 200 and stays open for at least
/// 300, which covers the longest direct trip from the depot.
///
/// # Examples
/// ```
/// use replenish_solver_gls::test_support::random_instance;
///
/// let instance = random_instance(12, 42);
/// assert_eq!(instance.demands.len(), 13);
/// assert!(instance.validate().is_ok());
/// ```
#[must_use]
pub fn random_instance(customers: usize, seed: u64) -> Instance {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let centre = (GRID >> 1, GRID >> 1);
    let points: Vec<(i64, i64)> = std::iter::once(centre)
        .chain((0..customers).map(|_| (rng.gen_range(0..=GRID), rng.gen_range(0..=GRID))))
        .collect();

    let time_matrix = points
        .iter()
        .map(|from| {
            points
                .iter()
                .map(|to| (from.0 - to.0).abs() + (from.1 - to.1).abs())
                .collect()
        })
        .collect();

    let mut demands = vec![0];
    let mut time_windows = vec![TimeWindow::new(0, 10_000)];
    let mut service_time = vec![0];
    for _ in 0..customers {
        demands.push(rng.gen_range(1..=5));
        let earliest = rng.gen_range(0..=200);
        time_windows.push(TimeWindow::new(earliest, earliest + rng.gen_range(300..=600)));
        service_time.push(rng.gen_range(0..=10));
    }

    Instance {
        demands,
        depot_idx: 0,
        time_matrix,
        time_windows,
        service_time,
        capacity: 15,
        travel_time: 1_000,
        timeout: 1.0,
    }
}
