//! Instance builders shared by unit, behaviour and property tests.

use crate::graph::NodeId;
use crate::instance::{Instance, TimeWindow};

/// Window applied to every node by [`InstanceBuilder::uniform`].
pub const WIDE_HORIZON: i64 = 1_000_000;

/// Chainable builder for small, hand-checked instances.
///
/// # Examples
/// ```
/// use replenish_core::test_support::InstanceBuilder;
///
/// let instance = InstanceBuilder::uniform(&[0, 5, 6], 2).capacity(8).build();
/// assert_eq!(instance.capacity, 8);
/// assert_eq!(instance.time_matrix[1][2], 2);
/// assert_eq!(instance.time_matrix[1][1], 0);
/// ```
#[derive(Debug, Clone)]
pub struct InstanceBuilder {
    instance: Instance,
}

impl InstanceBuilder {
    /// Depot at node 0, every off-diagonal travel time equal to `travel`, no
    /// service time and wide windows.
    #[must_use]
    pub fn uniform(demands: &[i64], travel: i64) -> Self {
        let nodes = demands.len();
        let time_matrix = (0..nodes)
            .map(|from| {
                (0..nodes)
                    .map(|to| if from == to { 0 } else { travel })
                    .collect()
            })
            .collect();
        Self {
            instance: Instance {
                demands: demands.to_vec(),
                depot_idx: 0,
                time_matrix,
                time_windows: vec![TimeWindow::new(0, WIDE_HORIZON); nodes],
                service_time: vec![0; nodes],
                capacity: 10,
                travel_time: WIDE_HORIZON,
                timeout: 1.0,
            },
        }
    }

    /// Set the vehicle capacity.
    #[must_use]
    pub const fn capacity(mut self, capacity: i64) -> Self {
        self.instance.capacity = capacity;
        self
    }

    /// Set the maximum route duration.
    #[must_use]
    pub const fn travel_time(mut self, travel_time: i64) -> Self {
        self.instance.travel_time = travel_time;
        self
    }

    /// Replace every window with `[0, latest]`.
    #[must_use]
    pub fn horizon(mut self, latest: i64) -> Self {
        for window in &mut self.instance.time_windows {
            *window = TimeWindow::new(0, latest);
        }
        self
    }

    /// Set one node's window.
    #[must_use]
    pub fn window(mut self, node: NodeId, earliest: i64, latest: i64) -> Self {
        if let Some(window) = self.instance.time_windows.get_mut(node) {
            *window = TimeWindow::new(earliest, latest);
        }
        self
    }

    /// Set one node's service time.
    #[must_use]
    pub fn service_time(mut self, node: NodeId, value: i64) -> Self {
        if let Some(service) = self.instance.service_time.get_mut(node) {
            *service = value;
        }
        self
    }

    /// Set one travel time.
    #[must_use]
    pub fn travel(mut self, from: NodeId, to: NodeId, value: i64) -> Self {
        if let Some(entry) = self
            .instance
            .time_matrix
            .get_mut(from)
            .and_then(|row| row.get_mut(to))
        {
            *entry = value;
        }
        self
    }

    /// Replace the whole travel-time matrix.
    #[must_use]
    pub fn matrix(mut self, time_matrix: Vec<Vec<i64>>) -> Self {
        self.instance.time_matrix = time_matrix;
        self
    }

    /// Set the solve budget in seconds.
    #[must_use]
    pub const fn timeout(mut self, seconds: f64) -> Self {
        self.instance.timeout = seconds;
        self
    }

    /// Finish building. The result is not validated.
    #[must_use]
    pub fn build(self) -> Instance {
        self.instance
    }
}
