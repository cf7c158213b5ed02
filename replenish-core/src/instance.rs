//! Problem instances and their structural validation.
//!
//! An [`Instance`] is the aggregate handed to the solve pipeline by the I/O
//! layer. Field names follow the JSON wire format so the same type decodes
//! request files directly when the `serde` feature is enabled.

use std::time::Duration;

use crate::error::InstanceError;
use crate::graph::NodeId;

/// Inclusive interval during which a customer may be served.
///
/// On the wire a window is a two-element array `[earliest, latest]`.
///
/// # Examples
/// ```
/// use replenish_core::TimeWindow;
///
/// let window = TimeWindow::new(10, 20);
/// assert!(window.contains(10));
/// assert!(window.contains(20));
/// assert!(!window.contains(21));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(from = "(i64, i64)", into = "(i64, i64)")
)]
pub struct TimeWindow {
    /// Earliest admissible time.
    pub earliest: i64,
    /// Latest admissible time.
    pub latest: i64,
}

impl TimeWindow {
    /// Construct a window without checking its orientation.
    ///
    /// Inverted windows are reported by [`Instance::validate`].
    #[must_use]
    pub const fn new(earliest: i64, latest: i64) -> Self {
        Self { earliest, latest }
    }

    /// Return whether `time` lies inside the window, bounds included.
    #[must_use]
    pub const fn contains(&self, time: i64) -> bool {
        self.earliest <= time && time <= self.latest
    }

    /// Return whether the window closes before it opens.
    #[must_use]
    pub const fn is_inverted(&self) -> bool {
        self.earliest > self.latest
    }
}

impl From<(i64, i64)> for TimeWindow {
    fn from((earliest, latest): (i64, i64)) -> Self {
        Self::new(earliest, latest)
    }
}

impl From<TimeWindow> for (i64, i64) {
    fn from(window: TimeWindow) -> Self {
        (window.earliest, window.latest)
    }
}

/// A capacitated routing instance with time windows.
///
/// All per-node arrays are indexed by node id; the depot is the node at
/// `depot_idx`. Times share one integer unit, chosen by the caller.
///
/// # Examples
/// ```
/// use replenish_core::{Instance, TimeWindow};
///
/// let instance = Instance {
///     demands: vec![0, 3],
///     depot_idx: 0,
///     time_matrix: vec![vec![0, 4], vec![4, 0]],
///     time_windows: vec![TimeWindow::new(0, 100), TimeWindow::new(0, 50)],
///     service_time: vec![0, 1],
///     capacity: 5,
///     travel_time: 60,
///     timeout: 1.0,
/// };
/// assert!(instance.validate().is_ok());
/// assert_eq!(instance.node_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Instance {
    /// Demand per node; the depot entry must be zero.
    pub demands: Vec<i64>,
    /// Index of the depot node.
    pub depot_idx: usize,
    /// Square matrix of travel times, `time_matrix[from][to]`.
    pub time_matrix: Vec<Vec<i64>>,
    /// Service window per node. The depot's window is never enforced.
    pub time_windows: Vec<TimeWindow>,
    /// Service duration per node, charged when leaving the node.
    pub service_time: Vec<i64>,
    /// Per-vehicle carrying capacity.
    pub capacity: i64,
    /// Maximum duration of a single route.
    pub travel_time: i64,
    /// Wall-clock solve budget in seconds.
    pub timeout: f64,
}

impl Instance {
    /// Number of real nodes, depot included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.demands.len()
    }

    /// Per-vehicle carrying capacity.
    #[must_use]
    pub const fn vehicle_capacity(&self) -> i64 {
        self.capacity
    }

    /// Upper bound on the elapsed time of any route.
    #[must_use]
    pub const fn max_route_duration(&self) -> i64 {
        self.travel_time
    }

    /// Sum of all demands, saturating on overflow.
    #[must_use]
    pub fn total_demand(&self) -> i64 {
        self.demands
            .iter()
            .fold(0_i64, |total, demand| total.saturating_add(*demand))
    }

    /// Solve budget as a [`Duration`].
    ///
    /// # Errors
    ///
    /// Returns [`InstanceError::InvalidTimeout`] when `timeout` is not a
    /// positive, finite, representable number of seconds.
    pub fn time_budget(&self) -> Result<Duration, InstanceError> {
        if !self.timeout.is_finite() || self.timeout <= 0.0 {
            return Err(InstanceError::InvalidTimeout(self.timeout));
        }
        Duration::try_from_secs_f64(self.timeout)
            .map_err(|_| InstanceError::InvalidTimeout(self.timeout))
    }

    /// Check the instance for structural and semantic consistency.
    ///
    /// Checks run in a fixed order and the first violation is reported:
    /// array shapes first, then the depot, then per-node values, then the
    /// scalar parameters.
    ///
    /// A valid instance is handed back unchanged so callers can chain on it.
    ///
    /// # Errors
    ///
    /// Returns the first [`InstanceError`] found.
    ///
    /// # Examples
    /// ```
    /// use replenish_core::{Instance, InstanceError, TimeWindow};
    ///
    /// let instance = Instance {
    ///     demands: vec![2, 3],
    ///     depot_idx: 0,
    ///     time_matrix: vec![vec![0, 4], vec![4, 0]],
    ///     time_windows: vec![TimeWindow::new(0, 100); 2],
    ///     service_time: vec![0, 0],
    ///     capacity: 5,
    ///     travel_time: 60,
    ///     timeout: 1.0,
    /// };
    /// assert_eq!(instance.validate(), Err(InstanceError::DepotDemand { demand: 2 }));
    /// ```
    pub fn validate(&self) -> Result<&Self, InstanceError> {
        self.validate_shape()?;
        self.validate_values()?;
        if self.capacity <= 0 {
            return Err(InstanceError::NonPositiveCapacity(self.capacity));
        }
        if self.travel_time <= 0 {
            return Err(InstanceError::NonPositiveRouteDuration(self.travel_time));
        }
        self.time_budget().map(|_| self)
    }

    fn validate_shape(&self) -> Result<(), InstanceError> {
        let nodes = self.node_count();
        if nodes == 0 {
            return Err(InstanceError::Empty);
        }
        if self.depot_idx >= nodes {
            return Err(InstanceError::DepotOutOfRange {
                depot: self.depot_idx,
                nodes,
            });
        }
        if self.time_matrix.len() != nodes {
            return Err(InstanceError::MatrixRowCount {
                expected: nodes,
                found: self.time_matrix.len(),
            });
        }
        if let Some((row, entries)) = self
            .time_matrix
            .iter()
            .enumerate()
            .find(|(_, entries)| entries.len() != nodes)
        {
            return Err(InstanceError::MatrixRowLength {
                row,
                expected: nodes,
                found: entries.len(),
            });
        }
        if self.time_windows.len() != nodes {
            return Err(InstanceError::TimeWindowCount {
                expected: nodes,
                found: self.time_windows.len(),
            });
        }
        if self.service_time.len() != nodes {
            return Err(InstanceError::ServiceTimeCount {
                expected: nodes,
                found: self.service_time.len(),
            });
        }
        Ok(())
    }

    fn validate_values(&self) -> Result<(), InstanceError> {
        let depot_demand = self.demands.get(self.depot_idx).copied().unwrap_or(0);
        if depot_demand != 0 {
            return Err(InstanceError::DepotDemand {
                demand: depot_demand,
            });
        }
        if let Some((node, demand)) = first_negative(&self.demands) {
            return Err(InstanceError::NegativeDemand { node, demand });
        }
        for (from, row) in self.time_matrix.iter().enumerate() {
            if let Some((to, value)) = first_negative(row) {
                return Err(InstanceError::NegativeTravelTime { from, to, value });
            }
        }
        if let Some((node, value)) = first_negative(&self.service_time) {
            return Err(InstanceError::NegativeServiceTime { node, value });
        }
        if let Some((node, window)) = self
            .time_windows
            .iter()
            .enumerate()
            .find(|(_, window)| window.is_inverted())
        {
            return Err(InstanceError::InvertedTimeWindow {
                node,
                earliest: window.earliest,
                latest: window.latest,
            });
        }
        Ok(())
    }
}

fn first_negative(values: &[i64]) -> Option<(NodeId, i64)> {
    values
        .iter()
        .copied()
        .enumerate()
        .find(|(_, value)| *value < 0)
}
