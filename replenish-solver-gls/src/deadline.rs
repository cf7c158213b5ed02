//! Wall-clock stop condition.

use std::time::{Duration, Instant};

/// Point in time after which the search stops.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    /// Expire `budget` from now. A budget too large to represent never
    /// expires.
    pub(crate) fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now().checked_add(budget),
        }
    }

    pub(crate) fn expired(&self) -> bool {
        self.at.is_some_and(|at| Instant::now() >= at)
    }
}
