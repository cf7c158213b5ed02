//! `GlsSolver`: the default [`SolvingService`].

use replenish_core::{
    Assignment, FirstSolutionStrategy, LocalSearchMetaheuristic, RoutingModel, SearchParameters,
    SolveError, SolvingService,
};

use crate::construct::parallel_cheapest_insertion;
use crate::deadline::Deadline;
use crate::search::{GuidedSearch, Mode, SearchSettings};

/// Configuration for [`GlsSolver`].
#[derive(Debug, Clone, PartialEq)]
pub struct GlsSolverConfig {
    /// Seed for the move scan order.
    pub seed: u64,
    /// Scales the mean arc cost of the first local optimum into the penalty
    /// weight.
    pub lambda_coefficient: f64,
    /// Upper bound on penalty rounds; `None` runs until the deadline.
    pub max_iterations: Option<usize>,
}

impl Default for GlsSolverConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            lambda_coefficient: 0.1,
            max_iterations: None,
        }
    }
}

/// Parallel cheapest insertion followed by guided local search.
///
/// The solver is single-threaded and deterministic for a fixed seed as long
/// as the deadline does not cut the search short.
///
/// # Examples
/// ```
/// use replenish_core::{Instance, TimeWindow, solve};
/// use replenish_solver_gls::GlsSolver;
///
/// let instance = Instance {
///     demands: vec![0, 5, 6, 4],
///     depot_idx: 0,
///     time_matrix: vec![vec![0, 2, 2, 2]; 4],
///     time_windows: vec![TimeWindow::new(0, 100); 4],
///     service_time: vec![0; 4],
///     capacity: 10,
///     travel_time: 100,
///     timeout: 0.2,
/// };
/// let solution = solve(&instance, &GlsSolver::new()).expect("feasible instance");
/// assert_eq!(solution.route_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GlsSolver {
    config: GlsSolverConfig,
}

impl GlsSolver {
    /// Construct a solver using default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(GlsSolverConfig::default())
    }

    /// Construct a solver with explicit configuration.
    #[must_use]
    pub const fn with_config(config: GlsSolverConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &GlsSolverConfig {
        &self.config
    }

    fn settings(&self, parameters: &SearchParameters) -> Result<SearchSettings, SolveError> {
        match parameters.first_solution {
            FirstSolutionStrategy::Automatic | FirstSolutionStrategy::ParallelCheapestInsertion => {}
            other => {
                return Err(SolveError::UnsupportedStrategy(format!(
                    "first solution {other:?}"
                )));
            }
        }
        let mode = match parameters.metaheuristic {
            LocalSearchMetaheuristic::Automatic | LocalSearchMetaheuristic::GuidedLocalSearch => {
                Mode::Guided
            }
            LocalSearchMetaheuristic::GreedyDescent => Mode::Descent,
            other => {
                return Err(SolveError::UnsupportedStrategy(format!(
                    "metaheuristic {other:?}"
                )));
            }
        };
        Ok(SearchSettings {
            mode,
            seed: self.config.seed,
            lambda_coefficient: self.config.lambda_coefficient,
            max_iterations: self.config.max_iterations,
        })
    }
}

impl SolvingService for GlsSolver {
    fn solve(
        &self,
        model: &RoutingModel<'_>,
        parameters: &SearchParameters,
    ) -> Result<Assignment, SolveError> {
        let settings = self.settings(parameters)?;
        let deadline = Deadline::after(parameters.time_limit);
        if model.mandatory_nodes().next().is_none() {
            return Ok(Assignment::empty(model.vehicle_count()));
        }

        let initial = parallel_cheapest_insertion(model, &deadline)?;
        let best = GuidedSearch::new(model, initial, settings.seed).run(&settings, &deadline);
        log::info!(
            "search finished with {} vehicles at cost {}",
            best.used_vehicles(),
            best.total_cost()
        );
        Ok(best.into_assignment())
    }
}

#[cfg(test)]
mod tests;
