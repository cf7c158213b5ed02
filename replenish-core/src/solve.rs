//! The end-to-end solve pipeline.

use crate::decode::{Solution, decode};
use crate::error::SolveError;
use crate::graph::AugmentedGraph;
use crate::instance::Instance;
use crate::model::RoutingModel;
use crate::service::{SearchParameters, SolvingService};

/// Validate `instance`, model it, run `service` and decode the result.
///
/// The stages run strictly in sequence. A rejected instance never reaches
/// the service.
///
/// # Errors
///
/// Returns [`SolveError::InvalidInstance`] for a malformed instance, or
/// whatever the service or decoder reports.
pub fn solve<S>(instance: &Instance, service: &S) -> Result<Solution, SolveError>
where
    S: SolvingService + ?Sized,
{
    let parameters = SearchParameters::new(instance.validate()?.time_budget()?);
    solve_with_parameters(instance, service, &parameters)
}

/// Like [`solve`], with caller-chosen search parameters.
///
/// # Errors
///
/// As for [`solve`].
pub fn solve_with_parameters<S>(
    instance: &Instance,
    service: &S,
    parameters: &SearchParameters,
) -> Result<Solution, SolveError>
where
    S: SolvingService + ?Sized,
{
    let graph = AugmentedGraph::build(instance.validate()?);
    let model = RoutingModel::new(&graph, instance);
    log::debug!(
        "solving {} customers with {} vehicle slots in {:?}",
        graph.customers().count(),
        model.vehicle_count(),
        parameters.time_limit
    );
    let assignment = service.solve(&model, parameters)?;
    let solution = decode(&model, &assignment)?;
    log::info!(
        "solved: {} routes, total cost {}",
        solution.route_count(),
        solution.total_cost()
    );
    Ok(solution)
}
