pub mod cross_exchange;
pub mod exchange;
pub mod intra_cross_exchange;
pub mod intra_exchange;
pub mod intra_mixed_exchange;
pub mod intra_or_opt;
pub mod intra_relocate;
pub mod local_search;
pub mod mixed_exchange;
pub mod r#move;
pub mod or_opt;
pub mod relocate;
pub mod reverse_two_opt;
pub mod two_opt;

use crate::problem::{job::JobIdx, Gain, VehicleRoutingProblem};

/// Total cost of the path `previous -> jobs... -> next`, with missing
/// endpoints (open route sides) contributing nothing.
pub(crate) fn chain_cost<I>(
    problem: &VehicleRoutingProblem,
    previous: Option<usize>,
    jobs: I,
    next: Option<usize>,
) -> Gain
where
    I: Iterator<Item = JobIdx>,
{
    let mut cost = 0;
    let mut current = previous;

    for job in jobs {
        let location = problem.job_location(job);
        cost += problem.cost_or_zero(current, Some(location));
        current = Some(location);
    }

    cost + problem.cost_or_zero(current, next)
}
