pub mod random;
pub mod related;

use rand::RngCore;

use crate::{
    problem::{job::JobIdx, vehicle::VehicleIdx, VehicleRoutingProblem},
    solver::solution::{solution_state::SolutionState, working_solution::WorkingSolution},
};

pub struct RuinContext<'a, R>
where
    R: RngCore,
{
    pub problem: &'a VehicleRoutingProblem,
    pub rng: &'a mut R,
    pub nb_to_remove: usize,
}

/// All assigned jobs in route order, with their current vehicle.
pub(crate) fn assigned_jobs(solution: &WorkingSolution) -> Vec<(VehicleIdx, JobIdx)> {
    solution
        .routes()
        .iter()
        .flat_map(|route| route.jobs().iter().map(|&job| (route.vehicle(), job)))
        .collect()
}

/// Removes the given jobs from their routes, marks them unassigned and
/// refreshes the state entries of every touched vehicle.
pub(crate) fn remove_jobs(
    problem: &VehicleRoutingProblem,
    solution: &mut WorkingSolution,
    state: &mut SolutionState,
    victims: &[JobIdx],
) {
    let mut touched: Vec<VehicleIdx> = Vec::new();

    for &job in victims {
        let Some((vehicle, rank)) = solution.route_of_job(job) else {
            continue;
        };
        // Dropping a job can break the end-of-route bound when the return
        // leg grows; such victims stay in place.
        if !solution.route(vehicle).is_valid_addition_for_tw(
            problem,
            std::iter::empty(),
            rank,
            rank + 1,
        ) {
            continue;
        }
        solution.route_mut(vehicle).remove(problem, rank);
        state.set_unassigned(job);
        touched.push(vehicle);
    }

    touched.sort_unstable();
    touched.dedup();
    for vehicle in touched {
        state.update_route(problem, solution, vehicle);
    }
}
