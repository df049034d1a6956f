use crate::{
    problem::{job::JobIdx, vehicle::VehicleIdx, Gain, VehicleRoutingProblem},
    solver::{
        output::UnassignedReason,
        solution::{solution_state::SolutionState, working_solution::WorkingSolution},
    },
};

/// A fully determined insertion of one unassigned job.
#[derive(Debug, Clone, Copy)]
pub struct Insertion {
    pub vehicle: VehicleIdx,
    pub rank: usize,
    pub job: JobIdx,
    /// Cost delta of performing the insertion (non-negative for metric
    /// matrices, but not assumed so).
    pub cost: Gain,
}

/// Why a job could not enter a route; the most specific failed check wins.
fn static_blocker(
    problem: &VehicleRoutingProblem,
    vehicle: VehicleIdx,
    job: JobIdx,
) -> UnassignedReason {
    let v = problem.vehicle(vehicle);
    let j = problem.job(job);

    if !j.skills().is_subset_of(v.skills()) {
        UnassignedReason::SkillMismatch
    } else if !j.amount().fits_in(v.capacity()) {
        UnassignedReason::CapacityExceeded
    } else if v
        .start_index()
        .is_some_and(|s| !problem.matrix().is_reachable(s, j.location_index()))
        || v.end_index()
            .is_some_and(|e| !problem.matrix().is_reachable(j.location_index(), e))
    {
        UnassignedReason::UnreachableLocation
    } else {
        UnassignedReason::TimeWindowInfeasible
    }
}

/// Cheapest feasible rank for `job` in the route of `vehicle`, or the reason
/// blocking it.
pub fn evaluate_route(
    problem: &VehicleRoutingProblem,
    solution: &WorkingSolution,
    state: &SolutionState,
    vehicle: VehicleIdx,
    job: JobIdx,
) -> Result<(usize, Gain), UnassignedReason> {
    if !problem.vehicle_ok_with_job(vehicle, job) {
        return Err(static_blocker(problem, vehicle, job));
    }

    let mut amount = state.route_amount(vehicle);
    amount += problem.job(job).amount();
    if !amount.fits_in(problem.vehicle(vehicle).capacity()) {
        return Err(UnassignedReason::CapacityExceeded);
    }

    let route = solution.route(vehicle);
    let location = problem.job_location(job);
    let mut best: Option<(usize, Gain)> = None;

    for rank in 0..=route.len() {
        let previous = route.previous_index(problem, rank);
        let next = route.insertion_next_index(problem, rank);
        let delta = problem.cost_or_zero(previous, Some(location))
            + problem.cost_or_zero(Some(location), next)
            - problem.cost_or_zero(previous, next);

        if best.is_some_and(|(_, cost)| cost <= delta) {
            continue;
        }

        if route.is_valid_addition_for_tw(problem, std::iter::once(job), rank, rank) {
            best = Some((rank, delta));
        }
    }

    best.ok_or(UnassignedReason::TimeWindowInfeasible)
}

/// Cheapest feasible insertion of `job` across the given vehicles, plus the
/// last-observed blocking reason when none exists.
pub fn best_insertion(
    problem: &VehicleRoutingProblem,
    solution: &WorkingSolution,
    state: &SolutionState,
    job: JobIdx,
    vehicles: &[VehicleIdx],
) -> Result<Insertion, UnassignedReason> {
    let mut best: Option<Insertion> = None;
    let mut blocker = UnassignedReason::TimeWindowInfeasible;

    for &vehicle in vehicles {
        match evaluate_route(problem, solution, state, vehicle, job) {
            Ok((rank, cost)) => {
                if best.is_none_or(|b| cost < b.cost) {
                    best = Some(Insertion {
                        vehicle,
                        rank,
                        job,
                        cost,
                    });
                }
            }
            Err(reason) => blocker = reason,
        }
    }

    best.ok_or(blocker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    #[test]
    fn test_evaluate_route_picks_cheapest_rank() {
        let problem = test_utils::line_problem(&[1, 1, 1], 0, None, None);
        let (solution, state) = test_utils::solution_with_routes(&problem, &[&[0, 2]]);

        // Job 1 (location 2) belongs between jobs 0 and 2.
        let (rank, cost) =
            evaluate_route(&problem, &solution, &state, VehicleIdx::new(0), JobIdx::new(1))
                .unwrap();

        assert_eq!(rank, 1);
        assert_eq!(cost, 0);
    }

    #[test]
    fn test_evaluate_route_reports_capacity_blocker() {
        let problem = test_utils::line_problem_with_amounts(&[1, 1], &[3, 3]);
        // Capacity is 6; with both jobs routed nothing more fits.
        let (solution, state) = test_utils::solution_with_routes(&problem, &[&[0, 1]]);

        let result =
            evaluate_route(&problem, &solution, &state, VehicleIdx::new(0), JobIdx::new(0));
        // Job 0 is already routed; re-evaluating it trips the load check.
        assert_eq!(result, Err(UnassignedReason::CapacityExceeded));
    }

    #[test]
    fn test_evaluate_route_reports_tw_blocker() {
        let problem = test_utils::line_problem(&[1, 1], 60, Some((0, 50)), None);
        let (solution, state) = test_utils::solution_with_routes(&problem, &[&[0]]);

        // Job 1 can only start within [0, 50] but following job 0 it would
        // start at 62 at best, and preceding it would push job 0 past 50.
        let result =
            evaluate_route(&problem, &solution, &state, VehicleIdx::new(0), JobIdx::new(1));
        assert_eq!(result, Err(UnassignedReason::TimeWindowInfeasible));
    }
}
