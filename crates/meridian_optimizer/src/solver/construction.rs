use tracing::{debug, instrument, Level};

use crate::{
    problem::{job::JobIdx, vehicle::VehicleIdx, VehicleRoutingProblem},
    solver::{
        insertion::{best_insertion, evaluate_route},
        output::UnassignedReason,
        solution::{solution_state::SolutionState, working_solution::WorkingSolution},
    },
};

/// Vehicles in seeding order: earliest availability first, then the largest
/// capacity, then the broadest skill set, ties broken by vehicle id.
pub fn vehicle_order(problem: &VehicleRoutingProblem) -> Vec<VehicleIdx> {
    let mut order: Vec<VehicleIdx> = (0..problem.vehicles().len()).map(VehicleIdx::new).collect();
    order.sort_by_key(|&v| {
        let vehicle = problem.vehicle(v);
        let capacity: i64 = (0..vehicle.capacity().len())
            .map(|i| vehicle.capacity().get(i))
            .sum();
        (
            vehicle.time_window().start,
            std::cmp::Reverse(capacity),
            std::cmp::Reverse(vehicle.skills().len()),
            vehicle.id(),
        )
    });
    order
}

/// Unassigned jobs ordered by external job id, the documented tie-break for
/// greedy insertion.
fn unassigned_by_id(problem: &VehicleRoutingProblem, state: &SolutionState) -> Vec<JobIdx> {
    let mut jobs = state.sorted_unassigned();
    jobs.sort_by_key(|&job| problem.job(job).id());
    jobs
}

/// Greedy cheapest insertion: for each vehicle in seeding order, repeatedly
/// insert the (job, rank) pair with the smallest cost delta until nothing
/// more fits. Works both for initial construction and for re-insertion after
/// a ruin step. Leftover jobs get their last-observed blocking reason.
#[instrument(skip_all, level = Level::DEBUG)]
pub fn greedy_fill(
    problem: &VehicleRoutingProblem,
    solution: &mut WorkingSolution,
    state: &mut SolutionState,
) {
    for vehicle in vehicle_order(problem) {
        loop {
            let mut best: Option<(JobIdx, usize, i64)> = None;

            for job in unassigned_by_id(problem, state) {
                if let Ok((rank, cost)) = evaluate_route(problem, solution, state, vehicle, job) {
                    if best.is_none_or(|(_, _, best_cost)| cost < best_cost) {
                        best = Some((job, rank, cost));
                    }
                }
            }

            let Some((job, rank, _)) = best else {
                break;
            };

            solution.route_mut(vehicle).insert(problem, rank, job);
            state.set_assigned(job);
            state.update_route(problem, solution, vehicle);
        }
    }

    record_unassigned_reasons(problem, solution, state);

    debug!(
        assigned = solution.assigned_count(),
        unassigned = state.unassigned().len(),
        "greedy fill done"
    );
}

/// Stores the blocking reason for every currently unassigned job without
/// touching the routes.
pub fn record_unassigned_reasons(
    problem: &VehicleRoutingProblem,
    solution: &WorkingSolution,
    state: &mut SolutionState,
) {
    let vehicles: Vec<VehicleIdx> = (0..problem.vehicles().len()).map(VehicleIdx::new).collect();

    for job in state.sorted_unassigned() {
        if let Err(reason) = best_insertion(problem, solution, state, job, &vehicles) {
            state.set_unassigned_reason(job, reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        problem::{amount::Amount, time_window::TimeWindow, vehicle::VehicleBuilder},
        test_utils::{self, route_jobs},
    };

    #[test]
    fn test_greedy_fill_routes_everything_when_possible() {
        let problem = test_utils::line_problem(&[1, 1, 1], 0, None, None);
        let mut solution = WorkingSolution::new(&problem);
        let mut state = SolutionState::new(&problem);

        greedy_fill(&problem, &mut solution, &mut state);

        assert!(state.unassigned().is_empty());
        assert_eq!(route_jobs(&solution, 0).len(), 3);
    }

    #[test]
    fn test_greedy_fill_respects_capacity() {
        let jobs = vec![
            {
                let mut b = crate::problem::job::JobBuilder::default();
                b.set_id(1);
                b.set_location_index(1);
                b.set_amount(Amount::from_vec(vec![3]));
                b.build()
            },
            {
                let mut b = crate::problem::job::JobBuilder::default();
                b.set_id(2);
                b.set_location_index(2);
                b.set_amount(Amount::from_vec(vec![3]));
                b.build()
            },
        ];

        let mut b = VehicleBuilder::default();
        b.set_id(0);
        b.set_start_index(0);
        b.set_end_index(0);
        b.set_capacity(Amount::from_vec(vec![5]));
        let vehicle = b.build();

        let problem = test_utils::custom_problem(
            vec![vec![0, 1, 2], vec![1, 0, 1], vec![2, 1, 0]],
            jobs,
            vec![vehicle],
        );

        let mut solution = WorkingSolution::new(&problem);
        let mut state = SolutionState::new(&problem);
        greedy_fill(&problem, &mut solution, &mut state);

        assert_eq!(solution.assigned_count(), 1);
        let leftover = state.sorted_unassigned()[0];
        assert_eq!(
            state.unassigned_reason(leftover),
            Some(UnassignedReason::CapacityExceeded)
        );
    }

    #[test]
    fn test_vehicle_order_prefers_early_and_large() {
        let mut b = VehicleBuilder::default();
        b.set_id(0);
        b.set_start_index(0);
        b.set_time_window(TimeWindow::new(100, 1000));
        let late = b.build();

        let mut b = VehicleBuilder::default();
        b.set_id(1);
        b.set_start_index(0);
        b.set_time_window(TimeWindow::new(0, 1000));
        let early_small = b.build();

        let mut b = VehicleBuilder::default();
        b.set_id(2);
        b.set_start_index(0);
        b.set_time_window(TimeWindow::new(0, 1000));
        b.set_capacity(Amount::from_vec(vec![10]));
        let early_large = b.build();

        let problem = test_utils::custom_problem(
            vec![vec![0, 1], vec![1, 0]],
            vec![test_utils::basic_job(1, 1)],
            vec![late, early_small, early_large],
        );

        assert_eq!(
            vehicle_order(&problem),
            vec![VehicleIdx::new(2), VehicleIdx::new(1), VehicleIdx::new(0)]
        );
    }
}
