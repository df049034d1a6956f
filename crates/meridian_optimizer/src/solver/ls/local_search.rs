use tracing::{debug, instrument, Level};

use crate::{
    problem::{vehicle::VehicleIdx, Gain, VehicleRoutingProblem},
    solver::{
        insertion::evaluate_route,
        ls::{
            cross_exchange::CrossExchangeOperator,
            exchange::ExchangeOperator,
            intra_cross_exchange::IntraCrossExchangeOperator,
            intra_exchange::IntraExchangeOperator,
            intra_mixed_exchange::IntraMixedExchangeOperator,
            intra_or_opt::IntraOrOptOperator,
            intra_relocate::IntraRelocateOperator,
            mixed_exchange::MixedExchangeOperator,
            or_opt::OrOptOperator,
            r#move::{LocalSearchOperator, LsMove},
            relocate::RelocateOperator,
            reverse_two_opt::ReverseTwoOptOperator,
            two_opt::TwoOptOperator,
        },
        solution::{solution_state::SolutionState, working_solution::WorkingSolution},
    },
};

/// Best-improvement local search: keep applying the single best
/// strictly-improving valid move until no operator family offers one. After
/// each applied move only the state entries named by the operator's
/// `update_candidates` are refreshed, and its `addition_candidates` routes
/// are offered the still-unassigned jobs.
///
/// Total cost is non-increasing across the loop; the equal-gain tie-break is
/// fixed by the enumeration order (operator kind, then source/target ranks).
#[instrument(skip_all, level = Level::DEBUG)]
pub fn run(
    problem: &VehicleRoutingProblem,
    solution: &mut WorkingSolution,
    state: &mut SolutionState,
) -> usize {
    let mut applied = 0;

    while let Some(best) = find_best_move(problem, solution, state) {
        debug!(
            operator = best.operator_name(),
            gain = best.gain(),
            "applying move"
        );

        best.apply(problem, solution);

        let mut touched = best.update_candidates();
        touched.sort_unstable();
        touched.dedup();
        for vehicle in touched {
            state.update_route(problem, solution, vehicle);
        }

        try_job_additions(problem, solution, state, &best.addition_candidates());

        applied += 1;
    }

    applied
}

fn find_best_move(
    problem: &VehicleRoutingProblem,
    solution: &WorkingSolution,
    state: &SolutionState,
) -> Option<LsMove> {
    let mut best: Option<LsMove> = None;
    let mut best_gain: Gain = 0;

    scan_operator::<RelocateOperator, _>(problem, solution, state, &mut best, &mut best_gain, LsMove::Relocate);
    scan_operator::<ExchangeOperator, _>(problem, solution, state, &mut best, &mut best_gain, LsMove::Exchange);
    scan_operator::<OrOptOperator, _>(problem, solution, state, &mut best, &mut best_gain, LsMove::OrOpt);
    scan_operator::<CrossExchangeOperator, _>(problem, solution, state, &mut best, &mut best_gain, LsMove::CrossExchange);
    scan_operator::<MixedExchangeOperator, _>(problem, solution, state, &mut best, &mut best_gain, LsMove::MixedExchange);
    scan_operator::<TwoOptOperator, _>(problem, solution, state, &mut best, &mut best_gain, LsMove::TwoOpt);
    scan_operator::<IntraRelocateOperator, _>(problem, solution, state, &mut best, &mut best_gain, LsMove::IntraRelocate);
    scan_operator::<IntraExchangeOperator, _>(problem, solution, state, &mut best, &mut best_gain, LsMove::IntraExchange);
    scan_operator::<IntraOrOptOperator, _>(problem, solution, state, &mut best, &mut best_gain, LsMove::IntraOrOpt);
    scan_operator::<IntraCrossExchangeOperator, _>(problem, solution, state, &mut best, &mut best_gain, LsMove::IntraCrossExchange);
    scan_operator::<IntraMixedExchangeOperator, _>(problem, solution, state, &mut best, &mut best_gain, LsMove::IntraMixedExchange);
    scan_operator::<ReverseTwoOptOperator, _>(problem, solution, state, &mut best, &mut best_gain, LsMove::ReverseTwoOpt);

    best
}

fn scan_operator<Op, F>(
    problem: &VehicleRoutingProblem,
    solution: &WorkingSolution,
    state: &SolutionState,
    best: &mut Option<LsMove>,
    best_gain: &mut Gain,
    wrap: F,
) where
    Op: LocalSearchOperator,
    F: Fn(Op) -> LsMove,
{
    let nb_routes = solution.routes().len();

    for s_vehicle in 0..nb_routes {
        for t_vehicle in 0..nb_routes {
            Op::generate_moves(
                problem,
                solution,
                state,
                (VehicleIdx::new(s_vehicle), VehicleIdx::new(t_vehicle)),
                |op| {
                    let gain = op.gain();
                    if gain > *best_gain && op.is_valid(problem, solution, state) {
                        *best_gain = gain;
                        *best = Some(wrap(op));
                    }
                },
            );
        }
    }
}

/// After a move freed room in some routes, greedily re-insert unassigned
/// jobs into them while any fits.
fn try_job_additions(
    problem: &VehicleRoutingProblem,
    solution: &mut WorkingSolution,
    state: &mut SolutionState,
    candidates: &[VehicleIdx],
) {
    let mut candidates = candidates.to_vec();
    candidates.sort_unstable();
    candidates.dedup();

    loop {
        let mut best: Option<(VehicleIdx, usize, crate::problem::job::JobIdx, Gain)> = None;

        for job in state.sorted_unassigned() {
            for &vehicle in &candidates {
                if let Ok((rank, cost)) = evaluate_route(problem, solution, state, vehicle, job) {
                    if best.is_none_or(|(_, _, _, best_cost)| cost < best_cost) {
                        best = Some((vehicle, rank, job, cost));
                    }
                }
            }
        }

        let Some((vehicle, rank, job, _)) = best else {
            break;
        };

        debug!(job = job.get(), vehicle = vehicle.get(), "adding unassigned job");
        solution.route_mut(vehicle).insert(problem, rank, job);
        state.set_assigned(job);
        state.update_route(problem, solution, vehicle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{self, route_jobs};

    #[test]
    fn test_local_search_sorts_a_line() {
        let problem = test_utils::line_problem(&[1, 1, 1, 1], 0, None, None);
        let (mut solution, mut state) =
            test_utils::solution_with_routes(&problem, &[&[2, 0, 3, 1]]);

        let applied = run(&problem, &mut solution, &mut state);

        assert!(applied > 0);
        // On a line the optimal closed tour visits in order.
        assert_eq!(solution.total_cost(&problem), 8);
        assert_eq!(route_jobs(&solution, 0).len(), 4);
    }

    #[test]
    fn test_local_search_is_monotone() {
        let problem = test_utils::line_problem_with_vehicles(&[2, 1, 3, 1, 2], 2);
        let (mut solution, mut state) =
            test_utils::solution_with_routes(&problem, &[&[4, 0, 2], &[3, 1]]);

        let mut previous = solution.total_cost(&problem);
        loop {
            let Some(best) = find_best_move(&problem, &solution, &state) else {
                break;
            };
            best.apply(&problem, &mut solution);
            let mut touched = best.update_candidates();
            touched.sort_unstable();
            touched.dedup();
            for vehicle in touched {
                state.update_route(&problem, &solution, vehicle);
            }

            let current = solution.total_cost(&problem);
            assert!(current < previous);
            previous = current;
        }
    }

    #[test]
    fn test_no_drift_between_gain_and_cost() {
        let problem = test_utils::line_problem_with_vehicles(&[3, 1, 2, 2, 1], 2);
        let (mut solution, mut state) =
            test_utils::solution_with_routes(&problem, &[&[1, 4, 0], &[2, 3]]);

        while let Some(best) = find_best_move(&problem, &solution, &state) {
            let before = solution.total_cost(&problem);
            best.apply(&problem, &mut solution);

            assert_eq!(solution.total_cost(&problem), before - best.gain());

            let mut touched = best.update_candidates();
            touched.sort_unstable();
            touched.dedup();
            for vehicle in touched {
                state.update_route(&problem, &solution, vehicle);
            }
        }
    }
}
