use crate::{
    problem::{amount::Amount, vehicle::VehicleIdx, Gain, VehicleRoutingProblem},
    solver::{
        ls::r#move::LocalSearchOperator,
        solution::{solution_state::SolutionState, working_solution::WorkingSolution},
    },
};

/// **2-Opt***
///
/// Swaps the suffixes of two routes after a pivot rank in each. Only allowed
/// when both vehicles agree on having a start and on having an end; mixing an
/// open and a closed route side would change the meaning of the swapped
/// suffix.
///
/// ```text
/// BEFORE:
///    source: (s_start) ... [P1] -> (s1 ... sk) -> (s_end)
///    target: (t_start) ... [P2] -> (t1 ... tm) -> (t_end)
///
/// AFTER:
///    source: (s_start) ... [P1] -> (t1 ... tm) -> (s_end)
///    target: (t_start) ... [P2] -> (s1 ... sk) -> (t_end)
/// ```
#[derive(Debug)]
pub struct TwoOptOperator {
    s_vehicle: VehicleIdx,
    s_rank: usize,
    t_vehicle: VehicleIdx,
    t_rank: usize,
    gain: Gain,
}

impl TwoOptOperator {
    pub fn new(
        problem: &VehicleRoutingProblem,
        solution: &WorkingSolution,
        s_vehicle: VehicleIdx,
        s_rank: usize,
        t_vehicle: VehicleIdx,
        t_rank: usize,
    ) -> Self {
        if s_vehicle == t_vehicle {
            panic!("2-Opt* is an inter-route operator");
        }

        let s_route = solution.route(s_vehicle);
        let t_route = solution.route(t_vehicle);
        assert!(s_rank < s_route.len());
        assert!(t_rank < t_route.len());
        assert!(s_rank + 1 < s_route.len() || t_rank + 1 < t_route.len());

        let s_end = problem.vehicle(s_vehicle).end_index();
        let t_end = problem.vehicle(t_vehicle).end_index();

        let s_pivot = s_route.location(problem, s_rank);
        let t_pivot = t_route.location(problem, t_rank);

        let s_suffix_first = (s_rank + 1 < s_route.len())
            .then(|| s_route.location(problem, s_rank + 1));
        let t_suffix_first = (t_rank + 1 < t_route.len())
            .then(|| t_route.location(problem, t_rank + 1));
        let s_last = s_route.location(problem, s_route.len() - 1);
        let t_last = t_route.location(problem, t_route.len() - 1);

        // Only the two pivot edges and the end legs of non-empty suffixes
        // change; interior suffix edges move wholesale.
        let mut removed = problem.cost_or_zero(Some(s_pivot), s_route.next_index(problem, s_rank))
            + problem.cost_or_zero(Some(t_pivot), t_route.next_index(problem, t_rank));
        if s_suffix_first.is_some() {
            removed += problem.cost_or_zero(Some(s_last), s_end);
        }
        if t_suffix_first.is_some() {
            removed += problem.cost_or_zero(Some(t_last), t_end);
        }

        let mut added = 0;
        match t_suffix_first {
            Some(first) => {
                added += problem.cost_or_zero(Some(s_pivot), Some(first));
                added += problem.cost_or_zero(Some(t_last), s_end);
            }
            None => added += problem.cost_or_zero(Some(s_pivot), s_end),
        }
        match s_suffix_first {
            Some(first) => {
                added += problem.cost_or_zero(Some(t_pivot), Some(first));
                added += problem.cost_or_zero(Some(s_last), t_end);
            }
            None => added += problem.cost_or_zero(Some(t_pivot), t_end),
        }

        TwoOptOperator {
            s_vehicle,
            s_rank,
            t_vehicle,
            t_rank,
            gain: removed - added,
        }
    }

    fn suffix_amount(
        problem: &VehicleRoutingProblem,
        state: &SolutionState,
        solution: &WorkingSolution,
        vehicle: VehicleIdx,
        rank: usize,
    ) -> Amount {
        if rank + 1 < solution.route(vehicle).len() {
            state.bwd_amount(vehicle, rank + 1).clone()
        } else {
            Amount::with_dimensions(problem.amount_dimensions())
        }
    }
}

impl LocalSearchOperator for TwoOptOperator {
    fn generate_moves<C>(
        problem: &VehicleRoutingProblem,
        solution: &WorkingSolution,
        _state: &SolutionState,
        (s_vehicle, t_vehicle): (VehicleIdx, VehicleIdx),
        mut consumer: C,
    ) where
        C: FnMut(Self),
    {
        // Each unordered pair is visited once; the swap is symmetric.
        if s_vehicle >= t_vehicle {
            return;
        }

        let s = problem.vehicle(s_vehicle);
        let t = problem.vehicle(t_vehicle);
        if s.has_start() != t.has_start() || s.has_end() != t.has_end() {
            return;
        }

        let s_len = solution.route(s_vehicle).len();
        let t_len = solution.route(t_vehicle).len();
        if s_len == 0 || t_len == 0 {
            return;
        }

        for s_rank in 0..s_len {
            for t_rank in 0..t_len {
                if s_rank + 1 == s_len && t_rank + 1 == t_len {
                    continue;
                }
                consumer(TwoOptOperator::new(
                    problem, solution, s_vehicle, s_rank, t_vehicle, t_rank,
                ));
            }
        }
    }

    fn gain(&self) -> Gain {
        self.gain
    }

    fn is_valid(
        &self,
        problem: &VehicleRoutingProblem,
        solution: &WorkingSolution,
        state: &SolutionState,
    ) -> bool {
        let s_route = solution.route(self.s_vehicle);
        let t_route = solution.route(self.t_vehicle);

        let s_suffix_ok = s_route
            .iter_range(self.s_rank + 1, s_route.len())
            .all(|job| problem.vehicle_ok_with_job(self.t_vehicle, job));
        let t_suffix_ok = t_route
            .iter_range(self.t_rank + 1, t_route.len())
            .all(|job| problem.vehicle_ok_with_job(self.s_vehicle, job));
        if !s_suffix_ok || !t_suffix_ok {
            return false;
        }

        let mut s_amount = state.fwd_amount(self.s_vehicle, self.s_rank).clone();
        s_amount += &Self::suffix_amount(problem, state, solution, self.t_vehicle, self.t_rank);
        if !s_amount.fits_in(problem.vehicle(self.s_vehicle).capacity()) {
            return false;
        }

        let mut t_amount = state.fwd_amount(self.t_vehicle, self.t_rank).clone();
        t_amount += &Self::suffix_amount(problem, state, solution, self.s_vehicle, self.s_rank);
        if !t_amount.fits_in(problem.vehicle(self.t_vehicle).capacity()) {
            return false;
        }

        s_route.is_valid_addition_for_tw(
            problem,
            t_route.iter_range(self.t_rank + 1, t_route.len()),
            self.s_rank + 1,
            s_route.len(),
        ) && t_route.is_valid_addition_for_tw(
            problem,
            s_route.iter_range(self.s_rank + 1, s_route.len()),
            self.t_rank + 1,
            t_route.len(),
        )
    }

    fn apply(&self, problem: &VehicleRoutingProblem, solution: &mut WorkingSolution) {
        let s_suffix: Vec<_> = solution
            .route(self.s_vehicle)
            .iter_range(self.s_rank + 1, solution.route(self.s_vehicle).len())
            .collect();
        let t_suffix: Vec<_> = solution
            .route(self.t_vehicle)
            .iter_range(self.t_rank + 1, solution.route(self.t_vehicle).len())
            .collect();

        let (s_route, t_route) = solution.route_pair_mut(self.s_vehicle, self.t_vehicle);
        let s_len = s_route.len();
        let t_len = t_route.len();

        s_route.replace(problem, t_suffix.into_iter(), self.s_rank + 1, s_len);
        t_route.replace(problem, s_suffix.into_iter(), self.t_rank + 1, t_len);
    }

    fn addition_candidates(&self) -> Vec<VehicleIdx> {
        vec![self.s_vehicle, self.t_vehicle]
    }

    fn update_candidates(&self) -> Vec<VehicleIdx> {
        vec![self.s_vehicle, self.t_vehicle]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{self, route_jobs};

    #[test]
    fn test_two_opt_star_swaps_suffixes() {
        let problem = test_utils::line_problem_with_vehicles(&[1, 1, 1, 1], 2);
        let (mut solution, state) =
            test_utils::solution_with_routes(&problem, &[&[0, 3], &[2, 1]]);

        // Swapping the suffixes after rank 0 of each route untangles the
        // crossing edges.
        let operator = TwoOptOperator::new(
            &problem,
            &solution,
            VehicleIdx::new(0),
            0,
            VehicleIdx::new(1),
            0,
        );

        assert!(operator.is_valid(&problem, &solution, &state));
        assert!(operator.gain() > 0);

        let before = solution.total_cost(&problem);
        operator.apply(&problem, &mut solution);

        assert_eq!(solution.total_cost(&problem), before - operator.gain());
        assert_eq!(route_jobs(&solution, 0), vec![0, 1]);
        assert_eq!(route_jobs(&solution, 1), vec![2, 3]);
    }

    #[test]
    fn test_two_opt_star_with_empty_source_suffix() {
        let problem = test_utils::line_problem_with_vehicles(&[1, 1, 1], 2);
        let (mut solution, state) =
            test_utils::solution_with_routes(&problem, &[&[0], &[1, 2]]);

        // Appends the suffix (job 2) of route 1 after job 0.
        let operator = TwoOptOperator::new(
            &problem,
            &solution,
            VehicleIdx::new(0),
            0,
            VehicleIdx::new(1),
            0,
        );

        assert!(operator.is_valid(&problem, &solution, &state));

        let before = solution.total_cost(&problem);
        operator.apply(&problem, &mut solution);

        assert_eq!(solution.total_cost(&problem), before - operator.gain());
        assert_eq!(route_jobs(&solution, 0), vec![0, 2]);
        assert_eq!(route_jobs(&solution, 1), vec![1]);
    }

    #[test]
    fn test_two_opt_star_forbidden_for_mixed_depots() {
        use crate::problem::vehicle::VehicleBuilder;

        let jobs = vec![test_utils::basic_job(1, 1), test_utils::basic_job(2, 2)];

        let closed = test_utils::basic_vehicle(0, Some(0));
        let mut builder = VehicleBuilder::default();
        builder.set_id(1);
        builder.set_start_index(0);
        // No end depot.
        let open = builder.build();

        let problem = test_utils::custom_problem(
            vec![vec![0, 1, 2], vec![1, 0, 1], vec![2, 1, 0]],
            jobs,
            vec![closed, open],
        );

        let (solution, state) = test_utils::solution_with_routes(&problem, &[&[0], &[1]]);

        let mut count = 0;
        TwoOptOperator::generate_moves(
            &problem,
            &solution,
            &state,
            (VehicleIdx::new(0), VehicleIdx::new(1)),
            |_| count += 1,
        );

        assert_eq!(count, 0);
    }
}
