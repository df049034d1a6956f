use crate::{
    problem::{vehicle::VehicleIdx, Gain, VehicleRoutingProblem},
    solver::{
        ls::r#move::LocalSearchOperator,
        solution::{solution_state::SolutionState, working_solution::WorkingSolution},
    },
};

/// **Relocate**
///
/// Moves a single job from one route to an insertion point in another route.
///
/// ```text
/// BEFORE:
///    source: ... (A) -> [J] -> (B) ...
///    target: ... (X) -> (Y) ...
///
/// AFTER:
///    source: ... (A) -> (B) ...
///    target: ... (X) -> [J] -> (Y) ...
/// ```
#[derive(Debug)]
pub struct RelocateOperator {
    s_vehicle: VehicleIdx,
    s_rank: usize,
    t_vehicle: VehicleIdx,
    t_rank: usize,
    gain: Gain,
}

impl RelocateOperator {
    pub fn new(
        problem: &VehicleRoutingProblem,
        solution: &WorkingSolution,
        state: &SolutionState,
        s_vehicle: VehicleIdx,
        s_rank: usize,
        t_vehicle: VehicleIdx,
        t_rank: usize,
    ) -> Self {
        if s_vehicle == t_vehicle {
            panic!("Relocate is an inter-route operator");
        }

        let s_route = solution.route(s_vehicle);
        let t_route = solution.route(t_vehicle);
        assert!(s_rank < s_route.len());
        assert!(t_rank <= t_route.len());

        let location = s_route.location(problem, s_rank);

        let s_gain = state.edge_cost_around_node(s_vehicle, s_rank)
            - problem.cost_or_zero(
                s_route.previous_index(problem, s_rank),
                s_route.next_index(problem, s_rank),
            );

        let t_previous = t_route.previous_index(problem, t_rank);
        let t_next = t_route.insertion_next_index(problem, t_rank);
        let t_gain = problem.cost_or_zero(t_previous, t_next)
            - problem.cost_or_zero(t_previous, Some(location))
            - problem.cost_or_zero(Some(location), t_next);

        RelocateOperator {
            s_vehicle,
            s_rank,
            t_vehicle,
            t_rank,
            gain: s_gain + t_gain,
        }
    }
}

impl LocalSearchOperator for RelocateOperator {
    fn generate_moves<C>(
        problem: &VehicleRoutingProblem,
        solution: &WorkingSolution,
        state: &SolutionState,
        (s_vehicle, t_vehicle): (VehicleIdx, VehicleIdx),
        mut consumer: C,
    ) where
        C: FnMut(Self),
    {
        if s_vehicle == t_vehicle {
            return;
        }

        let s_len = solution.route(s_vehicle).len();
        let t_len = solution.route(t_vehicle).len();

        for s_rank in 0..s_len {
            for t_rank in 0..=t_len {
                consumer(RelocateOperator::new(
                    problem, solution, state, s_vehicle, s_rank, t_vehicle, t_rank,
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
        let job = solution.route(self.s_vehicle).at(self.s_rank);

        if !problem.vehicle_ok_with_job(self.t_vehicle, job) {
            return false;
        }

        let mut amount = state.route_amount(self.t_vehicle);
        amount += problem.job(job).amount();
        if !amount.fits_in(problem.vehicle(self.t_vehicle).capacity()) {
            return false;
        }

        // Dropping the job can break the source route's end-of-route bound
        // when the return leg grows.
        solution.route(self.s_vehicle).is_valid_addition_for_tw(
            problem,
            std::iter::empty(),
            self.s_rank,
            self.s_rank + 1,
        ) && solution.route(self.t_vehicle).is_valid_addition_for_tw(
            problem,
            std::iter::once(job),
            self.t_rank,
            self.t_rank,
        )
    }

    fn apply(&self, problem: &VehicleRoutingProblem, solution: &mut WorkingSolution) {
        let (s_route, t_route) = solution.route_pair_mut(self.s_vehicle, self.t_vehicle);
        let job = s_route.remove(problem, self.s_rank);
        t_route.insert(problem, self.t_rank, job);
    }

    fn addition_candidates(&self) -> Vec<VehicleIdx> {
        vec![self.s_vehicle]
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
    fn test_relocate_gain_matches_cost_delta() {
        let problem = test_utils::line_problem_with_vehicles(&[1, 1, 1, 1], 2);
        let (mut solution, state) =
            test_utils::solution_with_routes(&problem, &[&[0, 1, 2], &[3]]);

        let operator = RelocateOperator::new(
            &problem,
            &solution,
            &state,
            VehicleIdx::new(0),
            2,
            VehicleIdx::new(1),
            0,
        );

        assert!(operator.is_valid(&problem, &solution, &state));

        let before = solution.total_cost(&problem);
        operator.apply(&problem, &mut solution);

        assert_eq!(solution.total_cost(&problem), before - operator.gain());
        assert_eq!(route_jobs(&solution, 0), vec![0, 1]);
        assert_eq!(route_jobs(&solution, 1), vec![2, 3]);
    }

    #[test]
    fn test_relocate_into_empty_route() {
        let problem = test_utils::line_problem_with_vehicles(&[1, 1], 2);
        let (mut solution, state) = test_utils::solution_with_routes(&problem, &[&[0, 1]]);

        let operator = RelocateOperator::new(
            &problem,
            &solution,
            &state,
            VehicleIdx::new(0),
            1,
            VehicleIdx::new(1),
            0,
        );

        let before = solution.total_cost(&problem);
        operator.apply(&problem, &mut solution);

        assert_eq!(solution.total_cost(&problem), before - operator.gain());
        assert_eq!(route_jobs(&solution, 0), vec![0]);
        assert_eq!(route_jobs(&solution, 1), vec![1]);
    }

    #[test]
    fn test_relocate_respects_capacity() {
        let problem = test_utils::line_problem_with_amounts(&[1, 1], &[3, 3]);
        // Single vehicle with capacity 6; clone its layout onto two vehicles
        // via a custom problem instead.
        let jobs = problem.jobs().to_vec();
        drop(problem);

        let mut builder = crate::problem::vehicle::VehicleBuilder::default();
        builder.set_id(0);
        builder.set_start_index(0);
        builder.set_end_index(0);
        builder.set_capacity(crate::problem::amount::Amount::from_vec(vec![6]));
        let roomy = builder.build();

        let mut builder = crate::problem::vehicle::VehicleBuilder::default();
        builder.set_id(1);
        builder.set_start_index(0);
        builder.set_end_index(0);
        builder.set_capacity(crate::problem::amount::Amount::from_vec(vec![3]));
        let tight = builder.build();

        let problem = test_utils::custom_problem(
            vec![vec![0, 1, 2], vec![1, 0, 1], vec![2, 1, 0]],
            jobs,
            vec![roomy, tight],
        );

        let (solution, state) =
            test_utils::solution_with_routes(&problem, &[&[0], &[1]]);

        // Moving job 0 (demand 3) next to job 1 would exceed capacity 3.
        let operator = RelocateOperator::new(
            &problem,
            &solution,
            &state,
            VehicleIdx::new(0),
            0,
            VehicleIdx::new(1),
            0,
        );

        assert!(!operator.is_valid(&problem, &solution, &state));
    }
}
