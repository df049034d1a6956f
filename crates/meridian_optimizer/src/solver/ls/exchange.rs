use crate::{
    problem::{vehicle::VehicleIdx, Gain, VehicleRoutingProblem},
    solver::{
        ls::r#move::LocalSearchOperator,
        solution::{solution_state::SolutionState, working_solution::WorkingSolution},
    },
};

/// **Exchange**
///
/// Swaps one job of the source route against one job of the target route.
///
/// ```text
/// BEFORE:
///    source: ... (A) -> [J1] -> (B) ...
///    target: ... (X) -> [J2] -> (Y) ...
///
/// AFTER:
///    source: ... (A) -> [J2] -> (B) ...
///    target: ... (X) -> [J1] -> (Y) ...
/// ```
#[derive(Debug)]
pub struct ExchangeOperator {
    s_vehicle: VehicleIdx,
    s_rank: usize,
    t_vehicle: VehicleIdx,
    t_rank: usize,
    gain: Gain,
}

impl ExchangeOperator {
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
            panic!("Exchange is an inter-route operator");
        }

        let s_route = solution.route(s_vehicle);
        let t_route = solution.route(t_vehicle);
        assert!(s_rank < s_route.len());
        assert!(t_rank < t_route.len());

        let s_location = s_route.location(problem, s_rank);
        let t_location = t_route.location(problem, t_rank);

        let s_gain = state.edge_cost_around_node(s_vehicle, s_rank)
            - problem.cost_or_zero(s_route.previous_index(problem, s_rank), Some(t_location))
            - problem.cost_or_zero(Some(t_location), s_route.next_index(problem, s_rank));

        let t_gain = state.edge_cost_around_node(t_vehicle, t_rank)
            - problem.cost_or_zero(t_route.previous_index(problem, t_rank), Some(s_location))
            - problem.cost_or_zero(Some(s_location), t_route.next_index(problem, t_rank));

        ExchangeOperator {
            s_vehicle,
            s_rank,
            t_vehicle,
            t_rank,
            gain: s_gain + t_gain,
        }
    }
}

impl LocalSearchOperator for ExchangeOperator {
    fn generate_moves<C>(
        problem: &VehicleRoutingProblem,
        solution: &WorkingSolution,
        state: &SolutionState,
        (s_vehicle, t_vehicle): (VehicleIdx, VehicleIdx),
        mut consumer: C,
    ) where
        C: FnMut(Self),
    {
        // Each unordered pair is visited once; the swap is symmetric.
        if s_vehicle >= t_vehicle {
            return;
        }

        let s_len = solution.route(s_vehicle).len();
        let t_len = solution.route(t_vehicle).len();

        for s_rank in 0..s_len {
            for t_rank in 0..t_len {
                consumer(ExchangeOperator::new(
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
        let s_route = solution.route(self.s_vehicle);
        let t_route = solution.route(self.t_vehicle);
        let s_job = s_route.at(self.s_rank);
        let t_job = t_route.at(self.t_rank);

        if !problem.vehicle_ok_with_job(self.s_vehicle, t_job)
            || !problem.vehicle_ok_with_job(self.t_vehicle, s_job)
        {
            return false;
        }

        let mut s_amount = state.route_amount(self.s_vehicle);
        s_amount -= problem.job(s_job).amount();
        s_amount += problem.job(t_job).amount();
        if !s_amount.fits_in(problem.vehicle(self.s_vehicle).capacity()) {
            return false;
        }

        let mut t_amount = state.route_amount(self.t_vehicle);
        t_amount -= problem.job(t_job).amount();
        t_amount += problem.job(s_job).amount();
        if !t_amount.fits_in(problem.vehicle(self.t_vehicle).capacity()) {
            return false;
        }

        s_route.is_valid_addition_for_tw(
            problem,
            std::iter::once(t_job),
            self.s_rank,
            self.s_rank + 1,
        ) && t_route.is_valid_addition_for_tw(
            problem,
            std::iter::once(s_job),
            self.t_rank,
            self.t_rank + 1,
        )
    }

    fn apply(&self, problem: &VehicleRoutingProblem, solution: &mut WorkingSolution) {
        let (s_route, t_route) = solution.route_pair_mut(self.s_vehicle, self.t_vehicle);
        let s_job = s_route.at(self.s_rank);
        let t_job = t_route.at(self.t_rank);

        s_route.replace(problem, std::iter::once(t_job), self.s_rank, self.s_rank + 1);
        t_route.replace(problem, std::iter::once(s_job), self.t_rank, self.t_rank + 1);
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
    fn test_exchange_gain_matches_cost_delta() {
        let problem = test_utils::line_problem_with_vehicles(&[1, 1, 1, 1], 2);
        let (mut solution, state) =
            test_utils::solution_with_routes(&problem, &[&[0, 3], &[2, 1]]);

        // Swapping job 3 and job 1 sorts both routes by distance.
        let operator = ExchangeOperator::new(
            &problem,
            &solution,
            &state,
            VehicleIdx::new(0),
            1,
            VehicleIdx::new(1),
            1,
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
    fn test_exchange_is_its_own_inverse() {
        let problem = test_utils::line_problem_with_vehicles(&[2, 1, 3, 1], 2);
        let (original, _) = test_utils::solution_with_routes(&problem, &[&[0, 3], &[2, 1]]);

        let (mut solution, mut state) =
            test_utils::solution_with_routes(&problem, &[&[0, 3], &[2, 1]]);

        let swap = |solution: &mut WorkingSolution, state: &SolutionState| {
            let operator = ExchangeOperator::new(
                &problem,
                solution,
                state,
                VehicleIdx::new(0),
                1,
                VehicleIdx::new(1),
                0,
            );
            operator.apply(&problem, solution);
        };

        swap(&mut solution, &state);
        assert!(!solution.is_identical(&original));

        state.update_route(&problem, &solution, VehicleIdx::new(0));
        state.update_route(&problem, &solution, VehicleIdx::new(1));
        swap(&mut solution, &state);

        assert!(solution.is_identical(&original));
    }

    #[test]
    fn test_exchange_rejects_skill_mismatch() {
        use crate::problem::{job::JobBuilder, skill::Skills, vehicle::VehicleBuilder};

        let mut builder = JobBuilder::default();
        builder.set_id(1);
        builder.set_location_index(1);
        builder.set_skills(Skills::from_vec(vec![7]));
        let skilled_job = builder.build();

        let plain_job = test_utils::basic_job(2, 2);

        let mut builder = VehicleBuilder::default();
        builder.set_id(0);
        builder.set_start_index(0);
        builder.set_skills(Skills::from_vec(vec![7]));
        let skilled_vehicle = builder.build();

        let plain_vehicle = test_utils::basic_vehicle(1, Some(0));

        let problem = test_utils::custom_problem(
            vec![vec![0, 1, 2], vec![1, 0, 1], vec![2, 1, 0]],
            vec![skilled_job, plain_job],
            vec![skilled_vehicle, plain_vehicle],
        );

        let (solution, state) = test_utils::solution_with_routes(&problem, &[&[0], &[1]]);

        let operator = ExchangeOperator::new(
            &problem,
            &solution,
            &state,
            VehicleIdx::new(0),
            0,
            VehicleIdx::new(1),
            0,
        );

        // Job 0 requires skill 7, vehicle 1 has none.
        assert!(!operator.is_valid(&problem, &solution, &state));
    }
}
