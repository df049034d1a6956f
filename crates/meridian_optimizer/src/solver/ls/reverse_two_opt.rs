use crate::{
    problem::{vehicle::VehicleIdx, Gain, VehicleRoutingProblem},
    solver::{
        ls::r#move::LocalSearchOperator,
        solution::{solution_state::SolutionState, working_solution::WorkingSolution},
    },
};

/// **Reverse-2-Opt**
///
/// Reverses the interior of a single route between two ranks, removing the
/// two crossing edges. With an asymmetric matrix the interior legs change
/// direction too, so the gain walks the segment once.
///
/// ```text
/// BEFORE:
///    ... (A) -> [F] -> ... -> [T] -> (B) ...
///
/// AFTER:
///    ... (A) -> [T] -> ... -> [F] -> (B) ...
/// ```
#[derive(Debug)]
pub struct ReverseTwoOptOperator {
    vehicle: VehicleIdx,
    s_rank: usize,
    t_rank: usize,
    gain: Gain,
}

impl ReverseTwoOptOperator {
    pub fn new(
        problem: &VehicleRoutingProblem,
        solution: &WorkingSolution,
        vehicle: VehicleIdx,
        s_rank: usize,
        t_rank: usize,
    ) -> Self {
        if s_rank >= t_rank {
            panic!("Reverse-2-Opt requires s_rank < t_rank");
        }

        let route = solution.route(vehicle);
        assert!(t_rank < route.len());

        let previous = route.previous_index(problem, s_rank);
        let next = route.next_index(problem, t_rank);
        let first = route.location(problem, s_rank);
        let last = route.location(problem, t_rank);

        let mut removed = problem.cost_or_zero(previous, Some(first))
            + problem.cost_or_zero(Some(last), next);
        let mut added = problem.cost_or_zero(previous, Some(last))
            + problem.cost_or_zero(Some(first), next);

        for rank in s_rank..t_rank {
            let from = route.location(problem, rank);
            let to = route.location(problem, rank + 1);
            removed += Gain::from(problem.cost(from, to));
            added += Gain::from(problem.cost(to, from));
        }

        ReverseTwoOptOperator {
            vehicle,
            s_rank,
            t_rank,
            gain: removed - added,
        }
    }
}

impl LocalSearchOperator for ReverseTwoOptOperator {
    fn generate_moves<C>(
        problem: &VehicleRoutingProblem,
        solution: &WorkingSolution,
        _state: &SolutionState,
        (s_vehicle, t_vehicle): (VehicleIdx, VehicleIdx),
        mut consumer: C,
    ) where
        C: FnMut(Self),
    {
        if s_vehicle != t_vehicle {
            return;
        }

        let len = solution.route(s_vehicle).len();
        if len < 2 {
            return;
        }

        for s_rank in 0..len - 1 {
            for t_rank in s_rank + 1..len {
                consumer(ReverseTwoOptOperator::new(
                    problem, solution, s_vehicle, s_rank, t_rank,
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
        _state: &SolutionState,
    ) -> bool {
        // Capacity and skills are unaffected by reordering one route.
        let route = solution.route(self.vehicle);
        route.is_valid_addition_for_tw(
            problem,
            route.iter_range(self.s_rank, self.t_rank + 1).rev(),
            self.s_rank,
            self.t_rank + 1,
        )
    }

    fn apply(&self, problem: &VehicleRoutingProblem, solution: &mut WorkingSolution) {
        solution
            .route_mut(self.vehicle)
            .reverse(problem, self.s_rank, self.t_rank);
    }

    fn addition_candidates(&self) -> Vec<VehicleIdx> {
        vec![self.vehicle]
    }

    fn update_candidates(&self) -> Vec<VehicleIdx> {
        vec![self.vehicle]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{self, route_jobs};

    #[test]
    fn test_reverse_interior() {
        let problem = test_utils::line_problem(&[1, 1, 1, 1], 0, None, None);
        let (mut solution, state) =
            test_utils::solution_with_routes(&problem, &[&[0, 3, 2, 1]]);

        // Reversing ranks 1..=3 sorts the route.
        let operator =
            ReverseTwoOptOperator::new(&problem, &solution, VehicleIdx::new(0), 1, 3);

        assert!(operator.is_valid(&problem, &solution, &state));
        assert!(operator.gain() > 0);

        let before = solution.total_cost(&problem);
        operator.apply(&problem, &mut solution);

        assert_eq!(solution.total_cost(&problem), before - operator.gain());
        assert_eq!(route_jobs(&solution, 0), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_reversal_is_its_own_inverse() {
        let problem = test_utils::line_problem(&[2, 1, 3, 1], 0, None, None);
        let (original, _) = test_utils::solution_with_routes(&problem, &[&[1, 3, 0, 2]]);
        let (mut solution, _) = test_utils::solution_with_routes(&problem, &[&[1, 3, 0, 2]]);

        let operator =
            ReverseTwoOptOperator::new(&problem, &solution, VehicleIdx::new(0), 1, 3);
        operator.apply(&problem, &mut solution);
        assert!(!solution.is_identical(&original));

        let operator =
            ReverseTwoOptOperator::new(&problem, &solution, VehicleIdx::new(0), 1, 3);
        operator.apply(&problem, &mut solution);
        assert!(solution.is_identical(&original));
    }

    #[test]
    fn test_gain_accounts_for_asymmetric_interior() {
        // Going "down" the line costs 1 per leg, going "up" costs 5.
        let jobs = vec![
            test_utils::basic_job(1, 1),
            test_utils::basic_job(2, 2),
            test_utils::basic_job(3, 3),
        ];
        let vehicles = vec![test_utils::basic_vehicle(0, Some(0))];
        let problem = test_utils::custom_problem(
            vec![
                vec![0, 1, 1, 1],
                vec![1, 0, 5, 5],
                vec![1, 1, 0, 5],
                vec![1, 1, 1, 0],
            ],
            jobs,
            vehicles,
        );

        let (mut solution, _) = test_utils::solution_with_routes(&problem, &[&[0, 1, 2]]);

        let operator =
            ReverseTwoOptOperator::new(&problem, &solution, VehicleIdx::new(0), 0, 2);

        // Before: 0->1 (1) + 1->2 (5) + 2->3 (5) + 3->0 (1) = 12.
        // After:  0->3 (1) + 3->2 (1) + 2->1 (1) + 1->0 (1) = 4.
        assert_eq!(operator.gain(), 8);

        let before = solution.total_cost(&problem);
        operator.apply(&problem, &mut solution);

        assert_eq!(solution.total_cost(&problem), before - operator.gain());
        assert_eq!(route_jobs(&solution, 0), vec![2, 1, 0]);
    }
}
