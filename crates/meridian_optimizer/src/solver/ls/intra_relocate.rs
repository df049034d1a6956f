use crate::{
    problem::{job::JobIdx, vehicle::VehicleIdx, Gain, VehicleRoutingProblem},
    solver::{
        ls::r#move::LocalSearchOperator,
        solution::{solution_state::SolutionState, working_solution::WorkingSolution},
    },
};

/// **Intra-Relocate**
///
/// Moves a single job to another position of the same route. The job lands
/// in front of the element currently at `t_rank`.
///
/// ```text
/// BEFORE:
///    ... (A) -> [J] -> (B) ... (X) -> (Y) ...
///
/// AFTER:
///    ... (A) -> (B) ... (X) -> [J] -> (Y) ...
/// ```
#[derive(Debug)]
pub struct IntraRelocateOperator {
    vehicle: VehicleIdx,
    s_rank: usize,
    t_rank: usize,
    gain: Gain,
}

impl IntraRelocateOperator {
    pub fn new(
        problem: &VehicleRoutingProblem,
        solution: &WorkingSolution,
        state: &SolutionState,
        vehicle: VehicleIdx,
        s_rank: usize,
        t_rank: usize,
    ) -> Self {
        if t_rank == s_rank || t_rank == s_rank + 1 {
            panic!("Intra-Relocate positions must actually move the job");
        }

        let route = solution.route(vehicle);
        assert!(s_rank < route.len());
        assert!(t_rank <= route.len());

        let location = route.location(problem, s_rank);

        let removal_gain = state.edge_cost_around_node(vehicle, s_rank)
            - problem.cost_or_zero(
                route.previous_index(problem, s_rank),
                route.next_index(problem, s_rank),
            );

        let t_previous = route.previous_index(problem, t_rank);
        let t_next = route.insertion_next_index(problem, t_rank);
        let insertion_gain = problem.cost_or_zero(t_previous, t_next)
            - problem.cost_or_zero(t_previous, Some(location))
            - problem.cost_or_zero(Some(location), t_next);

        IntraRelocateOperator {
            vehicle,
            s_rank,
            t_rank,
            gain: removal_gain + insertion_gain,
        }
    }

    /// The replaced span in original coordinates, and its new content.
    fn replacement(&self, solution: &WorkingSolution) -> (usize, usize, Vec<JobIdx>) {
        let route = solution.route(self.vehicle);
        let job = route.at(self.s_rank);

        if self.s_rank < self.t_rank {
            let jobs = route
                .iter_range(self.s_rank + 1, self.t_rank)
                .chain(std::iter::once(job))
                .collect();
            (self.s_rank, self.t_rank, jobs)
        } else {
            let jobs = std::iter::once(job)
                .chain(route.iter_range(self.t_rank, self.s_rank))
                .collect();
            (self.t_rank, self.s_rank + 1, jobs)
        }
    }
}

impl LocalSearchOperator for IntraRelocateOperator {
    fn generate_moves<C>(
        problem: &VehicleRoutingProblem,
        solution: &WorkingSolution,
        state: &SolutionState,
        (s_vehicle, t_vehicle): (VehicleIdx, VehicleIdx),
        mut consumer: C,
    ) where
        C: FnMut(Self),
    {
        if s_vehicle != t_vehicle {
            return;
        }

        let len = solution.route(s_vehicle).len();
        for s_rank in 0..len {
            for t_rank in 0..=len {
                if t_rank == s_rank || t_rank == s_rank + 1 {
                    continue;
                }
                consumer(IntraRelocateOperator::new(
                    problem, solution, state, s_vehicle, s_rank, t_rank,
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
        let (first_rank, last_rank, jobs) = self.replacement(solution);
        solution.route(self.vehicle).is_valid_addition_for_tw(
            problem,
            jobs.into_iter(),
            first_rank,
            last_rank,
        )
    }

    fn apply(&self, problem: &VehicleRoutingProblem, solution: &mut WorkingSolution) {
        let (first_rank, last_rank, jobs) = self.replacement(solution);
        solution.route_mut(self.vehicle).replace(
            problem,
            jobs.into_iter(),
            first_rank,
            last_rank,
        );
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
    fn test_relocate_forward() {
        let problem = test_utils::line_problem(&[1, 1, 1, 1, 1], 0, None, None);
        let (mut solution, state) =
            test_utils::solution_with_routes(&problem, &[&[3, 0, 1, 2, 4]]);

        // Move job 3 in front of job 4 (insertion index 4 in the original
        // sequence), restoring sorted order.
        let operator = IntraRelocateOperator::new(
            &problem,
            &solution,
            &state,
            VehicleIdx::new(0),
            0,
            4,
        );

        assert!(operator.is_valid(&problem, &solution, &state));
        assert!(operator.gain() > 0);

        let before = solution.total_cost(&problem);
        operator.apply(&problem, &mut solution);

        assert_eq!(solution.total_cost(&problem), before - operator.gain());
        assert_eq!(route_jobs(&solution, 0), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_relocate_backward() {
        let problem = test_utils::line_problem(&[1, 1, 1, 1], 0, None, None);
        let (mut solution, state) =
            test_utils::solution_with_routes(&problem, &[&[1, 2, 0, 3]]);

        // Move job 0 to the front.
        let operator = IntraRelocateOperator::new(
            &problem,
            &solution,
            &state,
            VehicleIdx::new(0),
            2,
            0,
        );

        let before = solution.total_cost(&problem);
        operator.apply(&problem, &mut solution);

        assert_eq!(solution.total_cost(&problem), before - operator.gain());
        assert_eq!(route_jobs(&solution, 0), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_relocate_to_route_end() {
        let problem = test_utils::line_problem(&[1, 1, 1], 0, None, None);
        let (mut solution, state) =
            test_utils::solution_with_routes(&problem, &[&[2, 0, 1]]);

        let operator = IntraRelocateOperator::new(
            &problem,
            &solution,
            &state,
            VehicleIdx::new(0),
            0,
            3,
        );

        let before = solution.total_cost(&problem);
        operator.apply(&problem, &mut solution);

        assert_eq!(solution.total_cost(&problem), before - operator.gain());
        assert_eq!(route_jobs(&solution, 0), vec![0, 1, 2]);
    }
}
