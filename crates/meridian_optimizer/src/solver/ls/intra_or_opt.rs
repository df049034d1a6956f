use crate::{
    problem::{job::JobIdx, vehicle::VehicleIdx, Gain, VehicleRoutingProblem},
    solver::{
        ls::{chain_cost, r#move::LocalSearchOperator},
        solution::{solution_state::SolutionState, working_solution::WorkingSolution},
    },
};

/// **Intra-Or-Opt**
///
/// Moves an edge (two consecutive jobs) to another position of the same
/// route, forward or reversed. The edge lands in front of the element
/// currently at `t_rank`.
#[derive(Debug)]
pub struct IntraOrOptOperator {
    vehicle: VehicleIdx,
    s_rank: usize,
    t_rank: usize,
    reverse_segment: bool,
    gain: Gain,
}

impl IntraOrOptOperator {
    pub fn new(
        problem: &VehicleRoutingProblem,
        solution: &WorkingSolution,
        vehicle: VehicleIdx,
        s_rank: usize,
        t_rank: usize,
    ) -> Self {
        if (s_rank..=s_rank + 2).contains(&t_rank) {
            panic!("Intra-Or-Opt positions must actually move the edge");
        }

        let route = solution.route(vehicle);
        assert!(s_rank + 1 < route.len());
        assert!(t_rank <= route.len());

        let (first_rank, last_rank) = Self::span(s_rank, t_rank);
        let previous = route.previous_index(problem, first_rank);
        let next = route.insertion_next_index(problem, last_rank);

        let old_cost = chain_cost(
            problem,
            previous,
            route.iter_range(first_rank, last_rank),
            next,
        );

        let cost_for = |reverse: bool| {
            let edge = if reverse {
                [route.at(s_rank + 1), route.at(s_rank)]
            } else {
                [route.at(s_rank), route.at(s_rank + 1)]
            };
            if t_rank < s_rank {
                chain_cost(
                    problem,
                    previous,
                    edge.into_iter().chain(route.iter_range(t_rank, s_rank)),
                    next,
                )
            } else {
                chain_cost(
                    problem,
                    previous,
                    route.iter_range(s_rank + 2, t_rank).chain(edge),
                    next,
                )
            }
        };

        let normal_cost = cost_for(false);
        let reversed_cost = cost_for(true);
        let reverse_segment = reversed_cost < normal_cost;

        IntraOrOptOperator {
            vehicle,
            s_rank,
            t_rank,
            reverse_segment,
            gain: old_cost - normal_cost.min(reversed_cost),
        }
    }

    /// The affected span `[first_rank, last_rank)` in original coordinates.
    fn span(s_rank: usize, t_rank: usize) -> (usize, usize) {
        if t_rank < s_rank {
            (t_rank, s_rank + 2)
        } else {
            (s_rank, t_rank)
        }
    }

    /// Span content after the move, in route order.
    fn moved(jobs: &[JobIdx], s_rank: usize, t_rank: usize, reverse: bool) -> Vec<JobIdx> {
        let edge = if reverse {
            [jobs[s_rank + 1], jobs[s_rank]]
        } else {
            [jobs[s_rank], jobs[s_rank + 1]]
        };

        let mut moved = Vec::new();
        if t_rank < s_rank {
            moved.extend_from_slice(&edge);
            moved.extend_from_slice(&jobs[t_rank..s_rank]);
        } else {
            moved.extend_from_slice(&jobs[s_rank + 2..t_rank]);
            moved.extend_from_slice(&edge);
        }

        moved
    }
}

impl LocalSearchOperator for IntraOrOptOperator {
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
        if len < 3 {
            return;
        }

        for s_rank in 0..len - 1 {
            for t_rank in 0..=len {
                if (s_rank..=s_rank + 2).contains(&t_rank) {
                    continue;
                }
                consumer(IntraOrOptOperator::new(
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
        let route = solution.route(self.vehicle);
        let (first_rank, last_rank) = Self::span(self.s_rank, self.t_rank);
        route.is_valid_addition_for_tw(
            problem,
            Self::moved(route.jobs(), self.s_rank, self.t_rank, self.reverse_segment).into_iter(),
            first_rank,
            last_rank,
        )
    }

    fn apply(&self, problem: &VehicleRoutingProblem, solution: &mut WorkingSolution) {
        let route = solution.route_mut(self.vehicle);
        let (first_rank, last_rank) = Self::span(self.s_rank, self.t_rank);
        let jobs = Self::moved(route.jobs(), self.s_rank, self.t_rank, self.reverse_segment);
        route.replace(problem, jobs.into_iter(), first_rank, last_rank);
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
    fn test_move_edge_forward() {
        let problem = test_utils::line_problem(&[1, 1, 1, 1, 1], 0, None, None);
        let (mut solution, state) =
            test_utils::solution_with_routes(&problem, &[&[2, 3, 0, 1, 4]]);

        // Move the edge (2, 3) in front of job 4.
        let operator =
            IntraOrOptOperator::new(&problem, &solution, VehicleIdx::new(0), 0, 4);

        assert!(operator.is_valid(&problem, &solution, &state));
        assert!(operator.gain() > 0);

        let before = solution.total_cost(&problem);
        operator.apply(&problem, &mut solution);

        assert_eq!(solution.total_cost(&problem), before - operator.gain());
        assert_eq!(route_jobs(&solution, 0), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_move_edge_backward() {
        let problem = test_utils::line_problem(&[1, 1, 1, 1], 0, None, None);
        let (mut solution, _state) =
            test_utils::solution_with_routes(&problem, &[&[2, 3, 0, 1]]);

        // Move the edge (0, 1) to the front.
        let operator =
            IntraOrOptOperator::new(&problem, &solution, VehicleIdx::new(0), 2, 0);

        let before = solution.total_cost(&problem);
        operator.apply(&problem, &mut solution);

        assert_eq!(solution.total_cost(&problem), before - operator.gain());
        assert_eq!(route_jobs(&solution, 0), vec![0, 1, 2, 3]);
    }
}
