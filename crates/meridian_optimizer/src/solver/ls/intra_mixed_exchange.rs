use crate::{
    problem::{job::JobIdx, vehicle::VehicleIdx, Gain, VehicleRoutingProblem},
    solver::{
        ls::{chain_cost, r#move::LocalSearchOperator},
        solution::{solution_state::SolutionState, working_solution::WorkingSolution},
    },
};

/// **Intra-Mixed-Exchange**
///
/// Swaps a single job of a route against a disjoint edge of the same route;
/// the edge may land reversed.
#[derive(Debug)]
pub struct IntraMixedExchangeOperator {
    vehicle: VehicleIdx,
    s_rank: usize,
    t_rank: usize,
    reverse_t_edge: bool,
    gain: Gain,
}

impl IntraMixedExchangeOperator {
    pub fn new(
        problem: &VehicleRoutingProblem,
        solution: &WorkingSolution,
        vehicle: VehicleIdx,
        s_rank: usize,
        t_rank: usize,
    ) -> Self {
        if s_rank == t_rank || s_rank == t_rank + 1 {
            panic!("Intra-Mixed-Exchange requires a job disjoint from the edge");
        }

        let route = solution.route(vehicle);
        assert!(s_rank < route.len());
        assert!(t_rank + 1 < route.len());

        let (first_rank, last_rank) = Self::span(s_rank, t_rank);
        let previous = route.previous_index(problem, first_rank);
        let next = route.next_index(problem, last_rank - 1);

        let old_cost = chain_cost(
            problem,
            previous,
            route.iter_range(first_rank, last_rank),
            next,
        );

        let cost_for = |reverse: bool| {
            let edge = if reverse {
                [route.at(t_rank + 1), route.at(t_rank)]
            } else {
                [route.at(t_rank), route.at(t_rank + 1)]
            };
            let single = std::iter::once(route.at(s_rank));
            if s_rank < t_rank {
                chain_cost(
                    problem,
                    previous,
                    edge.into_iter()
                        .chain(route.iter_range(s_rank + 1, t_rank))
                        .chain(single),
                    next,
                )
            } else {
                chain_cost(
                    problem,
                    previous,
                    single
                        .chain(route.iter_range(t_rank + 2, s_rank))
                        .chain(edge),
                    next,
                )
            }
        };

        let normal_cost = cost_for(false);
        let reversed_cost = cost_for(true);
        let reverse_t_edge = reversed_cost < normal_cost;

        IntraMixedExchangeOperator {
            vehicle,
            s_rank,
            t_rank,
            reverse_t_edge,
            gain: old_cost - normal_cost.min(reversed_cost),
        }
    }

    /// The affected span `[first_rank, last_rank)` in original coordinates.
    fn span(s_rank: usize, t_rank: usize) -> (usize, usize) {
        if s_rank < t_rank {
            (s_rank, t_rank + 2)
        } else {
            (t_rank, s_rank + 1)
        }
    }

    /// Span content after the swap.
    fn swapped(jobs: &[JobIdx], s_rank: usize, t_rank: usize, reverse: bool) -> Vec<JobIdx> {
        let edge = if reverse {
            [jobs[t_rank + 1], jobs[t_rank]]
        } else {
            [jobs[t_rank], jobs[t_rank + 1]]
        };

        let mut swapped = Vec::new();
        if s_rank < t_rank {
            swapped.extend_from_slice(&edge);
            swapped.extend_from_slice(&jobs[s_rank + 1..t_rank]);
            swapped.push(jobs[s_rank]);
        } else {
            swapped.push(jobs[s_rank]);
            swapped.extend_from_slice(&jobs[t_rank + 2..s_rank]);
            swapped.extend_from_slice(&edge);
        }
        swapped
    }
}

impl LocalSearchOperator for IntraMixedExchangeOperator {
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

        for s_rank in 0..len {
            for t_rank in 0..len - 1 {
                if s_rank == t_rank || s_rank == t_rank + 1 {
                    continue;
                }
                consumer(IntraMixedExchangeOperator::new(
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
            Self::swapped(route.jobs(), self.s_rank, self.t_rank, self.reverse_t_edge)
                .into_iter(),
            first_rank,
            last_rank,
        )
    }

    fn apply(&self, problem: &VehicleRoutingProblem, solution: &mut WorkingSolution) {
        let route = solution.route_mut(self.vehicle);
        let (first_rank, last_rank) = Self::span(self.s_rank, self.t_rank);
        let jobs = Self::swapped(route.jobs(), self.s_rank, self.t_rank, self.reverse_t_edge);
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
    fn test_swap_job_against_later_edge() {
        let problem = test_utils::line_problem(&[1, 1, 1, 1], 0, None, None);
        let (mut solution, state) =
            test_utils::solution_with_routes(&problem, &[&[2, 3, 0, 1]]);

        // Swap the job at rank 0 against the edge at ranks (2, 3).
        let operator =
            IntraMixedExchangeOperator::new(&problem, &solution, VehicleIdx::new(0), 0, 2);

        assert!(operator.is_valid(&problem, &solution, &state));
        assert!(operator.gain() > 0);

        let before = solution.total_cost(&problem);
        operator.apply(&problem, &mut solution);

        assert_eq!(solution.total_cost(&problem), before - operator.gain());
        assert_eq!(route_jobs(&solution, 0), vec![0, 1, 3, 2]);
    }

    #[test]
    fn test_swap_job_against_earlier_edge() {
        let problem = test_utils::line_problem(&[1, 1, 1], 0, None, None);
        let (mut solution, _state) =
            test_utils::solution_with_routes(&problem, &[&[1, 2, 0]]);

        // Swap the job at rank 2 against the edge at ranks (0, 1).
        let operator =
            IntraMixedExchangeOperator::new(&problem, &solution, VehicleIdx::new(0), 2, 0);

        let before = solution.total_cost(&problem);
        operator.apply(&problem, &mut solution);

        assert_eq!(solution.total_cost(&problem), before - operator.gain());
        assert_eq!(route_jobs(&solution, 0), vec![0, 1, 2]);
    }
}
