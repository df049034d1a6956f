use crate::{
    problem::{job::JobIdx, vehicle::VehicleIdx, Gain, VehicleRoutingProblem},
    solver::{
        ls::{chain_cost, r#move::LocalSearchOperator},
        solution::{solution_state::SolutionState, working_solution::WorkingSolution},
    },
};

/// **Intra-Cross-Exchange**
///
/// Swaps two disjoint edges of the same route, `s_rank + 2 <= t_rank`. Both
/// edges may individually land reversed; the four orientations are evaluated
/// and ties prefer the normal one.
#[derive(Debug)]
pub struct IntraCrossExchangeOperator {
    vehicle: VehicleIdx,
    s_rank: usize,
    t_rank: usize,
    reverse_s_edge: bool,
    reverse_t_edge: bool,
    gain: Gain,
}

impl IntraCrossExchangeOperator {
    pub fn new(
        problem: &VehicleRoutingProblem,
        solution: &WorkingSolution,
        vehicle: VehicleIdx,
        s_rank: usize,
        t_rank: usize,
    ) -> Self {
        if s_rank + 2 > t_rank {
            panic!("Intra-Cross-Exchange requires disjoint edges");
        }

        let route = solution.route(vehicle);
        assert!(t_rank + 1 < route.len());

        let previous = route.previous_index(problem, s_rank);
        let next = route.next_index(problem, t_rank + 1);

        let old_cost = chain_cost(
            problem,
            previous,
            route.iter_range(s_rank, t_rank + 2),
            next,
        );

        let cost_for = |reverse_s_edge: bool, reverse_t_edge: bool| {
            let s_edge = if reverse_s_edge {
                [route.at(s_rank + 1), route.at(s_rank)]
            } else {
                [route.at(s_rank), route.at(s_rank + 1)]
            };
            let t_edge = if reverse_t_edge {
                [route.at(t_rank + 1), route.at(t_rank)]
            } else {
                [route.at(t_rank), route.at(t_rank + 1)]
            };
            chain_cost(
                problem,
                previous,
                t_edge
                    .into_iter()
                    .chain(route.iter_range(s_rank + 2, t_rank))
                    .chain(s_edge),
                next,
            )
        };

        let mut best = (false, false);
        let mut best_cost = Gain::MAX;
        for (reverse_s_edge, reverse_t_edge) in
            [(false, false), (false, true), (true, false), (true, true)]
        {
            let cost = cost_for(reverse_s_edge, reverse_t_edge);
            if cost < best_cost {
                best_cost = cost;
                best = (reverse_s_edge, reverse_t_edge);
            }
        }

        IntraCrossExchangeOperator {
            vehicle,
            s_rank,
            t_rank,
            reverse_s_edge: best.0,
            reverse_t_edge: best.1,
            gain: old_cost - best_cost,
        }
    }

    /// Span content `[s_rank, t_rank + 2)` after the swap.
    fn swapped(
        jobs: &[JobIdx],
        s_rank: usize,
        t_rank: usize,
        reverse_s_edge: bool,
        reverse_t_edge: bool,
    ) -> Vec<JobIdx> {
        let s_edge = if reverse_s_edge {
            [jobs[s_rank + 1], jobs[s_rank]]
        } else {
            [jobs[s_rank], jobs[s_rank + 1]]
        };
        let t_edge = if reverse_t_edge {
            [jobs[t_rank + 1], jobs[t_rank]]
        } else {
            [jobs[t_rank], jobs[t_rank + 1]]
        };

        let mut swapped = Vec::with_capacity(t_rank + 2 - s_rank);
        swapped.extend_from_slice(&t_edge);
        swapped.extend_from_slice(&jobs[s_rank + 2..t_rank]);
        swapped.extend_from_slice(&s_edge);
        swapped
    }
}

impl LocalSearchOperator for IntraCrossExchangeOperator {
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
        if len < 4 {
            return;
        }

        for s_rank in 0..len - 3 {
            for t_rank in s_rank + 2..len - 1 {
                consumer(IntraCrossExchangeOperator::new(
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
        route.is_valid_addition_for_tw(
            problem,
            Self::swapped(
                route.jobs(),
                self.s_rank,
                self.t_rank,
                self.reverse_s_edge,
                self.reverse_t_edge,
            )
            .into_iter(),
            self.s_rank,
            self.t_rank + 2,
        )
    }

    fn apply(&self, problem: &VehicleRoutingProblem, solution: &mut WorkingSolution) {
        let route = solution.route_mut(self.vehicle);
        let jobs = Self::swapped(
            route.jobs(),
            self.s_rank,
            self.t_rank,
            self.reverse_s_edge,
            self.reverse_t_edge,
        );
        route.replace(problem, jobs.into_iter(), self.s_rank, self.t_rank + 2);
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
    fn test_swap_edges_within_route() {
        let problem = test_utils::line_problem(&[1, 1, 1, 1, 1], 0, None, None);
        let (mut solution, state) =
            test_utils::solution_with_routes(&problem, &[&[3, 4, 2, 0, 1]]);

        // Swap the edges (3, 4) and (0, 1).
        let operator =
            IntraCrossExchangeOperator::new(&problem, &solution, VehicleIdx::new(0), 0, 3);

        assert!(operator.is_valid(&problem, &solution, &state));
        assert!(operator.gain() > 0);

        let before = solution.total_cost(&problem);
        operator.apply(&problem, &mut solution);

        assert_eq!(solution.total_cost(&problem), before - operator.gain());
        assert_eq!(route_jobs(&solution, 0), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_adjacent_edges() {
        let problem = test_utils::line_problem(&[1, 1, 1, 1], 0, None, None);
        let (mut solution, _state) =
            test_utils::solution_with_routes(&problem, &[&[2, 3, 0, 1]]);

        let operator =
            IntraCrossExchangeOperator::new(&problem, &solution, VehicleIdx::new(0), 0, 2);

        let before = solution.total_cost(&problem);
        operator.apply(&problem, &mut solution);

        assert_eq!(solution.total_cost(&problem), before - operator.gain());
        assert_eq!(route_jobs(&solution, 0), vec![0, 1, 2, 3]);
    }
}
