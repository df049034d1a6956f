use crate::{
    problem::{job::JobIdx, vehicle::VehicleIdx, Gain, VehicleRoutingProblem},
    solver::{
        ls::r#move::LocalSearchOperator,
        solution::{solution_state::SolutionState, working_solution::WorkingSolution},
    },
};

/// **Mixed-Exchange**
///
/// Swaps a single job of the source route against an edge of the target
/// route. The edge may enter the source route reversed.
///
/// ```text
/// BEFORE:
///    source: ... (A) -> [J] -> (B) ...
///    target: ... (X) -> [T1 -> T2] -> (Y) ...
///
/// AFTER:
///    source: ... (A) -> [T1 -> T2] -> (B) ...     (or T2 -> T1)
///    target: ... (X) -> [J] -> (Y) ...
/// ```
#[derive(Debug)]
pub struct MixedExchangeOperator {
    s_vehicle: VehicleIdx,
    s_rank: usize,
    t_vehicle: VehicleIdx,
    t_rank: usize,
    reverse_t_edge: bool,
    gain: Gain,
}

impl MixedExchangeOperator {
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
            panic!("Mixed-Exchange is an inter-route operator");
        }

        let s_route = solution.route(s_vehicle);
        let t_route = solution.route(t_vehicle);
        assert!(s_rank < s_route.len());
        assert!(t_rank + 1 < t_route.len());

        let s_location = s_route.location(problem, s_rank);
        let t_first = t_route.location(problem, t_rank);
        let t_second = t_route.location(problem, t_rank + 1);

        // Source side: the single job makes room for the target edge.
        let s_previous = s_route.previous_index(problem, s_rank);
        let s_next = s_route.next_index(problem, s_rank);

        let normal_cost = problem.cost_or_zero(s_previous, Some(t_first))
            + Gain::from(problem.cost(t_first, t_second))
            + problem.cost_or_zero(Some(t_second), s_next);
        let reversed_cost = problem.cost_or_zero(s_previous, Some(t_second))
            + Gain::from(problem.cost(t_second, t_first))
            + problem.cost_or_zero(Some(t_first), s_next);

        let normal_s_gain = state.edge_cost_around_node(s_vehicle, s_rank) - normal_cost;
        let reversed_s_gain = state.edge_cost_around_node(s_vehicle, s_rank) - reversed_cost;
        let reverse_t_edge = reversed_s_gain > normal_s_gain;

        // Target side: the edge makes room for the single job, freeing its
        // interior cost as well.
        let t_previous = t_route.previous_index(problem, t_rank);
        let t_next = t_route.next_index(problem, t_rank + 1);

        let t_gain = state.edge_cost_around_edge(t_vehicle, t_rank)
            + Gain::from(problem.cost(t_first, t_second))
            - problem.cost_or_zero(t_previous, Some(s_location))
            - problem.cost_or_zero(Some(s_location), t_next);

        MixedExchangeOperator {
            s_vehicle,
            s_rank,
            t_vehicle,
            t_rank,
            reverse_t_edge,
            gain: normal_s_gain.max(reversed_s_gain) + t_gain,
        }
    }

    fn t_edge(&self, solution: &WorkingSolution) -> [JobIdx; 2] {
        let route = solution.route(self.t_vehicle);
        let (first, second) = (route.at(self.t_rank), route.at(self.t_rank + 1));
        if self.reverse_t_edge {
            [second, first]
        } else {
            [first, second]
        }
    }
}

impl LocalSearchOperator for MixedExchangeOperator {
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
        if s_len < 1 || t_len < 2 {
            return;
        }

        for s_rank in 0..s_len {
            for t_rank in 0..t_len - 1 {
                consumer(MixedExchangeOperator::new(
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
        let t_first = t_route.at(self.t_rank);
        let t_second = t_route.at(self.t_rank + 1);

        if !problem.vehicle_ok_with_job(self.s_vehicle, t_first)
            || !problem.vehicle_ok_with_job(self.s_vehicle, t_second)
            || !problem.vehicle_ok_with_job(self.t_vehicle, s_job)
        {
            return false;
        }

        let mut s_amount = state.route_amount(self.s_vehicle);
        s_amount -= problem.job(s_job).amount();
        s_amount += problem.job(t_first).amount();
        s_amount += problem.job(t_second).amount();
        if !s_amount.fits_in(problem.vehicle(self.s_vehicle).capacity()) {
            return false;
        }

        let mut t_amount = state.route_amount(self.t_vehicle);
        t_amount -= problem.job(t_first).amount();
        t_amount -= problem.job(t_second).amount();
        t_amount += problem.job(s_job).amount();
        if !t_amount.fits_in(problem.vehicle(self.t_vehicle).capacity()) {
            return false;
        }

        s_route.is_valid_addition_for_tw(
            problem,
            self.t_edge(solution).into_iter(),
            self.s_rank,
            self.s_rank + 1,
        ) && t_route.is_valid_addition_for_tw(
            problem,
            std::iter::once(s_job),
            self.t_rank,
            self.t_rank + 2,
        )
    }

    fn apply(&self, problem: &VehicleRoutingProblem, solution: &mut WorkingSolution) {
        let t_edge = self.t_edge(solution);
        let (s_route, t_route) = solution.route_pair_mut(self.s_vehicle, self.t_vehicle);
        let s_job = s_route.at(self.s_rank);

        s_route.replace(problem, t_edge.into_iter(), self.s_rank, self.s_rank + 1);
        t_route.replace(problem, std::iter::once(s_job), self.t_rank, self.t_rank + 2);
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
    fn test_mixed_exchange_swaps_job_against_edge() {
        let problem = test_utils::line_problem_with_vehicles(&[1, 1, 1, 1, 1], 2);
        let (mut solution, state) =
            test_utils::solution_with_routes(&problem, &[&[0, 3, 4], &[2, 1]]);

        // Swap job 0 (route 0) against the edge (2, 1) of route 1.
        let operator = MixedExchangeOperator::new(
            &problem,
            &solution,
            &state,
            VehicleIdx::new(0),
            0,
            VehicleIdx::new(1),
            0,
        );

        assert!(operator.is_valid(&problem, &solution, &state));

        let before = solution.total_cost(&problem);
        operator.apply(&problem, &mut solution);

        assert_eq!(solution.total_cost(&problem), before - operator.gain());
        // The edge enters route 0 reversed, restoring line order.
        assert_eq!(route_jobs(&solution, 0), vec![1, 2, 3, 4]);
        assert_eq!(route_jobs(&solution, 1), vec![0]);
    }
}
