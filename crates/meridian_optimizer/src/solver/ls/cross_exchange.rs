use crate::{
    problem::{job::JobIdx, vehicle::VehicleIdx, Gain, VehicleRoutingProblem},
    solver::{
        ls::r#move::LocalSearchOperator,
        solution::{solution_state::SolutionState, working_solution::WorkingSolution},
    },
};

/// **Cross-Exchange**
///
/// Swaps one edge of the source route against one edge of the target route.
/// Each edge may enter the other route reversed; the four orientations are
/// evaluated independently per side and ties prefer the normal orientation.
///
/// ```text
/// BEFORE:
///    source: ... (A) -> [S1 -> S2] -> (B) ...
///    target: ... (X) -> [T1 -> T2] -> (Y) ...
///
/// AFTER:
///    source: ... (A) -> [T1 -> T2] -> (B) ...      (or T2 -> T1)
///    target: ... (X) -> [S1 -> S2] -> (Y) ...      (or S2 -> S1)
/// ```
#[derive(Debug)]
pub struct CrossExchangeOperator {
    s_vehicle: VehicleIdx,
    s_rank: usize,
    t_vehicle: VehicleIdx,
    t_rank: usize,
    // The source edge enters the target route reversed.
    reverse_s_edge: bool,
    // The target edge enters the source route reversed.
    reverse_t_edge: bool,
    gain: Gain,
}

impl CrossExchangeOperator {
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
            panic!("Cross-Exchange is an inter-route operator");
        }

        let s_route = solution.route(s_vehicle);
        let t_route = solution.route(t_vehicle);
        assert!(s_rank + 1 < s_route.len());
        assert!(t_rank + 1 < t_route.len());

        let s_first = s_route.location(problem, s_rank);
        let s_second = s_route.location(problem, s_rank + 1);
        let t_first = t_route.location(problem, t_rank);
        let t_second = t_route.location(problem, t_rank + 1);

        // Source side: replace the source edge with the target edge. The
        // adjacent-edge removal term is precomputed; the interior costs of
        // both edges cancel across the two sides in the normal orientation,
        // and the reversal correction accounts for flipping the edge.
        let s_previous = s_route.previous_index(problem, s_rank);
        let s_next = s_route.next_index(problem, s_rank + 1);

        let previous_cost = problem.cost_or_zero(s_previous, Some(t_first));
        let next_cost = problem.cost_or_zero(Some(t_second), s_next);
        let reverse_previous_cost = problem.cost_or_zero(s_previous, Some(t_second));
        let reverse_next_cost = problem.cost_or_zero(Some(t_first), s_next);

        let normal_s_gain =
            state.edge_cost_around_edge(s_vehicle, s_rank) - previous_cost - next_cost;
        let reverse_edge_cost =
            Gain::from(problem.cost(t_first, t_second)) - Gain::from(problem.cost(t_second, t_first));
        let reversed_s_gain = state.edge_cost_around_edge(s_vehicle, s_rank) + reverse_edge_cost
            - reverse_previous_cost
            - reverse_next_cost;

        let reverse_t_edge = reversed_s_gain > normal_s_gain;

        // Target side: replace the target edge with the source edge.
        let t_previous = t_route.previous_index(problem, t_rank);
        let t_next = t_route.next_index(problem, t_rank + 1);

        let previous_cost = problem.cost_or_zero(t_previous, Some(s_first));
        let next_cost = problem.cost_or_zero(Some(s_second), t_next);
        let reverse_previous_cost = problem.cost_or_zero(t_previous, Some(s_second));
        let reverse_next_cost = problem.cost_or_zero(Some(s_first), t_next);

        let normal_t_gain =
            state.edge_cost_around_edge(t_vehicle, t_rank) - previous_cost - next_cost;
        let reverse_edge_cost =
            Gain::from(problem.cost(s_first, s_second)) - Gain::from(problem.cost(s_second, s_first));
        let reversed_t_gain = state.edge_cost_around_edge(t_vehicle, t_rank) + reverse_edge_cost
            - reverse_previous_cost
            - reverse_next_cost;

        let reverse_s_edge = reversed_t_gain > normal_t_gain;

        CrossExchangeOperator {
            s_vehicle,
            s_rank,
            t_vehicle,
            t_rank,
            reverse_s_edge,
            reverse_t_edge,
            gain: normal_s_gain.max(reversed_s_gain) + normal_t_gain.max(reversed_t_gain),
        }
    }

    fn s_edge(&self, solution: &WorkingSolution) -> [JobIdx; 2] {
        let route = solution.route(self.s_vehicle);
        let (first, second) = (route.at(self.s_rank), route.at(self.s_rank + 1));
        if self.reverse_s_edge {
            [second, first]
        } else {
            [first, second]
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

impl LocalSearchOperator for CrossExchangeOperator {
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
        if s_len < 2 || t_len < 2 {
            return;
        }

        for s_rank in 0..s_len - 1 {
            for t_rank in 0..t_len - 1 {
                consumer(CrossExchangeOperator::new(
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
        let s_first = s_route.at(self.s_rank);
        let s_second = s_route.at(self.s_rank + 1);
        let t_first = t_route.at(self.t_rank);
        let t_second = t_route.at(self.t_rank + 1);

        if !problem.vehicle_ok_with_job(self.t_vehicle, s_first)
            || !problem.vehicle_ok_with_job(self.t_vehicle, s_second)
            || !problem.vehicle_ok_with_job(self.s_vehicle, t_first)
            || !problem.vehicle_ok_with_job(self.s_vehicle, t_second)
        {
            return false;
        }

        let mut s_amount = state.route_amount(self.s_vehicle);
        s_amount -= problem.job(s_first).amount();
        s_amount -= problem.job(s_second).amount();
        s_amount += problem.job(t_first).amount();
        s_amount += problem.job(t_second).amount();
        if !s_amount.fits_in(problem.vehicle(self.s_vehicle).capacity()) {
            return false;
        }

        let mut t_amount = state.route_amount(self.t_vehicle);
        t_amount -= problem.job(t_first).amount();
        t_amount -= problem.job(t_second).amount();
        t_amount += problem.job(s_first).amount();
        t_amount += problem.job(s_second).amount();
        if !t_amount.fits_in(problem.vehicle(self.t_vehicle).capacity()) {
            return false;
        }

        s_route.is_valid_addition_for_tw(
            problem,
            self.t_edge(solution).into_iter(),
            self.s_rank,
            self.s_rank + 2,
        ) && t_route.is_valid_addition_for_tw(
            problem,
            self.s_edge(solution).into_iter(),
            self.t_rank,
            self.t_rank + 2,
        )
    }

    fn apply(&self, problem: &VehicleRoutingProblem, solution: &mut WorkingSolution) {
        let s_edge = self.s_edge(solution);
        let t_edge = self.t_edge(solution);
        let (s_route, t_route) = solution.route_pair_mut(self.s_vehicle, self.t_vehicle);

        s_route.replace(problem, t_edge.into_iter(), self.s_rank, self.s_rank + 2);
        t_route.replace(problem, s_edge.into_iter(), self.t_rank, self.t_rank + 2);
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
    fn test_cross_exchange_swaps_edges() {
        let problem = test_utils::line_problem_with_vehicles(&[1, 1, 1, 1, 1, 1], 2);
        let (mut solution, state) =
            test_utils::solution_with_routes(&problem, &[&[0, 4, 5, 3], &[2, 1]]);

        // Swapping edge (4, 5) of route 0 against edge (2, 1) of route 1
        // brings both routes closer to sorted order.
        let operator = CrossExchangeOperator::new(
            &problem,
            &solution,
            &state,
            VehicleIdx::new(0),
            1,
            VehicleIdx::new(1),
            0,
        );

        assert!(operator.is_valid(&problem, &solution, &state));

        let before = solution.total_cost(&problem);
        operator.apply(&problem, &mut solution);

        assert_eq!(solution.total_cost(&problem), before - operator.gain());
        // The target edge enters route 0 reversed to keep the line order.
        assert_eq!(route_jobs(&solution, 0), vec![0, 1, 2, 3]);
        assert_eq!(route_jobs(&solution, 1), vec![4, 5]);
    }

    #[test]
    fn test_cross_exchange_gain_is_idempotent() {
        let problem = test_utils::line_problem_with_vehicles(&[2, 3, 1, 4], 2);
        let (solution, state) =
            test_utils::solution_with_routes(&problem, &[&[0, 1], &[2, 3]]);

        let make = || {
            CrossExchangeOperator::new(
                &problem,
                &solution,
                &state,
                VehicleIdx::new(0),
                0,
                VehicleIdx::new(1),
                0,
            )
        };

        assert_eq!(make().gain(), make().gain());
    }
}
