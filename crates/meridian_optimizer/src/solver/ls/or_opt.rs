use crate::{
    problem::{job::JobIdx, vehicle::VehicleIdx, Gain, VehicleRoutingProblem},
    solver::{
        ls::r#move::LocalSearchOperator,
        solution::{solution_state::SolutionState, working_solution::WorkingSolution},
    },
};

/// **Or-Opt**
///
/// Moves an edge (two consecutive jobs) from the source route to an insertion
/// point in the target route. The edge enters the target either in its
/// original orientation or reversed, whichever gains more; ties keep the
/// original orientation.
///
/// ```text
/// BEFORE:
///    source: ... (A) -> [J1 -> J2] -> (B) ...
///    target: ... (X) -> (Y) ...
///
/// AFTER:
///    source: ... (A) -> (B) ...
///    target: ... (X) -> [J1 -> J2] -> (Y) ...     (or J2 -> J1)
/// ```
#[derive(Debug)]
pub struct OrOptOperator {
    s_vehicle: VehicleIdx,
    s_rank: usize,
    t_vehicle: VehicleIdx,
    t_rank: usize,
    reverse_segment: bool,
    gain: Gain,
}

impl OrOptOperator {
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
            panic!("Or-Opt is an inter-route operator");
        }

        let s_route = solution.route(s_vehicle);
        let t_route = solution.route(t_vehicle);
        assert!(s_rank + 1 < s_route.len());
        assert!(t_rank <= t_route.len());

        let first = s_route.location(problem, s_rank);
        let second = s_route.location(problem, s_rank + 1);

        let s_gain = state.edge_cost_around_edge(s_vehicle, s_rank)
            + Gain::from(problem.cost(first, second))
            - problem.cost_or_zero(
                s_route.previous_index(problem, s_rank),
                s_route.next_index(problem, s_rank + 1),
            );

        let t_previous = t_route.previous_index(problem, t_rank);
        let t_next = t_route.insertion_next_index(problem, t_rank);
        let closing = problem.cost_or_zero(t_previous, t_next);

        let normal_t_gain = closing
            - problem.cost_or_zero(t_previous, Some(first))
            - Gain::from(problem.cost(first, second))
            - problem.cost_or_zero(Some(second), t_next);
        let reversed_t_gain = closing
            - problem.cost_or_zero(t_previous, Some(second))
            - Gain::from(problem.cost(second, first))
            - problem.cost_or_zero(Some(first), t_next);

        let reverse_segment = reversed_t_gain > normal_t_gain;

        OrOptOperator {
            s_vehicle,
            s_rank,
            t_vehicle,
            t_rank,
            reverse_segment,
            gain: s_gain + normal_t_gain.max(reversed_t_gain),
        }
    }

    fn segment(&self, solution: &WorkingSolution) -> [JobIdx; 2] {
        let route = solution.route(self.s_vehicle);
        let (first, second) = (route.at(self.s_rank), route.at(self.s_rank + 1));
        if self.reverse_segment {
            [second, first]
        } else {
            [first, second]
        }
    }
}

impl LocalSearchOperator for OrOptOperator {
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
        if s_len < 2 {
            return;
        }

        for s_rank in 0..s_len - 1 {
            for t_rank in 0..=t_len {
                consumer(OrOptOperator::new(
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
        let first = s_route.at(self.s_rank);
        let second = s_route.at(self.s_rank + 1);

        if !problem.vehicle_ok_with_job(self.t_vehicle, first)
            || !problem.vehicle_ok_with_job(self.t_vehicle, second)
        {
            return false;
        }

        let mut amount = state.route_amount(self.t_vehicle);
        amount += problem.job(first).amount();
        amount += problem.job(second).amount();
        if !amount.fits_in(problem.vehicle(self.t_vehicle).capacity()) {
            return false;
        }

        // Dropping the edge can break the source route's end-of-route bound
        // when the return leg grows.
        solution.route(self.s_vehicle).is_valid_addition_for_tw(
            problem,
            std::iter::empty(),
            self.s_rank,
            self.s_rank + 2,
        ) && solution.route(self.t_vehicle).is_valid_addition_for_tw(
            problem,
            self.segment(solution).into_iter(),
            self.t_rank,
            self.t_rank,
        )
    }

    fn apply(&self, problem: &VehicleRoutingProblem, solution: &mut WorkingSolution) {
        let segment = self.segment(solution);
        let (s_route, t_route) = solution.route_pair_mut(self.s_vehicle, self.t_vehicle);

        s_route.replace(problem, std::iter::empty(), self.s_rank, self.s_rank + 2);
        t_route.replace(problem, segment.into_iter(), self.t_rank, self.t_rank);
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
    fn test_or_opt_moves_edge() {
        let problem = test_utils::line_problem_with_vehicles(&[1, 1, 1, 1], 2);
        let (mut solution, state) =
            test_utils::solution_with_routes(&problem, &[&[0, 2, 3], &[1]]);

        // Moving the edge (2, 3) after job 1 empties nothing but shortens
        // route 0 considerably.
        let operator = OrOptOperator::new(
            &problem,
            &solution,
            &state,
            VehicleIdx::new(0),
            1,
            VehicleIdx::new(1),
            1,
        );

        assert!(operator.is_valid(&problem, &solution, &state));

        let before = solution.total_cost(&problem);
        operator.apply(&problem, &mut solution);

        assert_eq!(solution.total_cost(&problem), before - operator.gain());
        assert_eq!(route_jobs(&solution, 0), vec![0]);
        assert_eq!(route_jobs(&solution, 1), vec![1, 2, 3]);
    }

    #[test]
    fn test_or_opt_picks_reversed_orientation() {
        // Asymmetric matrix rewarding the reversed segment at the target:
        // the edge (job 0 -> job 1) is cheap to traverse backwards.
        let jobs = vec![
            test_utils::basic_job(1, 1),
            test_utils::basic_job(2, 2),
            test_utils::basic_job(3, 3),
        ];
        let vehicles = vec![
            test_utils::basic_vehicle(0, Some(0)),
            test_utils::basic_vehicle(1, Some(0)),
        ];
        let problem = test_utils::custom_problem(
            vec![
                vec![0, 10, 1, 1],
                vec![1, 0, 50, 1],
                vec![1, 1, 0, 1],
                vec![1, 10, 1, 0],
            ],
            jobs,
            vehicles,
        );

        let (mut solution, state) = test_utils::solution_with_routes(&problem, &[&[0, 1], &[2]]);

        let operator = OrOptOperator::new(
            &problem,
            &solution,
            &state,
            VehicleIdx::new(0),
            0,
            VehicleIdx::new(1),
            1,
        );

        let before = solution.total_cost(&problem);
        operator.apply(&problem, &mut solution);

        // The orientation choice is reflected in the realized cost.
        assert_eq!(solution.total_cost(&problem), before - operator.gain());
        assert_eq!(route_jobs(&solution, 0), Vec::<usize>::new());
        assert_eq!(route_jobs(&solution, 1), vec![2, 1, 0]);
    }
}
