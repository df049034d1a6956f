use crate::{
    problem::{job::JobIdx, vehicle::VehicleIdx, Gain, VehicleRoutingProblem},
    solver::{
        ls::{chain_cost, r#move::LocalSearchOperator},
        solution::{solution_state::SolutionState, working_solution::WorkingSolution},
    },
};

/// **Intra-Exchange**
///
/// Swaps two jobs of the same route, `s_rank < t_rank`.
///
/// ```text
/// BEFORE:
///    ... (A) -> [J1] -> (B) ... (X) -> [J2] -> (Y) ...
///
/// AFTER:
///    ... (A) -> [J2] -> (B) ... (X) -> [J1] -> (Y) ...
/// ```
#[derive(Debug)]
pub struct IntraExchangeOperator {
    vehicle: VehicleIdx,
    s_rank: usize,
    t_rank: usize,
    gain: Gain,
}

impl IntraExchangeOperator {
    pub fn new(
        problem: &VehicleRoutingProblem,
        solution: &WorkingSolution,
        vehicle: VehicleIdx,
        s_rank: usize,
        t_rank: usize,
    ) -> Self {
        if s_rank >= t_rank {
            panic!("Intra-Exchange requires s_rank < t_rank");
        }

        let route = solution.route(vehicle);
        assert!(t_rank < route.len());

        let previous = route.previous_index(problem, s_rank);
        let next = route.next_index(problem, t_rank);

        let old_cost = chain_cost(
            problem,
            previous,
            route.iter_range(s_rank, t_rank + 1),
            next,
        );
        let new_cost = chain_cost(
            problem,
            previous,
            Self::swapped(route.jobs(), s_rank, t_rank),
            next,
        );

        IntraExchangeOperator {
            vehicle,
            s_rank,
            t_rank,
            gain: old_cost - new_cost,
        }
    }

    fn swapped(
        jobs: &[JobIdx],
        s_rank: usize,
        t_rank: usize,
    ) -> impl Iterator<Item = JobIdx> + Clone + '_ {
        std::iter::once(jobs[t_rank])
            .chain(jobs[s_rank + 1..t_rank].iter().copied())
            .chain(std::iter::once(jobs[s_rank]))
    }
}

impl LocalSearchOperator for IntraExchangeOperator {
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
                consumer(IntraExchangeOperator::new(
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
            Self::swapped(route.jobs(), self.s_rank, self.t_rank),
            self.s_rank,
            self.t_rank + 1,
        )
    }

    fn apply(&self, problem: &VehicleRoutingProblem, solution: &mut WorkingSolution) {
        let route = solution.route_mut(self.vehicle);
        let jobs: Vec<_> = Self::swapped(route.jobs(), self.s_rank, self.t_rank).collect();
        route.replace(problem, jobs.into_iter(), self.s_rank, self.t_rank + 1);
    }

    fn addition_candidates(&self) -> Vec<VehicleIdx> {
        vec![self.vehicle]
    }

    fn update_candidates(&self) -> Vec<VehicleIdx> {
        vec![self.vehicle]
    }
}
