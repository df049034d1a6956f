use crate::{
    problem::{job::JobIdx, vehicle::VehicleIdx, Gain, VehicleRoutingProblem},
    solver::solution::tw_route::TwRoute,
};

/// The mutable routing plan of one trajectory: exactly one route per vehicle,
/// empty routes included.
#[derive(Debug, Clone)]
pub struct WorkingSolution {
    routes: Vec<TwRoute>,
}

impl WorkingSolution {
    pub fn new(problem: &VehicleRoutingProblem) -> Self {
        let routes = (0..problem.vehicles().len())
            .map(|v| TwRoute::empty(VehicleIdx::new(v)))
            .collect();

        WorkingSolution { routes }
    }

    pub fn routes(&self) -> &[TwRoute] {
        &self.routes
    }

    pub fn route(&self, vehicle: VehicleIdx) -> &TwRoute {
        &self.routes[vehicle.get()]
    }

    pub fn route_mut(&mut self, vehicle: VehicleIdx) -> &mut TwRoute {
        &mut self.routes[vehicle.get()]
    }

    /// Mutable access to two distinct routes at once, for inter-route moves.
    pub fn route_pair_mut(
        &mut self,
        first: VehicleIdx,
        second: VehicleIdx,
    ) -> (&mut TwRoute, &mut TwRoute) {
        assert_ne!(first, second);

        let (low, high) = (first.get().min(second.get()), first.get().max(second.get()));
        let (head, tail) = self.routes.split_at_mut(high);
        if first.get() < second.get() {
            (&mut head[low], &mut tail[0])
        } else {
            (&mut tail[0], &mut head[low])
        }
    }

    pub fn route_cost(&self, problem: &VehicleRoutingProblem, vehicle: VehicleIdx) -> Gain {
        let route = &self.routes[vehicle.get()];
        if route.is_empty() {
            return 0;
        }

        let mut cost = problem.cost_or_zero(
            problem.vehicle(vehicle).start_index(),
            Some(route.location(problem, 0)),
        );
        for rank in 1..route.len() {
            cost += Gain::from(problem.cost(
                route.location(problem, rank - 1),
                route.location(problem, rank),
            ));
        }
        cost += problem.cost_or_zero(
            Some(route.location(problem, route.len() - 1)),
            problem.vehicle(vehicle).end_index(),
        );

        cost
    }

    pub fn total_cost(&self, problem: &VehicleRoutingProblem) -> Gain {
        (0..self.routes.len())
            .map(|v| self.route_cost(problem, VehicleIdx::new(v)))
            .sum()
    }

    pub fn assigned_count(&self) -> usize {
        self.routes.iter().map(TwRoute::len).sum()
    }

    pub fn unassigned_count(&self, problem: &VehicleRoutingProblem) -> usize {
        problem.jobs().len() - self.assigned_count()
    }

    pub fn route_of_job(&self, job: JobIdx) -> Option<(VehicleIdx, usize)> {
        self.routes.iter().enumerate().find_map(|(v, route)| {
            route
                .jobs()
                .iter()
                .position(|&j| j == job)
                .map(|rank| (VehicleIdx::new(v), rank))
        })
    }

    /// Same job sequences on the same vehicles.
    pub fn is_identical(&self, other: &WorkingSolution) -> bool {
        self.routes.len() == other.routes.len()
            && self
                .routes
                .iter()
                .zip(&other.routes)
                .all(|(a, b)| a.vehicle() == b.vehicle() && a.jobs() == b.jobs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    #[test]
    fn test_route_cost_closed_route() {
        // Depot at 0, jobs at 1 and 2 on a line, unit spacing.
        let problem = test_utils::line_problem(&[1, 1], 0, None, None);
        let (solution, _) = test_utils::solution_with_routes(&problem, &[&[0, 1]]);

        // 0 -> 1 -> 2 -> 0: 1 + 1 + 2.
        assert_eq!(solution.route_cost(&problem, VehicleIdx::new(0)), 4);
        assert_eq!(solution.total_cost(&problem), 4);
    }

    #[test]
    fn test_route_of_job() {
        let problem = test_utils::line_problem(&[1, 1, 1], 0, None, None);
        let (solution, _) = test_utils::solution_with_routes(&problem, &[&[2, 0, 1]]);

        assert_eq!(
            solution.route_of_job(JobIdx::new(0)),
            Some((VehicleIdx::new(0), 1))
        );
        assert_eq!(
            solution.route_of_job(JobIdx::new(2)),
            Some((VehicleIdx::new(0), 0))
        );
    }

    #[test]
    fn test_is_identical() {
        let problem = test_utils::line_problem(&[1, 1], 0, None, None);
        let (a, _) = test_utils::solution_with_routes(&problem, &[&[0, 1]]);
        let (b, _) = test_utils::solution_with_routes(&problem, &[&[0, 1]]);
        let (c, _) = test_utils::solution_with_routes(&problem, &[&[1, 0]]);

        assert!(a.is_identical(&b));
        assert!(!a.is_identical(&c));
    }
}
