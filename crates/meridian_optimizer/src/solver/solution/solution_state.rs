use fxhash::{FxHashMap, FxHashSet};

use crate::{
    problem::{amount::Amount, job::JobIdx, vehicle::VehicleIdx, Gain, VehicleRoutingProblem},
    solver::{output::UnassignedReason, solution::working_solution::WorkingSolution},
};

/// Per-trajectory caches derived from the current routes. Rebuilt from
/// scratch once per trajectory, then refreshed per vehicle id after each
/// applied move. Read-only while operators are being evaluated.
pub struct SolutionState {
    // Prefix/suffix sums of job demands along each route, inclusive.
    fwd_amounts: Vec<Vec<Amount>>,
    bwd_amounts: Vec<Vec<Amount>>,

    // edge_costs_around_node[v][r]: cost of the edge entering rank r plus the
    // edge leaving it, vehicle start/end included where present. The
    // precomputed removal term when taking the single job at r out.
    edge_costs_around_node: Vec<Vec<Gain>>,

    // edge_costs_around_edge[v][r]: cost of the edge entering rank r plus the
    // edge leaving rank r + 1. The removal term for the edge (r, r + 1).
    edge_costs_around_edge: Vec<Vec<Gain>>,

    // nearest_job_rank_in_routes[v1][v2][r]: rank in route v2 whose job is
    // closest (symmetrized cost) to the job at rank r of route v1.
    nearest_job_rank_in_routes: Vec<Vec<Vec<usize>>>,

    unassigned: FxHashSet<JobIdx>,
    unassigned_reasons: FxHashMap<JobIdx, UnassignedReason>,
}

impl SolutionState {
    pub fn new(problem: &VehicleRoutingProblem) -> Self {
        let nb_vehicles = problem.vehicles().len();

        SolutionState {
            fwd_amounts: vec![Vec::new(); nb_vehicles],
            bwd_amounts: vec![Vec::new(); nb_vehicles],
            edge_costs_around_node: vec![Vec::new(); nb_vehicles],
            edge_costs_around_edge: vec![Vec::new(); nb_vehicles],
            nearest_job_rank_in_routes: vec![vec![Vec::new(); nb_vehicles]; nb_vehicles],
            unassigned: (0..problem.jobs().len()).map(JobIdx::new).collect(),
            unassigned_reasons: FxHashMap::default(),
        }
    }

    pub fn full_update(&mut self, problem: &VehicleRoutingProblem, solution: &WorkingSolution) {
        for v in 0..solution.routes().len() {
            self.update_route_tables(problem, solution, VehicleIdx::new(v));
        }
        for v1 in 0..solution.routes().len() {
            for v2 in 0..solution.routes().len() {
                self.update_nearest_for_pair(
                    problem,
                    solution,
                    VehicleIdx::new(v1),
                    VehicleIdx::new(v2),
                );
            }
        }
    }

    /// Refreshes every entry keyed on the given vehicle id.
    pub fn update_route(
        &mut self,
        problem: &VehicleRoutingProblem,
        solution: &WorkingSolution,
        vehicle: VehicleIdx,
    ) {
        self.update_route_tables(problem, solution, vehicle);
        for other in 0..solution.routes().len() {
            let other = VehicleIdx::new(other);
            self.update_nearest_for_pair(problem, solution, vehicle, other);
            self.update_nearest_for_pair(problem, solution, other, vehicle);
        }
    }

    fn update_route_tables(
        &mut self,
        problem: &VehicleRoutingProblem,
        solution: &WorkingSolution,
        vehicle: VehicleIdx,
    ) {
        let route = solution.route(vehicle);
        let len = route.len();
        let v = vehicle.get();

        let fwd = &mut self.fwd_amounts[v];
        fwd.clear();
        let mut running = Amount::with_dimensions(problem.amount_dimensions());
        for rank in 0..len {
            running += problem.job(route.at(rank)).amount();
            fwd.push(running.clone());
        }

        let bwd = &mut self.bwd_amounts[v];
        bwd.clear();
        bwd.resize(len, Amount::empty());
        let mut running = Amount::with_dimensions(problem.amount_dimensions());
        for rank in (0..len).rev() {
            running += problem.job(route.at(rank)).amount();
            bwd[rank] = running.clone();
        }

        let around_node = &mut self.edge_costs_around_node[v];
        around_node.clear();
        for rank in 0..len {
            let previous = route.previous_index(problem, rank);
            let location = route.location(problem, rank);
            let next = route.next_index(problem, rank);
            around_node.push(
                problem.cost_or_zero(previous, Some(location))
                    + problem.cost_or_zero(Some(location), next),
            );
        }

        let around_edge = &mut self.edge_costs_around_edge[v];
        around_edge.clear();
        for rank in 0..len.saturating_sub(1) {
            let previous = route.previous_index(problem, rank);
            let first = route.location(problem, rank);
            let second = route.location(problem, rank + 1);
            let next = route.next_index(problem, rank + 1);
            around_edge.push(
                problem.cost_or_zero(previous, Some(first))
                    + problem.cost_or_zero(Some(second), next),
            );
        }
    }

    fn update_nearest_for_pair(
        &mut self,
        problem: &VehicleRoutingProblem,
        solution: &WorkingSolution,
        v1: VehicleIdx,
        v2: VehicleIdx,
    ) {
        let table = &mut self.nearest_job_rank_in_routes[v1.get()][v2.get()];
        table.clear();

        if v1 == v2 {
            return;
        }
        let r1 = solution.route(v1);
        let r2 = solution.route(v2);
        if r1.is_empty() || r2.is_empty() {
            return;
        }

        for rank in 0..r1.len() {
            let from = r1.location(problem, rank);
            let nearest = (0..r2.len())
                .min_by_key(|&candidate| {
                    let to = r2.location(problem, candidate);
                    u64::from(problem.cost(from, to)) + u64::from(problem.cost(to, from))
                })
                .unwrap();
            table.push(nearest);
        }
    }

    pub fn fwd_amount(&self, vehicle: VehicleIdx, rank: usize) -> &Amount {
        &self.fwd_amounts[vehicle.get()][rank]
    }

    pub fn bwd_amount(&self, vehicle: VehicleIdx, rank: usize) -> &Amount {
        &self.bwd_amounts[vehicle.get()][rank]
    }

    /// Total demand carried by the route of the given vehicle.
    pub fn route_amount(&self, vehicle: VehicleIdx) -> Amount {
        self.fwd_amounts[vehicle.get()]
            .last()
            .cloned()
            .unwrap_or_default()
    }

    pub fn edge_cost_around_node(&self, vehicle: VehicleIdx, rank: usize) -> Gain {
        self.edge_costs_around_node[vehicle.get()][rank]
    }

    pub fn edge_cost_around_edge(&self, vehicle: VehicleIdx, rank: usize) -> Gain {
        self.edge_costs_around_edge[vehicle.get()][rank]
    }

    pub fn nearest_rank(&self, v1: VehicleIdx, v2: VehicleIdx, rank: usize) -> Option<usize> {
        self.nearest_job_rank_in_routes[v1.get()][v2.get()]
            .get(rank)
            .copied()
    }

    pub fn unassigned(&self) -> &FxHashSet<JobIdx> {
        &self.unassigned
    }

    /// Unassigned jobs in index order, for deterministic iteration.
    pub fn sorted_unassigned(&self) -> Vec<JobIdx> {
        let mut jobs: Vec<JobIdx> = self.unassigned.iter().copied().collect();
        jobs.sort_unstable();
        jobs
    }

    pub fn is_unassigned(&self, job: JobIdx) -> bool {
        self.unassigned.contains(&job)
    }

    pub fn set_assigned(&mut self, job: JobIdx) {
        self.unassigned.remove(&job);
        self.unassigned_reasons.remove(&job);
    }

    pub fn set_unassigned(&mut self, job: JobIdx) {
        self.unassigned.insert(job);
    }

    pub fn set_unassigned_reason(&mut self, job: JobIdx, reason: UnassignedReason) {
        self.unassigned_reasons.insert(job, reason);
    }

    pub fn unassigned_reason(&self, job: JobIdx) -> Option<UnassignedReason> {
        self.unassigned_reasons.get(&job).copied()
    }

    /// Rebuilds the unassigned set from the given solution, e.g. after the
    /// driver reverted to an earlier copy of the routes.
    pub fn sync_unassigned(
        &mut self,
        problem: &VehicleRoutingProblem,
        solution: &WorkingSolution,
    ) {
        let assigned: FxHashSet<JobIdx> = solution
            .routes()
            .iter()
            .flat_map(|route| route.jobs().iter().copied())
            .collect();

        self.unassigned = (0..problem.jobs().len())
            .map(JobIdx::new)
            .filter(|job| !assigned.contains(job))
            .collect();

        let unassigned = &self.unassigned;
        self.unassigned_reasons
            .retain(|job, _| unassigned.contains(job));
    }
}
