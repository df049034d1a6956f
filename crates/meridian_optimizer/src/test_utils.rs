use crate::{
    problem::{
        amount::Amount,
        cost_matrix::CostMatrix,
        job::{Job, JobBuilder, JobIdx},
        time_window::TimeWindow,
        vehicle::{Vehicle, VehicleBuilder, VehicleIdx},
        Cost, Duration, VehicleRoutingProblem,
    },
    solver::solution::{
        solution_state::SolutionState, working_solution::WorkingSolution,
    },
};

pub fn constant_matrix(size: usize, cost: Cost) -> CostMatrix {
    let rows = (0..size)
        .map(|i| (0..size).map(|j| if i == j { 0 } else { cost }).collect())
        .collect();
    CostMatrix::from_rows(rows).unwrap()
}

pub fn basic_job(id: u64, location: usize) -> Job {
    let mut builder = JobBuilder::default();
    builder.set_id(id);
    builder.set_location_index(location);
    builder.build()
}

pub fn basic_vehicle(id: u32, depot: Option<usize>) -> Vehicle {
    let mut builder = VehicleBuilder::default();
    builder.set_id(id);
    if let Some(depot) = depot {
        builder.set_start_index(depot);
        builder.set_end_index(depot);
    }
    builder.build()
}

fn line_matrix(spacings: &[Cost]) -> CostMatrix {
    let mut positions = vec![0i64];
    for &spacing in spacings {
        positions.push(positions.last().unwrap() + i64::from(spacing));
    }

    let rows = positions
        .iter()
        .map(|&a| {
            positions
                .iter()
                .map(|&b| Cost::try_from((a - b).abs()).unwrap())
                .collect()
        })
        .collect();

    CostMatrix::from_rows(rows).unwrap()
}

/// One vehicle with start and end at location 0, and one job per spacing
/// entry placed along a line: job `k` sits `spacings[k]` past its
/// predecessor. Optional shared time windows for jobs and for the vehicle.
pub fn line_problem(
    spacings: &[Cost],
    service: Duration,
    job_tw: Option<(Duration, Duration)>,
    vehicle_tw: Option<(Duration, Duration)>,
) -> VehicleRoutingProblem {
    let jobs = (0..spacings.len())
        .map(|k| {
            let mut builder = JobBuilder::default();
            builder.set_id(k as u64 + 1);
            builder.set_location_index(k + 1);
            builder.set_service(service);
            if let Some((start, end)) = job_tw {
                builder.set_time_windows(vec![TimeWindow::new(start, end)]);
            }
            builder.build()
        })
        .collect();

    let mut builder = VehicleBuilder::default();
    builder.set_id(0);
    builder.set_start_index(0);
    builder.set_end_index(0);
    if let Some((start, end)) = vehicle_tw {
        builder.set_time_window(TimeWindow::new(start, end));
    }
    let vehicle = builder.build();

    VehicleRoutingProblem::new(jobs, vec![vehicle], line_matrix(spacings)).unwrap()
}

/// Line layout with one demand dimension; the vehicle capacity covers the
/// total demand.
pub fn line_problem_with_amounts(spacings: &[Cost], amounts: &[i64]) -> VehicleRoutingProblem {
    assert_eq!(spacings.len(), amounts.len());

    let jobs = amounts
        .iter()
        .enumerate()
        .map(|(k, &amount)| {
            let mut builder = JobBuilder::default();
            builder.set_id(k as u64 + 1);
            builder.set_location_index(k + 1);
            builder.set_amount(Amount::from_vec(vec![amount]));
            builder.build()
        })
        .collect();

    let mut builder = VehicleBuilder::default();
    builder.set_id(0);
    builder.set_start_index(0);
    builder.set_end_index(0);
    builder.set_capacity(Amount::from_vec(vec![amounts.iter().sum()]));
    let vehicle = builder.build();

    VehicleRoutingProblem::new(jobs, vec![vehicle], line_matrix(spacings)).unwrap()
}

/// Line layout with several identical vehicles, all based at location 0.
pub fn line_problem_with_vehicles(spacings: &[Cost], nb_vehicles: u32) -> VehicleRoutingProblem {
    let jobs = (0..spacings.len())
        .map(|k| basic_job(k as u64 + 1, k + 1))
        .collect();
    let vehicles = (0..nb_vehicles)
        .map(|id| basic_vehicle(id, Some(0)))
        .collect();

    VehicleRoutingProblem::new(jobs, vehicles, line_matrix(spacings)).unwrap()
}

pub fn custom_problem(
    rows: Vec<Vec<Cost>>,
    jobs: Vec<Job>,
    vehicles: Vec<Vehicle>,
) -> VehicleRoutingProblem {
    VehicleRoutingProblem::new(jobs, vehicles, CostMatrix::from_rows(rows).unwrap()).unwrap()
}

/// Builds a solution with the given job sequences, one per vehicle in order,
/// and a fully refreshed state.
pub fn solution_with_routes(
    problem: &VehicleRoutingProblem,
    routes: &[&[usize]],
) -> (WorkingSolution, SolutionState) {
    let mut solution = WorkingSolution::new(problem);
    let mut state = SolutionState::new(problem);

    for (v, jobs) in routes.iter().enumerate() {
        let route = solution.route_mut(VehicleIdx::new(v));
        for (rank, &job) in jobs.iter().enumerate() {
            route.insert(problem, rank, JobIdx::new(job));
            state.set_assigned(JobIdx::new(job));
        }
    }

    state.full_update(problem, &solution);

    (solution, state)
}

/// Job sequence of one route, by job index, for assertions.
pub fn route_jobs(solution: &WorkingSolution, vehicle: usize) -> Vec<usize> {
    solution
        .route(VehicleIdx::new(vehicle))
        .jobs()
        .iter()
        .map(|job| job.get())
        .collect()
}
