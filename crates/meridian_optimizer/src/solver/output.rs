use serde::Serialize;

use crate::{
    problem::{amount::Amount, vehicle::VehicleIdx, Duration, VehicleRoutingProblem},
    solver::solution::{solution_state::SolutionState, working_solution::WorkingSolution},
};

/// Why a job ended up unassigned; the engine reports the last-observed
/// blocking reason.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnassignedReason {
    SkillMismatch,
    CapacityExceeded,
    TimeWindowInfeasible,
    UnreachableLocation,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StepType {
    Start,
    Job,
    End,
}

#[derive(Serialize, Debug, Clone)]
pub struct Step {
    #[serde(rename = "type")]
    pub step_type: StepType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<u64>,
    pub arrival: Duration,
    pub service_start: Duration,
    pub waiting_time: Duration,
    pub load: Amount,
}

#[derive(Serialize, Debug, Clone)]
pub struct Route {
    pub vehicle: u32,
    pub steps: Vec<Step>,
    pub cost: u64,
    pub service: Duration,
    pub duration: Duration,
    pub waiting_time: Duration,
    pub amount: Amount,
    /// Filled by a post-processing stage when geometry was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
pub struct UnassignedJob {
    pub id: u64,
    pub reason: UnassignedReason,
}

#[derive(Serialize, Debug, Clone)]
pub struct Summary {
    pub cost: u64,
    pub service: Duration,
    pub duration: Duration,
    pub waiting_time: Duration,
    pub amount: Amount,
    pub routed_jobs: usize,
    pub unassigned_jobs: usize,
}

#[derive(Serialize, Debug, Clone)]
pub struct Solution {
    pub summary: Summary,
    pub routes: Vec<Route>,
    pub unassigned: Vec<UnassignedJob>,
}

/// Turns the final working solution into the output contract: per-route
/// steps with arrival/service/waiting data and running loads, route and
/// global totals, and tagged unassigned jobs.
pub fn assemble(
    problem: &VehicleRoutingProblem,
    solution: &WorkingSolution,
    state: &SolutionState,
) -> Solution {
    let mut routes = Vec::new();

    for v in 0..solution.routes().len() {
        let vehicle = VehicleIdx::new(v);
        if solution.route(vehicle).is_empty() {
            continue;
        }
        routes.push(assemble_route(problem, solution, vehicle));
    }

    let mut summary = Summary {
        cost: 0,
        service: 0,
        duration: 0,
        waiting_time: 0,
        amount: Amount::with_dimensions(problem.amount_dimensions()),
        routed_jobs: solution.assigned_count(),
        unassigned_jobs: state.unassigned().len(),
    };
    for route in &routes {
        summary.cost += route.cost;
        summary.service += route.service;
        summary.duration += route.duration;
        summary.waiting_time += route.waiting_time;
        summary.amount += &route.amount;
    }

    let unassigned = state
        .sorted_unassigned()
        .into_iter()
        .map(|job| UnassignedJob {
            id: problem.job(job).id(),
            reason: state
                .unassigned_reason(job)
                .unwrap_or(UnassignedReason::TimeWindowInfeasible),
        })
        .collect();

    Solution {
        summary,
        routes,
        unassigned,
    }
}

fn assemble_route(
    problem: &VehicleRoutingProblem,
    solution: &WorkingSolution,
    vehicle: VehicleIdx,
) -> Route {
    let route = solution.route(vehicle);
    let v = problem.vehicle(vehicle);

    let mut steps = Vec::with_capacity(route.len() + 2);
    let mut load = Amount::with_dimensions(problem.amount_dimensions());
    let mut service_total: Duration = 0;
    let mut travel_total: Duration = 0;
    let mut waiting_total: Duration = 0;

    // The vehicle leaves its start as late as the first service allows; any
    // waiting is accounted at the jobs, not at the depot.
    let first_travel = v
        .start_index()
        .map_or(0, |start| problem.travel_duration(start, route.location(problem, 0)));
    let departure = route.earliest(0) - first_travel;

    if v.has_start() {
        steps.push(Step {
            step_type: StepType::Start,
            job: None,
            arrival: departure,
            service_start: departure,
            waiting_time: 0,
            load: load.clone(),
        });
    }

    let mut previous_departure = departure;
    let mut previous_location = v.start_index();

    for rank in 0..route.len() {
        let job = problem.job(route.at(rank));
        let location = job.location_index();

        let travel = previous_location.map_or(0, |from| problem.travel_duration(from, location));
        let arrival = previous_departure + travel;
        let service_start = route.earliest(rank);
        let waiting = service_start - arrival;

        load += job.amount();
        travel_total += travel;
        waiting_total += waiting;
        service_total += job.service();

        steps.push(Step {
            step_type: StepType::Job,
            job: Some(job.id()),
            arrival,
            service_start,
            waiting_time: waiting,
            load: load.clone(),
        });

        previous_departure = service_start + job.service();
        previous_location = Some(location);
    }

    if let Some(end) = v.end_index() {
        let travel = previous_location.map_or(0, |from| problem.travel_duration(from, end));
        travel_total += travel;
        let arrival = previous_departure + travel;
        steps.push(Step {
            step_type: StepType::End,
            job: None,
            arrival,
            service_start: arrival,
            waiting_time: 0,
            load: load.clone(),
        });
    }

    Route {
        vehicle: v.id(),
        steps,
        cost: u64::try_from(solution.route_cost(problem, vehicle)).unwrap_or(0),
        service: service_total,
        duration: travel_total,
        waiting_time: waiting_total,
        amount: load,
        geometry: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    #[test]
    fn test_assemble_steps_and_summary() {
        let problem = test_utils::line_problem(&[1, 1], 10, None, None);
        let (solution, state) = test_utils::solution_with_routes(&problem, &[&[0, 1]]);

        let output = assemble(&problem, &solution, &state);

        assert_eq!(output.routes.len(), 1);
        assert_eq!(output.unassigned.len(), 0);

        let route = &output.routes[0];
        assert_eq!(route.steps.len(), 4);
        assert_eq!(route.steps[0].step_type, StepType::Start);
        assert_eq!(route.steps[1].job, Some(1));
        assert_eq!(route.steps[2].job, Some(2));
        assert_eq!(route.steps[3].step_type, StepType::End);

        // 0 -> 1 -> 2 -> 0 with unit legs plus the return leg of 2.
        assert_eq!(route.cost, 4);
        assert_eq!(route.duration, 4);
        assert_eq!(route.service, 20);
        assert_eq!(route.waiting_time, 0);

        assert_eq!(output.summary.cost, 4);
        assert_eq!(output.summary.routed_jobs, 2);
        assert_eq!(output.summary.unassigned_jobs, 0);
    }

    #[test]
    fn test_waiting_time_reported_at_jobs() {
        let problem = test_utils::line_problem(&[1, 1], 0, Some((100, 200)), None);
        let (solution, state) = test_utils::solution_with_routes(&problem, &[&[0, 1]]);

        let output = assemble(&problem, &solution, &state);
        let route = &output.routes[0];

        // Departure shifts so the first job starts exactly at 100; the
        // second is reached immediately after and never waits either.
        assert_eq!(route.steps[1].service_start, 100);
        assert_eq!(route.steps[1].waiting_time, 0);
        assert_eq!(route.steps[2].waiting_time, 0);
    }
}
