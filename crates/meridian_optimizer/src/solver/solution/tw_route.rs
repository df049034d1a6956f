use crate::{
    problem::{job::JobIdx, vehicle::VehicleIdx, Duration, VehicleRoutingProblem},
    solver::solution::raw_route::RawRoute,
};

/// A [`RawRoute`] extended with a service schedule: for every position the
/// earliest and latest feasible service start and the chosen time window of
/// the job. The caches let a hypothetical insertion be accepted or rejected
/// without simulating the whole route.
///
/// Invariant after every mutation: `earliest[k] <= latest[k]` and
/// `earliest[k]` lies inside the job's window `current_tw[k]`.
#[derive(Debug, Clone)]
pub struct TwRoute {
    route: RawRoute,
    earliest: Vec<Duration>,
    latest: Vec<Duration>,
    current_tw: Vec<usize>,
}

impl TwRoute {
    pub fn empty(vehicle: VehicleIdx) -> Self {
        TwRoute {
            route: RawRoute::new(vehicle),
            earliest: Vec::new(),
            latest: Vec::new(),
            current_tw: Vec::new(),
        }
    }

    pub fn vehicle(&self) -> VehicleIdx {
        self.route.vehicle()
    }

    pub fn len(&self) -> usize {
        self.route.len()
    }

    pub fn is_empty(&self) -> bool {
        self.route.is_empty()
    }

    pub fn at(&self, rank: usize) -> JobIdx {
        self.route.at(rank)
    }

    pub fn jobs(&self) -> &[JobIdx] {
        self.route.jobs()
    }

    pub fn iter_range(
        &self,
        first_rank: usize,
        last_rank: usize,
    ) -> impl DoubleEndedIterator<Item = JobIdx> + Clone + '_ {
        self.route.iter_range(first_rank, last_rank)
    }

    pub fn earliest(&self, rank: usize) -> Duration {
        self.earliest[rank]
    }

    pub fn latest(&self, rank: usize) -> Duration {
        self.latest[rank]
    }

    pub fn current_tw(&self, rank: usize) -> usize {
        self.current_tw[rank]
    }

    /// Matrix index of the job at `rank`.
    pub fn location(&self, problem: &VehicleRoutingProblem, rank: usize) -> usize {
        problem.job_location(self.route.at(rank))
    }

    /// Matrix index preceding `rank`: the previous job, or the vehicle start.
    pub fn previous_index(&self, problem: &VehicleRoutingProblem, rank: usize) -> Option<usize> {
        if rank == 0 {
            problem.vehicle(self.vehicle()).start_index()
        } else {
            Some(self.location(problem, rank - 1))
        }
    }

    /// Matrix index following `rank`: the next job, or the vehicle end.
    pub fn next_index(&self, problem: &VehicleRoutingProblem, rank: usize) -> Option<usize> {
        if rank + 1 < self.len() {
            Some(self.location(problem, rank + 1))
        } else {
            problem.vehicle(self.vehicle()).end_index()
        }
    }

    /// Matrix index currently occupying the insertion point `rank`: the job
    /// at `rank`, or the vehicle end when inserting past the last job.
    pub fn insertion_next_index(
        &self,
        problem: &VehicleRoutingProblem,
        rank: usize,
    ) -> Option<usize> {
        if rank < self.len() {
            Some(self.location(problem, rank))
        } else {
            problem.vehicle(self.vehicle()).end_index()
        }
    }

    pub fn insert(&mut self, problem: &VehicleRoutingProblem, rank: usize, job: JobIdx) {
        self.route.insert(rank, job);
        self.update_schedule(problem);
    }

    pub fn remove(&mut self, problem: &VehicleRoutingProblem, rank: usize) -> JobIdx {
        let job = self.route.remove(rank);
        self.update_schedule(problem);
        job
    }

    pub fn replace<I>(
        &mut self,
        problem: &VehicleRoutingProblem,
        jobs: I,
        first_rank: usize,
        last_rank: usize,
    ) where
        I: IntoIterator<Item = JobIdx>,
    {
        self.route.replace(jobs, first_rank, last_rank);
        self.update_schedule(problem);
    }

    pub fn reverse(
        &mut self,
        problem: &VehicleRoutingProblem,
        first_rank: usize,
        last_rank: usize,
    ) {
        self.route.reverse(first_rank, last_rank);
        self.update_schedule(problem);
    }

    /// Full forward/backward schedule recomputation. Every mutation above is
    /// only applied after operator validation, so an infeasible schedule here
    /// is an internal invariant violation.
    pub fn update_schedule(&mut self, problem: &VehicleRoutingProblem) {
        let len = self.len();
        self.earliest.resize(len, 0);
        self.latest.resize(len, 0);
        self.current_tw.resize(len, 0);

        if len == 0 {
            return;
        }

        let vehicle = problem.vehicle(self.vehicle());

        // Forward pass: chain earliest service starts.
        let mut previous_location = vehicle.start_index();
        let mut previous_departure = vehicle.time_window().start;

        for rank in 0..len {
            let job = problem.job(self.route.at(rank));
            let location = job.location_index();
            let arrival = match previous_location {
                Some(from) => previous_departure + problem.travel_duration(from, location),
                None => previous_departure,
            };

            let (tw_rank, service_start) = job
                .time_windows()
                .earliest_fitting(arrival)
                .unwrap_or_else(|| {
                    panic!(
                        "no feasible time window for job {} in route of vehicle {}",
                        job.id(),
                        vehicle.id()
                    )
                });

            self.earliest[rank] = service_start;
            self.current_tw[rank] = tw_rank;
            previous_departure = service_start + job.service();
            previous_location = Some(location);
        }

        // Backward pass: chain latest service starts, bounded by the chosen
        // window and the vehicle availability end.
        for rank in (0..len).rev() {
            let job = problem.job(self.route.at(rank));
            let location = job.location_index();

            let chain_bound = if rank + 1 == len {
                let end_travel = vehicle
                    .end_index()
                    .map_or(0, |end| problem.travel_duration(location, end));
                vehicle
                    .time_window()
                    .end
                    .saturating_sub(job.service() + end_travel)
            } else {
                let next_location = self.location(problem, rank + 1);
                self.latest[rank + 1]
                    .saturating_sub(job.service() + problem.travel_duration(location, next_location))
            };

            let window_end = job.time_windows().get(self.current_tw[rank]).end;
            self.latest[rank] = window_end.min(chain_bound);

            assert!(
                self.earliest[rank] <= self.latest[rank],
                "invalid schedule for job {} in route of vehicle {}",
                job.id(),
                vehicle.id()
            );
        }
    }

    /// True iff replacing the `[first_rank, last_rank)` range with the given
    /// sequence yields a feasible schedule. Forward-simulates the replacement
    /// from the cached `earliest` of the predecessor, then checks the first
    /// kept successor against its cached `latest`; the suffix never needs to
    /// be walked.
    pub fn is_valid_addition_for_tw<I>(
        &self,
        problem: &VehicleRoutingProblem,
        jobs: I,
        first_rank: usize,
        last_rank: usize,
    ) -> bool
    where
        I: Iterator<Item = JobIdx>,
    {
        debug_assert!(first_rank <= last_rank && last_rank <= self.len());

        let vehicle = problem.vehicle(self.vehicle());

        let (mut previous_location, mut previous_departure) = if first_rank == 0 {
            (vehicle.start_index(), vehicle.time_window().start)
        } else {
            let rank = first_rank - 1;
            let job = problem.job(self.route.at(rank));
            (
                Some(job.location_index()),
                self.earliest[rank] + job.service(),
            )
        };

        let mut emptied = first_rank == 0 && last_rank == self.len();

        for job_idx in jobs {
            emptied = false;
            let job = problem.job(job_idx);
            let location = job.location_index();
            let arrival = match previous_location {
                Some(from) => previous_departure + problem.travel_duration(from, location),
                None => previous_departure,
            };

            let Some((_, service_start)) = job.time_windows().earliest_fitting(arrival) else {
                return false;
            };

            previous_departure = service_start + job.service();
            previous_location = Some(location);
        }

        if last_rank < self.len() {
            let job = problem.job(self.route.at(last_rank));
            let location = job.location_index();
            let arrival = match previous_location {
                Some(from) => previous_departure + problem.travel_duration(from, location),
                None => previous_departure,
            };

            match job.time_windows().earliest_fitting(arrival) {
                Some((_, service_start)) => service_start <= self.latest[last_rank],
                None => false,
            }
        } else if emptied {
            // The route disappears entirely.
            true
        } else {
            // The replacement reaches the route end: the vehicle must make it
            // back (or simply finish) within its availability.
            let return_arrival = match (previous_location, vehicle.end_index()) {
                (Some(from), Some(end)) => previous_departure + problem.travel_duration(from, end),
                _ => previous_departure,
            };
            return_arrival <= vehicle.time_window().end
        }
    }
}
