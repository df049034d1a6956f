use crate::{
    problem::{
        cost_matrix::CostMatrix,
        job::{Job, JobIdx},
        vehicle::{Vehicle, VehicleIdx},
        Cost, Duration, Gain,
    },
    Error, Result,
};

/// Immutable input aggregate: jobs, vehicles and the travel cost matrix,
/// validated once and shared read-only across solver threads.
pub struct VehicleRoutingProblem {
    jobs: Vec<Job>,
    vehicles: Vec<Vehicle>,
    matrix: CostMatrix,
    amount_dimensions: usize,
    has_time_windows: bool,
    // compatibility[v * jobs.len() + j]: vehicle v can in principle serve job
    // j (skills, static capacity, depot reachability, window overlap).
    compatibility: Vec<bool>,
}

impl VehicleRoutingProblem {
    pub fn new(jobs: Vec<Job>, vehicles: Vec<Vehicle>, matrix: CostMatrix) -> Result<Self> {
        if jobs.is_empty() {
            return Err(Error::Input("no jobs provided".to_owned()));
        }
        if vehicles.is_empty() {
            return Err(Error::Input("no vehicles provided".to_owned()));
        }

        let profile = vehicles[0].profile();
        if let Some(v) = vehicles.iter().find(|v| v.profile() != profile) {
            return Err(Error::Input(format!(
                "mixed vehicle profiles in input: {} vs {}",
                profile,
                v.profile()
            )));
        }

        for vehicle in &vehicles {
            for index in [vehicle.start_index(), vehicle.end_index()]
                .into_iter()
                .flatten()
            {
                if index >= matrix.size() {
                    return Err(Error::Input(format!(
                        "location index {index} of vehicle {} exceeds matrix size",
                        vehicle.id()
                    )));
                }
            }
        }

        let amount_dimensions = jobs[0].amount().len();
        for job in &jobs {
            if job.location_index() >= matrix.size() {
                return Err(Error::Input(format!(
                    "location index {} of job {} exceeds matrix size",
                    job.location_index(),
                    job.id()
                )));
            }
            if job.amount().len() != amount_dimensions {
                return Err(Error::Input(format!(
                    "inconsistent amount dimensions for job {}",
                    job.id()
                )));
            }
            for tw in job.time_windows().iter() {
                if tw.end < tw.start {
                    return Err(Error::Input(format!(
                        "invalid time window for job {}",
                        job.id()
                    )));
                }
            }
            if !job.time_windows().is_sorted_and_disjoint() {
                return Err(Error::Input(format!(
                    "overlapping time windows for job {}",
                    job.id()
                )));
            }
        }

        // A pair of job locations flagged unreachable by the matrix provider
        // would poison route costs, so it is rejected before solving begins.
        for a in &jobs {
            for b in &jobs {
                if !matrix.is_reachable(a.location_index(), b.location_index()) {
                    return Err(Error::Input(format!(
                        "unreachable pair between jobs {} and {}",
                        a.id(),
                        b.id()
                    )));
                }
            }
        }

        let has_time_windows = jobs.iter().any(|job| {
            job.time_windows().len() > 1
                || *job.time_windows().get(0) != Default::default()
        }) || vehicles
            .iter()
            .any(|vehicle| *vehicle.time_window() != Default::default());

        let mut problem = VehicleRoutingProblem {
            jobs,
            vehicles,
            matrix,
            amount_dimensions,
            has_time_windows,
            compatibility: Vec::new(),
        };
        problem.compatibility = problem.compute_compatibility();

        Ok(problem)
    }

    fn compute_compatibility(&self) -> Vec<bool> {
        let mut table = vec![false; self.vehicles.len() * self.jobs.len()];

        for (v, vehicle) in self.vehicles.iter().enumerate() {
            for (j, job) in self.jobs.iter().enumerate() {
                let skills_ok = job.skills().is_subset_of(vehicle.skills());
                let capacity_ok = job.amount().fits_in(vehicle.capacity());
                let reachable = vehicle
                    .start_index()
                    .is_none_or(|s| self.matrix.is_reachable(s, job.location_index()))
                    && vehicle
                        .end_index()
                        .is_none_or(|e| self.matrix.is_reachable(job.location_index(), e));
                let tw_ok = job.time_windows().intersects(vehicle.time_window());

                table[v * self.jobs.len() + j] = skills_ok && capacity_ok && reachable && tw_ok;
            }
        }

        table
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn job(&self, job: JobIdx) -> &Job {
        &self.jobs[job]
    }

    pub fn vehicle(&self, vehicle: VehicleIdx) -> &Vehicle {
        &self.vehicles[vehicle]
    }

    pub fn matrix(&self) -> &CostMatrix {
        &self.matrix
    }

    pub fn amount_dimensions(&self) -> usize {
        self.amount_dimensions
    }

    pub fn has_time_windows(&self) -> bool {
        self.has_time_windows
    }

    pub fn job_location(&self, job: JobIdx) -> usize {
        self.jobs[job].location_index()
    }

    pub fn vehicle_ok_with_job(&self, vehicle: VehicleIdx, job: JobIdx) -> bool {
        self.compatibility[vehicle.get() * self.jobs.len() + job.get()]
    }

    #[inline]
    pub fn cost(&self, from: usize, to: usize) -> Cost {
        self.matrix.at(from, to)
    }

    /// Travel cost between two optional locations; a missing endpoint (open
    /// route side) contributes nothing.
    #[inline]
    pub fn cost_or_zero(&self, from: Option<usize>, to: Option<usize>) -> Gain {
        match (from, to) {
            (Some(from), Some(to)) => Gain::from(self.matrix.at(from, to)),
            _ => 0,
        }
    }

    /// The single matrix carries travel durations as costs.
    #[inline]
    pub fn travel_duration(&self, from: usize, to: usize) -> Duration {
        Duration::from(self.matrix.at(from, to))
    }
}
