use crate::{
    define_index_newtype,
    problem::{
        amount::Amount,
        location::Location,
        skill::Skills,
        time_window::{TimeWindow, TimeWindows},
        Duration,
    },
};

define_index_newtype!(JobIdx, Job);

/// A service to perform at a given location, immutable for the lifetime of
/// the engine.
#[derive(Debug, Clone)]
pub struct Job {
    id: u64,
    location: Location,
    service: Duration,
    amount: Amount,
    skills: Skills,
    time_windows: TimeWindows,
}

impl Job {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn location_index(&self) -> usize {
        self.location.index()
    }

    pub fn service(&self) -> Duration {
        self.service
    }

    pub fn amount(&self) -> &Amount {
        &self.amount
    }

    pub fn skills(&self) -> &Skills {
        &self.skills
    }

    pub fn time_windows(&self) -> &TimeWindows {
        &self.time_windows
    }
}

#[derive(Default)]
pub struct JobBuilder {
    id: u64,
    location: Option<Location>,
    service: Duration,
    amount: Amount,
    skills: Skills,
    time_windows: Vec<TimeWindow>,
}

impl JobBuilder {
    pub fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    pub fn set_location_index(&mut self, index: usize) {
        self.location = Some(Location::new(index));
    }

    pub fn set_location(&mut self, location: Location) {
        self.location = Some(location);
    }

    pub fn set_service(&mut self, service: Duration) {
        self.service = service;
    }

    pub fn set_amount(&mut self, amount: Amount) {
        self.amount = amount;
    }

    pub fn set_skills(&mut self, skills: Skills) {
        self.skills = skills;
    }

    pub fn set_time_windows(&mut self, time_windows: Vec<TimeWindow>) {
        self.time_windows = time_windows;
    }

    pub fn build(self) -> Job {
        Job {
            id: self.id,
            location: self.location.expect("job requires a location"),
            service: self.service,
            amount: self.amount,
            skills: self.skills,
            time_windows: TimeWindows::from_vec(self.time_windows),
        }
    }
}
