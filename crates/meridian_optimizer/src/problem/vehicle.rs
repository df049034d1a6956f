use crate::{
    define_index_newtype,
    problem::{amount::Amount, location::Location, skill::Skills, time_window::TimeWindow},
};

define_index_newtype!(VehicleIdx, Vehicle);

pub const DEFAULT_PROFILE: &str = "car";

/// A vehicle with optional start and end depots. The presence of a depot is
/// part of the model: an absent start means the route begins at its first
/// job, an absent end means it finishes at its last.
#[derive(Debug, Clone)]
pub struct Vehicle {
    id: u32,
    start: Option<Location>,
    end: Option<Location>,
    capacity: Amount,
    skills: Skills,
    time_window: TimeWindow,
    profile: String,
}

impl Vehicle {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn has_start(&self) -> bool {
        self.start.is_some()
    }

    pub fn has_end(&self) -> bool {
        self.end.is_some()
    }

    pub fn start(&self) -> Option<&Location> {
        self.start.as_ref()
    }

    pub fn end(&self) -> Option<&Location> {
        self.end.as_ref()
    }

    pub fn start_index(&self) -> Option<usize> {
        self.start.as_ref().map(Location::index)
    }

    pub fn end_index(&self) -> Option<usize> {
        self.end.as_ref().map(Location::index)
    }

    pub fn capacity(&self) -> &Amount {
        &self.capacity
    }

    pub fn skills(&self) -> &Skills {
        &self.skills
    }

    pub fn time_window(&self) -> &TimeWindow {
        &self.time_window
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }
}

pub struct VehicleBuilder {
    id: u32,
    start: Option<Location>,
    end: Option<Location>,
    capacity: Amount,
    skills: Skills,
    time_window: TimeWindow,
    profile: String,
}

impl Default for VehicleBuilder {
    fn default() -> Self {
        VehicleBuilder {
            id: 0,
            start: None,
            end: None,
            capacity: Amount::empty(),
            skills: Skills::new(),
            time_window: TimeWindow::default(),
            profile: DEFAULT_PROFILE.to_owned(),
        }
    }
}

impl VehicleBuilder {
    pub fn set_id(&mut self, id: u32) {
        self.id = id;
    }

    pub fn set_start_index(&mut self, index: usize) {
        self.start = Some(Location::new(index));
    }

    pub fn set_end_index(&mut self, index: usize) {
        self.end = Some(Location::new(index));
    }

    pub fn set_start(&mut self, location: Location) {
        self.start = Some(location);
    }

    pub fn set_end(&mut self, location: Location) {
        self.end = Some(location);
    }

    pub fn set_capacity(&mut self, capacity: Amount) {
        self.capacity = capacity;
    }

    pub fn set_skills(&mut self, skills: Skills) {
        self.skills = skills;
    }

    pub fn set_time_window(&mut self, time_window: TimeWindow) {
        self.time_window = time_window;
    }

    pub fn set_profile(&mut self, profile: String) {
        self.profile = profile;
    }

    pub fn build(self) -> Vehicle {
        Vehicle {
            id: self.id,
            start: self.start,
            end: self.end,
            capacity: self.capacity,
            skills: self.skills,
            time_window: self.time_window,
            profile: self.profile,
        }
    }
}
