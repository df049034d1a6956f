use smallvec::SmallVec;

use crate::problem::{Duration, HORIZON};

/// Closed interval of seconds during which service may start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: Duration,
    pub end: Duration,
}

impl TimeWindow {
    pub fn new(start: Duration, end: Duration) -> Self {
        TimeWindow { start, end }
    }

    pub fn contains(&self, t: Duration) -> bool {
        self.start <= t && t <= self.end
    }

    pub fn intersects(&self, other: &TimeWindow) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        TimeWindow {
            start: 0,
            end: HORIZON,
        }
    }
}

/// Sorted, pairwise-disjoint list of time windows for a job. Jobs without
/// explicit windows get a single open window.
#[derive(Debug, Clone)]
pub struct TimeWindows(SmallVec<[TimeWindow; 1]>);

impl TimeWindows {
    pub fn from_vec(time_windows: Vec<TimeWindow>) -> Self {
        let mut windows: SmallVec<[TimeWindow; 1]> = SmallVec::from_vec(time_windows);
        if windows.is_empty() {
            windows.push(TimeWindow::default());
        }
        windows.sort_by_key(|tw| (tw.start, tw.end));
        TimeWindows(windows)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> &TimeWindow {
        &self.0[index]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimeWindow> {
        self.0.iter()
    }

    /// Earliest window that can still accommodate a service starting at or
    /// after `arrival`, together with the resulting service start (waiting
    /// until the window opens is allowed and free). Windows are sorted, so
    /// the first hit is the deterministic choice.
    pub fn earliest_fitting(&self, arrival: Duration) -> Option<(usize, Duration)> {
        self.0
            .iter()
            .enumerate()
            .find(|(_, tw)| arrival <= tw.end)
            .map(|(index, tw)| (index, arrival.max(tw.start)))
    }

    pub fn intersects(&self, other: &TimeWindow) -> bool {
        self.0.iter().any(|tw| tw.intersects(other))
    }

    /// Windows must be sorted and non-overlapping once sorted.
    pub fn is_sorted_and_disjoint(&self) -> bool {
        self.0.windows(2).all(|pair| pair[0].end < pair[1].start)
    }
}

impl Default for TimeWindows {
    fn default() -> Self {
        TimeWindows::from_vec(vec![])
    }
}
