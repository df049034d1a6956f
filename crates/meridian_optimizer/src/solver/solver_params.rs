use std::time::Duration;

/// Upper bound for [`SolverParams::exploration_level`].
pub const MAX_EXPLORATION_LEVEL: usize = 5;

/// Tuning knobs of a solve. Defaults favour a balanced search; every field
/// can be overridden by the caller.
#[derive(Clone, Debug)]
pub struct SolverParams {
    /// Intensity of the ruin-and-recreate schedule, in
    /// `[0, MAX_EXPLORATION_LEVEL]`. Level 0 runs local search only.
    pub exploration_level: usize,

    /// Number of OS threads running independent trajectories. Does not
    /// affect the result, only the wall time.
    pub nb_threads: usize,

    /// Top-level seed; trajectory seeds derive from it.
    pub seed: u64,

    /// Optional wall-clock budget, checked between ruin-and-recreate passes.
    pub timeout: Option<Duration>,

    /// Whether the caller intends to fetch route geometry from the routing
    /// back-end afterwards. Carried for the post-processing stage; the
    /// engine itself ignores it.
    pub geometry: bool,
}

impl Default for SolverParams {
    fn default() -> Self {
        SolverParams {
            exploration_level: 2,
            nb_threads: 4,
            seed: 0,
            timeout: None,
            geometry: false,
        }
    }
}

impl SolverParams {
    /// Clamped copy: exploration level capped, at least one thread.
    pub fn sanitized(&self) -> SolverParams {
        SolverParams {
            exploration_level: self.exploration_level.min(MAX_EXPLORATION_LEVEL),
            nb_threads: self.nb_threads.max(1),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized() {
        let params = SolverParams {
            exploration_level: 99,
            nb_threads: 0,
            ..Default::default()
        };
        let sanitized = params.sanitized();

        assert_eq!(sanitized.exploration_level, MAX_EXPLORATION_LEVEL);
        assert_eq!(sanitized.nb_threads, 1);
    }
}
