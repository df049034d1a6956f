use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use parking_lot::RwLock;
use tracing::info;

use crate::{
    problem::VehicleRoutingProblem,
    solver::{output, output::Solution, search::run_search, solver_params::SolverParams},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SolverStatus {
    Pending,
    Running,
    Completed,
}

/// Public facade of the engine: owns the immutable problem, runs the
/// parallel search and produces the output contract. A solve always returns
/// a solution, possibly with every job unassigned.
pub struct Solver {
    problem: Arc<VehicleRoutingProblem>,
    params: SolverParams,
    status: RwLock<SolverStatus>,
    is_stopped: Arc<AtomicBool>,
}

impl Solver {
    pub fn new(problem: VehicleRoutingProblem, params: SolverParams) -> Self {
        Solver {
            problem: Arc::new(problem),
            params: params.sanitized(),
            status: RwLock::new(SolverStatus::Pending),
            is_stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn problem(&self) -> &VehicleRoutingProblem {
        &self.problem
    }

    pub fn status(&self) -> SolverStatus {
        *self.status.read()
    }

    /// Requests cooperative cancellation; trajectories stop at their next
    /// pass boundary and the best solution seen so far is returned.
    pub fn stop(&self) {
        self.is_stopped.store(true, Ordering::Relaxed);
    }

    pub fn solve(&self) -> Solution {
        *self.status.write() = SolverStatus::Running;
        info!(
            jobs = self.problem.jobs().len(),
            vehicles = self.problem.vehicles().len(),
            "solve started"
        );

        let (solution, state) = run_search(&self.problem, &self.params, &self.is_stopped);
        let output = output::assemble(&self.problem, &solution, &state);

        *self.status.write() = SolverStatus::Completed;
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    #[test]
    fn test_status_transitions() {
        let problem = test_utils::line_problem(&[1, 1], 0, None, None);
        let solver = Solver::new(problem, SolverParams::default());

        assert_eq!(solver.status(), SolverStatus::Pending);
        let _ = solver.solve();
        assert_eq!(solver.status(), SolverStatus::Completed);
    }
}
