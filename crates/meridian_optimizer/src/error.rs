use thiserror::Error;

/// Errors surfaced at the loading boundary. The engine itself never fails:
/// once a [`crate::problem::VehicleRoutingProblem`] has been built, solving
/// always produces a solution, possibly with unassigned jobs.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input data: non-square matrix, out-of-bounds location,
    /// mixed vehicle profiles, inconsistent amount dimensions, a job pair
    /// marked unreachable by the matrix provider, ...
    #[error("invalid input: {0}")]
    Input(String),

    /// The external matrix provider reported a failure while producing the
    /// cost matrix.
    #[error("routing error: {0}")]
    Routing(String),

    /// Invariant violation detected at runtime. Always a bug.
    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
