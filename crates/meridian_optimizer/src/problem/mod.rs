pub mod amount;
pub mod cost_matrix;
pub mod job;
pub mod location;
pub mod skill;
pub mod time_window;
pub mod vehicle;
pub mod vehicle_routing_problem;

pub use vehicle_routing_problem::VehicleRoutingProblem;

/// Travel cost between two locations, as delivered by the matrix provider.
pub type Cost = u32;

/// Signed cost delta; positive means improvement.
pub type Gain = i64;

/// Time value in seconds. Input contracts use `u32`; internally everything is
/// widened so schedule arithmetic cannot overflow.
pub type Duration = u64;

/// Sentinel used by matrix providers for an unreachable pair.
pub const UNREACHABLE: Cost = u32::MAX;

/// Upper bound on regular matrix entries, leaving enough headroom for any
/// full-solution sum of costs to fit a [`Gain`].
pub const COST_CEILING: Cost = 1 << 31;

/// Default end of an open time window.
pub const HORIZON: Duration = u64::MAX >> 1;
