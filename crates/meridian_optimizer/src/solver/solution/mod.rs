pub mod raw_route;
pub mod solution_state;
pub mod tw_route;
pub mod working_solution;
