use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Instant,
};

use rand::{rngs::SmallRng, SeedableRng};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument, Level};

use crate::{
    problem::{Gain, VehicleRoutingProblem},
    solver::{
        construction::{greedy_fill, record_unassigned_reasons},
        ls::local_search,
        ruin::{random::ruin_random, related::ruin_related, RuinContext},
        solution::{solution_state::SolutionState, working_solution::WorkingSolution},
        solver_params::SolverParams,
    },
};

/// Number of ruin-and-recreate passes per trajectory at a given exploration
/// level; level 0 performs local search only.
fn passes_for_level(level: usize) -> usize {
    [0, 2, 4, 8, 16, 32][level]
}

/// How many jobs one ruin pass removes: a fraction of the assigned jobs that
/// grows with the exploration level, at least one.
fn ruin_count(level: usize, assigned: usize) -> usize {
    if assigned == 0 {
        return 0;
    }
    let percent = 10 + 5 * level;
    (assigned * percent).div_ceil(100).clamp(1, assigned)
}

/// Trajectory seeds depend only on the top seed and the trajectory index,
/// never on the thread layout.
fn derive_seed(seed: u64, trajectory: usize) -> u64 {
    let mut z = seed ^ (trajectory as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Solutions compare first by how many jobs are left out, then by cost.
fn solution_key(problem: &VehicleRoutingProblem, solution: &WorkingSolution) -> (usize, Gain) {
    (
        solution.unassigned_count(problem),
        solution.total_cost(problem),
    )
}

#[instrument(skip_all, level = Level::DEBUG, fields(trajectory = trajectory))]
fn run_trajectory(
    problem: &VehicleRoutingProblem,
    params: &SolverParams,
    trajectory: usize,
    stop: &AtomicBool,
    deadline: Option<Instant>,
) -> (WorkingSolution, SolutionState) {
    let mut rng = SmallRng::seed_from_u64(derive_seed(params.seed, trajectory));

    let mut solution = WorkingSolution::new(problem);
    let mut state = SolutionState::new(problem);

    greedy_fill(problem, &mut solution, &mut state);
    local_search::run(problem, &mut solution, &mut state);

    let mut best = solution.clone();
    let mut best_key = solution_key(problem, &solution);

    for pass in 0..passes_for_level(params.exploration_level) {
        if stop.load(Ordering::Relaxed) {
            break;
        }
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            break;
        }

        let nb_to_remove = ruin_count(params.exploration_level, solution.assigned_count());
        if nb_to_remove == 0 {
            break;
        }

        let mut context = RuinContext {
            problem,
            rng: &mut rng,
            nb_to_remove,
        };
        if pass % 2 == 0 {
            ruin_random(&mut context, &mut solution, &mut state);
        } else {
            ruin_related(&mut context, &mut solution, &mut state);
        }

        greedy_fill(problem, &mut solution, &mut state);
        local_search::run(problem, &mut solution, &mut state);

        let key = solution_key(problem, &solution);
        if key < best_key {
            debug!(pass, unassigned = key.0, cost = key.1, "improved");
            best = solution.clone();
            best_key = key;
        } else {
            // Strict improvement only: discard the perturbed solution.
            solution = best.clone();
            state.full_update(problem, &solution);
            state.sync_unassigned(problem, &solution);
        }
    }

    state.full_update(problem, &best);
    state.sync_unassigned(problem, &best);
    record_unassigned_reasons(problem, &best, &mut state);

    (best, state)
}

/// Runs `2 * (exploration_level + 1)` independent trajectories on a thread
/// pool of `nb_threads` workers and keeps the best result; equal results tie
/// by trajectory index. The outcome is a pure function of the input, the
/// seed and the exploration level.
pub(crate) fn run_search(
    problem: &VehicleRoutingProblem,
    params: &SolverParams,
    stop: &AtomicBool,
) -> (WorkingSolution, SolutionState) {
    let params = params.sanitized();
    let nb_trajectories = 2 * (params.exploration_level + 1);
    let deadline = params.timeout.map(|timeout| Instant::now() + timeout);

    info!(
        nb_trajectories,
        nb_threads = params.nb_threads,
        exploration_level = params.exploration_level,
        "starting search"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(params.nb_threads)
        .build()
        .expect("failed to build search thread pool");

    let mut results: Vec<(WorkingSolution, SolutionState)> = pool.install(|| {
        (0..nb_trajectories)
            .into_par_iter()
            .map(|trajectory| run_trajectory(problem, &params, trajectory, stop, deadline))
            .collect()
    });

    let best_index = results
        .iter()
        .enumerate()
        .min_by_key(|(index, (solution, _))| {
            let (unassigned, cost) = solution_key(problem, solution);
            (unassigned, cost, *index)
        })
        .map(|(index, _)| index)
        .unwrap();

    let (solution, state) = results.swap_remove(best_index);

    info!(
        cost = solution.total_cost(problem),
        unassigned = state.unassigned().len(),
        "search done"
    );

    (solution, state)
}
