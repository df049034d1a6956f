use rand::{Rng, RngCore};

use crate::{
    problem::job::JobIdx,
    solver::{
        ruin::{assigned_jobs, remove_jobs, RuinContext},
        solution::{solution_state::SolutionState, working_solution::WorkingSolution},
    },
};

/// Removes a cluster of related jobs: a random seed job, the nearest job of
/// every other route (per the precomputed nearest-rank table), then the seed's
/// route neighbours until the requested count is reached.
pub fn ruin_related<R>(
    context: &mut RuinContext<'_, R>,
    solution: &mut WorkingSolution,
    state: &mut SolutionState,
) where
    R: RngCore,
{
    let assigned = assigned_jobs(solution);
    if assigned.is_empty() || context.nb_to_remove == 0 {
        return;
    }

    let (seed_vehicle, seed_job) = assigned[context.rng.random_range(0..assigned.len())];
    let seed_route = solution.route(seed_vehicle);
    let seed_rank = seed_route
        .jobs()
        .iter()
        .position(|&job| job == seed_job)
        .unwrap();

    let mut victims: Vec<JobIdx> = vec![seed_job];

    // The nearest table is read before any removal mutates the routes.
    for v2 in 0..solution.routes().len() {
        if victims.len() >= context.nb_to_remove {
            break;
        }
        let v2 = crate::problem::vehicle::VehicleIdx::new(v2);
        if v2 == seed_vehicle {
            continue;
        }
        if let Some(rank) = state.nearest_rank(seed_vehicle, v2, seed_rank) {
            let job = solution.route(v2).at(rank);
            if !victims.contains(&job) {
                victims.push(job);
            }
        }
    }

    // Widen around the seed within its own route.
    let mut offset = 1;
    while victims.len() < context.nb_to_remove {
        let below = seed_rank.checked_sub(offset);
        let above = seed_rank + offset;
        let mut extended = false;

        if let Some(rank) = below {
            victims.push(seed_route.at(rank));
            extended = true;
        }
        if victims.len() < context.nb_to_remove && above < seed_route.len() {
            victims.push(seed_route.at(above));
            extended = true;
        }
        if !extended {
            break;
        }
        offset += 1;
    }

    victims.truncate(context.nb_to_remove);
    remove_jobs(context.problem, solution, state, &victims);
}
