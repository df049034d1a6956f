use rand::{Rng, RngCore};

use crate::{
    problem::job::JobIdx,
    solver::{
        ruin::{assigned_jobs, remove_jobs, RuinContext},
        solution::{solution_state::SolutionState, working_solution::WorkingSolution},
    },
};

/// Removes a uniformly random subset of the currently assigned jobs.
pub fn ruin_random<R>(
    context: &mut RuinContext<'_, R>,
    solution: &mut WorkingSolution,
    state: &mut SolutionState,
) where
    R: RngCore,
{
    let mut candidates: Vec<_> = assigned_jobs(solution)
        .into_iter()
        .map(|(_, job)| job)
        .collect();

    let nb_to_remove = context.nb_to_remove.min(candidates.len());

    // Partial Fisher-Yates: the first nb_to_remove entries end up being a
    // uniform sample.
    for i in 0..nb_to_remove {
        let pick = context.rng.random_range(i..candidates.len());
        candidates.swap(i, pick);
    }
    let victims: Vec<JobIdx> = candidates[..nb_to_remove].to_vec();

    remove_jobs(context.problem, solution, state, &victims);
}

#[cfg(test)]
mod tests {
    use rand::{rngs::SmallRng, SeedableRng};

    use super::*;
    use crate::test_utils;

    #[test]
    fn test_removes_requested_count() {
        let problem = test_utils::line_problem(&[1, 1, 1, 1, 1], 0, None, None);
        let (mut solution, mut state) =
            test_utils::solution_with_routes(&problem, &[&[0, 1, 2, 3, 4]]);

        let mut rng = SmallRng::seed_from_u64(7);
        let mut context = RuinContext {
            problem: &problem,
            rng: &mut rng,
            nb_to_remove: 2,
        };

        ruin_random(&mut context, &mut solution, &mut state);

        assert_eq!(solution.assigned_count(), 3);
        assert_eq!(state.unassigned().len(), 2);
    }

    #[test]
    fn test_is_deterministic_for_a_seed() {
        let problem = test_utils::line_problem(&[1, 1, 1, 1, 1], 0, None, None);

        let run = || {
            let (mut solution, mut state) =
                test_utils::solution_with_routes(&problem, &[&[0, 1, 2, 3, 4]]);
            let mut rng = SmallRng::seed_from_u64(42);
            let mut context = RuinContext {
                problem: &problem,
                rng: &mut rng,
                nb_to_remove: 3,
            };
            ruin_random(&mut context, &mut solution, &mut state);
            state.sorted_unassigned()
        };

        assert_eq!(run(), run());
    }
}
