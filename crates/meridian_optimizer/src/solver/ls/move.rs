use crate::{
    problem::{vehicle::VehicleIdx, Gain, VehicleRoutingProblem},
    solver::{
        ls::{
            cross_exchange::CrossExchangeOperator, exchange::ExchangeOperator,
            intra_cross_exchange::IntraCrossExchangeOperator,
            intra_exchange::IntraExchangeOperator,
            intra_mixed_exchange::IntraMixedExchangeOperator, intra_or_opt::IntraOrOptOperator,
            intra_relocate::IntraRelocateOperator, mixed_exchange::MixedExchangeOperator,
            or_opt::OrOptOperator, relocate::RelocateOperator,
            reverse_two_opt::ReverseTwoOptOperator, two_opt::TwoOptOperator,
        },
        solution::{solution_state::SolutionState, working_solution::WorkingSolution},
    },
};

/// Uniform contract for all move operators. A constructed operator is a
/// lightweight parameter bundle with its gain already computed; `is_valid`
/// and `apply` are only ever called on the currently winning candidate.
pub trait LocalSearchOperator: Sized {
    /// Enumerates every parameterization of this operator for the given
    /// route pair, feeding each candidate to the consumer.
    fn generate_moves<C>(
        problem: &VehicleRoutingProblem,
        solution: &WorkingSolution,
        state: &SolutionState,
        pair: (VehicleIdx, VehicleIdx),
        consumer: C,
    ) where
        C: FnMut(Self);

    /// `old_cost - new_cost` if the move were applied. Deterministic and
    /// idempotent: computed once at construction.
    fn gain(&self) -> Gain;

    /// True iff applying the move preserves capacity, skill and time window
    /// invariants on every affected route.
    fn is_valid(
        &self,
        problem: &VehicleRoutingProblem,
        solution: &WorkingSolution,
        state: &SolutionState,
    ) -> bool;

    /// Realizes the move. Precondition: `is_valid` returned true for the
    /// current solution.
    fn apply(&self, problem: &VehicleRoutingProblem, solution: &mut WorkingSolution);

    /// Vehicles whose routes may accept unassigned jobs after this move.
    fn addition_candidates(&self) -> Vec<VehicleIdx>;

    /// Vehicles whose `SolutionState` entries must be refreshed after apply.
    fn update_candidates(&self) -> Vec<VehicleIdx>;
}

#[derive(Debug)]
pub enum LsMove {
    Relocate(RelocateOperator),
    Exchange(ExchangeOperator),
    OrOpt(OrOptOperator),
    CrossExchange(CrossExchangeOperator),
    MixedExchange(MixedExchangeOperator),
    TwoOpt(TwoOptOperator),
    IntraRelocate(IntraRelocateOperator),
    IntraExchange(IntraExchangeOperator),
    IntraOrOpt(IntraOrOptOperator),
    IntraCrossExchange(IntraCrossExchangeOperator),
    IntraMixedExchange(IntraMixedExchangeOperator),
    ReverseTwoOpt(ReverseTwoOptOperator),
}

macro_rules! dispatch {
    ($self:expr, $op:ident => $body:expr) => {
        match $self {
            LsMove::Relocate($op) => $body,
            LsMove::Exchange($op) => $body,
            LsMove::OrOpt($op) => $body,
            LsMove::CrossExchange($op) => $body,
            LsMove::MixedExchange($op) => $body,
            LsMove::TwoOpt($op) => $body,
            LsMove::IntraRelocate($op) => $body,
            LsMove::IntraExchange($op) => $body,
            LsMove::IntraOrOpt($op) => $body,
            LsMove::IntraCrossExchange($op) => $body,
            LsMove::IntraMixedExchange($op) => $body,
            LsMove::ReverseTwoOpt($op) => $body,
        }
    };
}

impl LsMove {
    pub fn operator_name(&self) -> &'static str {
        match self {
            LsMove::Relocate(_) => "Relocate",
            LsMove::Exchange(_) => "Exchange",
            LsMove::OrOpt(_) => "Or-Opt",
            LsMove::CrossExchange(_) => "Cross-Exchange",
            LsMove::MixedExchange(_) => "Mixed-Exchange",
            LsMove::TwoOpt(_) => "2-Opt*",
            LsMove::IntraRelocate(_) => "Intra-Relocate",
            LsMove::IntraExchange(_) => "Intra-Exchange",
            LsMove::IntraOrOpt(_) => "Intra-Or-Opt",
            LsMove::IntraCrossExchange(_) => "Intra-Cross-Exchange",
            LsMove::IntraMixedExchange(_) => "Intra-Mixed-Exchange",
            LsMove::ReverseTwoOpt(_) => "Reverse-2-Opt",
        }
    }

    pub fn gain(&self) -> Gain {
        dispatch!(self, op => op.gain())
    }

    pub fn is_valid(
        &self,
        problem: &VehicleRoutingProblem,
        solution: &WorkingSolution,
        state: &SolutionState,
    ) -> bool {
        dispatch!(self, op => op.is_valid(problem, solution, state))
    }

    pub fn apply(&self, problem: &VehicleRoutingProblem, solution: &mut WorkingSolution) {
        dispatch!(self, op => op.apply(problem, solution))
    }

    pub fn addition_candidates(&self) -> Vec<VehicleIdx> {
        dispatch!(self, op => op.addition_candidates())
    }

    pub fn update_candidates(&self) -> Vec<VehicleIdx> {
        dispatch!(self, op => op.update_candidates())
    }
}
