//! `ExhaustiveSolver` implementation.

use std::time::Instant;

use airspace_core::model::{Assignment, VariableId};
use airspace_core::{ConstraintModel, SolveError, SolveOutcome, Solution, Solver};

/// Largest variable count the enumeration can address.
const ADDRESSABLE_VARIABLES: usize = 32;

/// Configuration for [`ExhaustiveSolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExhaustiveSolverConfig {
    /// Models with more variables are refused with
    /// [`SolveError::ModelTooLarge`]. Values above 32 are treated as 32.
    pub max_variables: usize,
}

impl Default for ExhaustiveSolverConfig {
    fn default() -> Self {
        Self { max_variables: 20 }
    }
}

/// Solver that tries all `2^n` assignments of an `n`-variable model.
///
/// Assignments are visited in increasing binary order with variable `v0` as
/// the least significant bit; among equally cheap feasible assignments the
/// first one visited wins.
///
/// # Examples
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use airspace_core::builder::{DenseAircraft, DenseConfig, DenseProblem, build_dense};
/// use airspace_core::cost::UniformCellCost;
/// use airspace_core::{Cell, FlightNumber, RegularGrid, SolveOutcome, Solver};
/// use airspace_solver_exhaustive::ExhaustiveSolver;
///
/// let problem = DenseProblem {
///     grid: RegularGrid::new(2, 1, 1)?,
///     aircraft: vec![DenseAircraft {
///         flight: FlightNumber(1),
///         start: Cell::new(0, 0, 0),
///         destination: Cell::new(1, 0, 0),
///     }],
///     cost: &UniformCellCost(1),
/// };
/// let model = build_dense(&DenseConfig { horizon: 2, destination_reward: 10 }, &problem)?;
/// let SolveOutcome::Solved(solution) = ExhaustiveSolver::default().solve(&model)? else {
///     panic!("a two-step hop is feasible");
/// };
/// assert_eq!(solution.objective, -9.0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExhaustiveSolver {
    config: ExhaustiveSolverConfig,
}

impl ExhaustiveSolver {
    /// Construct a solver with explicit configuration.
    #[must_use]
    pub const fn with_config(config: ExhaustiveSolverConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> ExhaustiveSolverConfig {
        self.config
    }

    fn limit(&self) -> usize {
        self.config.max_variables.min(ADDRESSABLE_VARIABLES)
    }
}

impl Solver for ExhaustiveSolver {
    fn solve(&self, model: &ConstraintModel) -> Result<SolveOutcome, SolveError> {
        let variables: Vec<VariableId> = model.registry().iter().map(|(id, _)| id).collect();
        let limit = self.limit();
        if variables.len() > limit {
            log::warn!(
                "refusing {} model with {} variables; exhaustive search is limited to {limit}",
                model.formulation(),
                variables.len()
            );
            return Err(SolveError::ModelTooLarge {
                variables: variables.len(),
                limit,
            });
        }

        let started_at = Instant::now();
        let mut best: Option<Solution> = None;
        let mut feasible = 0_u64;
        for mask in 0..(1_u64 << variables.len()) {
            let assignment = assignment_for(mask, &variables);
            if !model.is_feasible(&assignment) {
                continue;
            }
            feasible += 1;
            let objective = model.objective().evaluate(&assignment);
            if best
                .as_ref()
                .is_none_or(|incumbent| objective < incumbent.objective)
            {
                best = Some(Solution {
                    assignment,
                    objective,
                });
            }
        }

        log::debug!(
            "enumerated {} assignments of a {} model in {:?}; {feasible} feasible",
            1_u64 << variables.len(),
            model.formulation(),
            started_at.elapsed()
        );
        Ok(best.map_or(SolveOutcome::NoFeasibleSolution, SolveOutcome::Solved))
    }
}

/// Assignment with `variables[i]` set exactly when bit `i` of `mask` is.
fn assignment_for(mask: u64, variables: &[VariableId]) -> Assignment {
    variables
        .iter()
        .enumerate()
        .filter(|&(bit, _)| (mask >> bit) & 1 == 1)
        .map(|(_, &id)| id)
        .collect()
}
