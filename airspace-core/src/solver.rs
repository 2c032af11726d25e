//! Solver abstraction for constraint models.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Assignment, ConstraintModel};

/// An optimal or best-found assignment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Solution {
    /// Variables set to one.
    pub assignment: Assignment,
    /// Objective value of `assignment`.
    pub objective: f64,
}

/// Result of a completed solve.
///
/// Infeasibility is a normal outcome rather than an error.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SolveOutcome {
    /// A feasible assignment was found.
    Solved(Solution),
    /// No assignment satisfies every constraint.
    NoFeasibleSolution,
}

impl SolveOutcome {
    /// The solution, if one was found.
    #[must_use]
    pub const fn solution(&self) -> Option<&Solution> {
        match self {
            Self::Solved(solution) => Some(solution),
            Self::NoFeasibleSolution => None,
        }
    }
}

/// Errors returned by [`Solver::solve`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// The backend cannot handle a model this large.
    #[error("model has {variables} variables; this solver accepts at most {limit}")]
    ModelTooLarge {
        /// Variables in the model.
        variables: usize,
        /// Backend limit.
        limit: usize,
    },
    /// The backend failed for a reason of its own.
    #[error("solver backend failed: {message}")]
    Backend {
        /// Backend-specific description.
        message: String,
    },
}

/// Find an assignment minimising a model's objective.
///
/// Solvers must be `Send + Sync` so one instance can serve several builds.
pub trait Solver: Send + Sync {
    /// Solve `model`.
    fn solve(&self, model: &ConstraintModel) -> Result<SolveOutcome, SolveError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{DenseAircraft, DenseConfig, DenseProblem, build_dense};
    use crate::cost::UniformCellCost;
    use crate::grid::{Cell, RegularGrid};
    use crate::FlightNumber;
    use rstest::rstest;

    struct RefusingSolver;

    impl Solver for RefusingSolver {
        fn solve(&self, model: &ConstraintModel) -> Result<SolveOutcome, SolveError> {
            if model.variable_count() > 10 {
                Err(SolveError::ModelTooLarge {
                    variables: model.variable_count(),
                    limit: 10,
                })
            } else {
                Ok(SolveOutcome::NoFeasibleSolution)
            }
        }
    }

    #[rstest]
    fn solvers_report_limits() {
        let problem = DenseProblem {
            grid: RegularGrid::new(2, 2, 1).expect("valid grid"),
            aircraft: vec![DenseAircraft {
                flight: FlightNumber(1),
                start: Cell::new(0, 0, 0),
                destination: Cell::new(1, 1, 0),
            }],
            cost: &UniformCellCost(1),
        };
        let model = build_dense(&DenseConfig::default(), &problem).expect("valid problem");
        let err = RefusingSolver.solve(&model).expect_err("too large");
        assert_eq!(
            err,
            SolveError::ModelTooLarge {
                variables: 20 * 4 * 3,
                limit: 10
            }
        );
        assert!(SolveOutcome::NoFeasibleSolution.solution().is_none());
    }
}
