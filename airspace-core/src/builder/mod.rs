//! Constraint-model builders.
//!
//! Both formulations go through one [`ModelBuilder`], which owns the variable
//! namespace and the emitted constraints for a single build. Nothing is shared
//! between builds: building the same inputs twice yields identical models.

mod dense;
mod error;
mod sparse;

pub use dense::{DenseAircraft, DenseConfig, DenseProblem, build_dense};
pub use error::{BuildError, Endpoint};
pub use sparse::{GraphInputs, SparseConfig, SparseProblem, build_sparse};

use crate::FlightNumber;
use crate::model::{
    Constraint, ConstraintModel, Expression, FormulationKind, VariableId, VariableKey,
    VariableRegistry,
};

/// A formulation together with its inputs.
pub enum Formulation<'a> {
    /// Time-indexed occupancy over a regular grid.
    Dense {
        /// Horizon and reward.
        config: DenseConfig,
        /// Grid, aircraft and cost.
        problem: DenseProblem<'a>,
    },
    /// Edge selection over a voxel graph.
    Sparse {
        /// Adjacency checks.
        config: SparseConfig,
        /// Graph, performance and flights.
        problem: SparseProblem<'a>,
    },
}

impl Formulation<'_> {
    /// Build the model for this formulation.
    pub fn build(&self) -> Result<ConstraintModel, BuildError> {
        match self {
            Self::Dense { config, problem } => build_dense(config, problem),
            Self::Sparse { config, problem } => build_sparse(config, problem),
        }
    }

    /// Which formulation this is.
    #[must_use]
    pub const fn kind(&self) -> FormulationKind {
        match self {
            Self::Dense { .. } => FormulationKind::Dense,
            Self::Sparse { .. } => FormulationKind::Sparse,
        }
    }
}

/// Accumulates variables, constraints and the objective of one build.
#[derive(Debug)]
pub struct ModelBuilder {
    model: ConstraintModel,
}

impl ModelBuilder {
    /// Start an empty model for `flights`.
    #[must_use]
    pub fn new(formulation: FormulationKind, flights: Vec<FlightNumber>) -> Self {
        Self {
            model: ConstraintModel {
                formulation,
                flights,
                registry: VariableRegistry::default(),
                constraints: Vec::new(),
                objective: Expression::new(),
            },
        }
    }

    /// Create the variable for `key`.
    ///
    /// Each key may be declared once per build; a second declaration is a
    /// [`ModelError::VariableKeyCollision`](crate::model::ModelError).
    pub fn declare(&mut self, key: impl Into<VariableKey>) -> Result<VariableId, BuildError> {
        self.model
            .registry
            .declare(key.into())
            .map_err(BuildError::from)
    }

    /// Id of the variable for `key`, created on first use.
    pub fn variable(&mut self, key: impl Into<VariableKey>) -> VariableId {
        self.model.registry.intern(key.into())
    }

    /// Append a constraint.
    pub fn constrain(&mut self, constraint: Constraint) {
        self.model.constraints.push(constraint);
    }

    /// Replace the objective.
    pub fn set_objective(&mut self, objective: Expression) {
        self.model.objective = objective;
    }

    /// Finish the build.
    #[must_use]
    pub fn finish(self) -> ConstraintModel {
        log::debug!(
            "built {} model: {} flights, {} variables, {} constraints",
            self.model.formulation,
            self.model.flights.len(),
            self.model.registry.len(),
            self.model.constraints.len()
        );
        self.model
    }
}
