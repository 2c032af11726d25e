//! Solver-agnostic constraint-model IR.
//!
//! A [`ConstraintModel`] is a set of named linear or quadratic constraints over
//! binary variables plus one objective to minimise. Variables are identified
//! by structured [`VariableKey`]s and referenced through dense
//! [`VariableId`]s handed out by the model's own [`VariableRegistry`]; ids from
//! one model are meaningless in another.

mod assignment;
mod constraint;
mod error;
mod expr;
mod key;
pub mod lp;
mod registry;

use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use assignment::Assignment;
pub use constraint::{Constraint, ConstraintKind, ConstraintLabel, Sense};
pub use error::ModelError;
pub use expr::Expression;
pub use key::{EdgeKey, OccupancyKey, VariableId, VariableKey};
pub use registry::VariableRegistry;

use crate::FlightNumber;

/// Which formulation produced a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FormulationKind {
    /// Time-indexed occupancy over a regular grid.
    Dense,
    /// Edge selection over a voxel graph.
    Sparse,
}

impl fmt::Display for FormulationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dense => "dense",
            Self::Sparse => "sparse",
        })
    }
}

/// Objective value and violated constraints of an assignment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Evaluation {
    /// Objective value.
    pub objective: f64,
    /// Labels of every unsatisfied constraint, in model order.
    pub violated: Vec<ConstraintLabel>,
}

impl Evaluation {
    /// Whether no constraint is violated.
    #[must_use]
    pub fn is_feasible(&self) -> bool {
        self.violated.is_empty()
    }
}

/// A complete model instance produced by one build.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintModel {
    pub(crate) formulation: FormulationKind,
    pub(crate) flights: Vec<FlightNumber>,
    pub(crate) registry: VariableRegistry,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) objective: Expression,
}

impl ConstraintModel {
    /// Formulation that produced this model.
    #[must_use]
    pub const fn formulation(&self) -> FormulationKind {
        self.formulation
    }

    /// Flights in aircraft order; dense occupancy keys index into this list.
    #[must_use]
    pub fn flights(&self) -> &[FlightNumber] {
        &self.flights
    }

    /// The model's variable namespace.
    #[must_use]
    pub const fn registry(&self) -> &VariableRegistry {
        &self.registry
    }

    /// Constraints in emission order.
    #[must_use]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Constraints of one family.
    pub fn constraints_of(&self, kind: ConstraintKind) -> impl Iterator<Item = &Constraint> + '_ {
        self.constraints
            .iter()
            .filter(move |constraint| constraint.label.kind() == kind)
    }

    /// Number of constraints per family.
    #[must_use]
    pub fn constraint_counts(&self) -> BTreeMap<ConstraintKind, usize> {
        let mut counts = BTreeMap::new();
        for constraint in &self.constraints {
            *counts.entry(constraint.label.kind()).or_insert(0) += 1;
        }
        counts
    }

    /// Objective to minimise.
    #[must_use]
    pub const fn objective(&self) -> &Expression {
        &self.objective
    }

    /// Number of variables.
    #[must_use]
    pub fn variable_count(&self) -> usize {
        self.registry.len()
    }

    /// Fail with [`ModelError::UnknownVariable`] if `assignment` sets a
    /// handle this model never issued.
    pub fn check_assignment(&self, assignment: &Assignment) -> Result<(), ModelError> {
        assignment
            .active()
            .find(|&id| self.registry.key(id).is_none())
            .map_or(Ok(()), |id| Err(ModelError::UnknownVariable { id }))
    }

    /// Objective value and violated constraints under `assignment`.
    ///
    /// Rejects assignments that set variables from outside the model.
    pub fn evaluate(&self, assignment: &Assignment) -> Result<Evaluation, ModelError> {
        self.check_assignment(assignment)?;
        let violated = self
            .constraints
            .iter()
            .filter(|constraint| !constraint.is_satisfied(assignment))
            .map(|constraint| constraint.label)
            .collect();
        Ok(Evaluation {
            objective: self.objective.evaluate(assignment),
            violated,
        })
    }

    /// Whether `assignment` satisfies every constraint.
    #[must_use]
    pub fn is_feasible(&self, assignment: &Assignment) -> bool {
        self.constraints
            .iter()
            .all(|constraint| constraint.is_satisfied(assignment))
    }
}
