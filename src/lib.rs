//! Facade crate for the airspace constraint-model engine.
//!
//! This crate re-exports the core domain types and exposes the bundled
//! exhaustive solver behind a feature flag.

#![forbid(unsafe_code)]

pub use airspace_core::{
    AdjacencyThresholds, BuildError, ConstraintModel, FlightNumber, FlightRequest,
    FlightRequestSet, Formulation, PerformanceTable, RegularGrid, SolveError, SolveOutcome,
    Solution, Solver, Trajectory, VoxelGraph, builder, cost, decode, model, source,
};

#[cfg(feature = "solver-exhaustive")]
pub use airspace_solver_exhaustive::{ExhaustiveSolver, ExhaustiveSolverConfig};
