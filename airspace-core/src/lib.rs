//! Core domain types for the airspace trajectory engine.
//!
//! The crate turns climate-cost samples, aircraft performance and a flight
//! schedule into a solver-agnostic constraint model over binary variables.
//! Two formulations are offered:
//!
//! - **dense**: time-indexed occupancy of a regular `x × y × z` grid with
//!   separation and flight-level-change constraints, see
//!   [`builder::build_dense`];
//! - **sparse**: per-flight edge selection over a voxel adjacency graph, see
//!   [`builder::build_sparse`].
//!
//! Models can be evaluated against an [`Assignment`](model::Assignment),
//! written in LP format with [`model::lp::write_lp`], handed to any
//! [`Solver`] and decoded back into per-flight [`Trajectory`] values.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod builder;
pub mod cost;
mod decode;
mod flight;
mod grid;
pub mod model;
mod performance;
mod solver;
pub mod source;
pub mod units;
mod voxel;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use builder::{BuildError, Formulation};
pub use decode::{TimedCell, Trajectory, decode};
pub use flight::{FlightError, FlightNumber, FlightRequest, FlightRequestSet};
pub use grid::{
    AdjacencyThresholds, Cell, GraphEdge, GridError, Maneuver, RegularGrid, VoxelGraph,
};
pub use model::{ConstraintModel, FormulationKind};
pub use performance::{AircraftPerformance, Direction, PerformanceError, PerformanceTable};
pub use solver::{SolveError, SolveOutcome, Solution, Solver};
pub use voxel::{FlightLevel, MetricPosition, TimeVoxel, Timestamp, Voxel, VoxelIndex};
