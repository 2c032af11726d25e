//! Errors raised while building a constraint model.

use std::fmt;

use thiserror::Error;

use crate::FlightNumber;
use crate::cost::CostError;
use crate::flight::FlightError;
use crate::grid::{Cell, GridError};
use crate::model::ModelError;
use crate::performance::PerformanceError;

/// End of a flight that lacks graph edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// The start voxel has no outgoing edge.
    Start,
    /// The destination voxel has no incoming edge.
    Destination,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Start => "start has no outgoing edge",
            Self::Destination => "destination has no incoming edge",
        })
    }
}

/// Errors returned by the model builders.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The dense horizon has no time steps.
    #[error("planning horizon must contain at least one step")]
    EmptyHorizon,
    /// A start or destination cell lies outside the grid.
    #[error("flight {flight}: cell {cell} is outside the grid")]
    CellOutOfBounds {
        /// Flight with the offending endpoint.
        flight: FlightNumber,
        /// The offending cell.
        cell: Cell,
    },
    /// A flight endpoint was never snapped to a canonical voxel.
    #[error("flight {flight} has an endpoint that is not a grid voxel")]
    UnindexedVoxel {
        /// Flight with the unsnapped endpoint.
        flight: FlightNumber,
    },
    /// A flight cannot leave its start or enter its destination.
    #[error("flight {flight}: {endpoint}")]
    InfeasibleAdjacency {
        /// The stranded flight.
        flight: FlightNumber,
        /// Which end lacks edges.
        endpoint: Endpoint,
    },
    /// Grid lookup failed.
    #[error(transparent)]
    Grid(#[from] GridError),
    /// Performance lookup failed.
    #[error(transparent)]
    Performance(#[from] PerformanceError),
    /// Dense pricing failed.
    #[error(transparent)]
    Cost(#[from] CostError),
    /// Flight requests were inconsistent.
    #[error(transparent)]
    Flight(#[from] FlightError),
    /// The variable namespace rejected a key.
    #[error(transparent)]
    Model(#[from] ModelError),
}
