//! Voxel grids and their adjacency policies.
//!
//! Two shapes are supported: a [`RegularGrid`] addressed by integer cells with
//! clamped neighbours, and a [`VoxelGraph`] of index-identified voxels loaded
//! from irregular climate samples and joined by distance thresholds.

mod error;
mod graph;
mod nearest;
mod regular;

pub use error::GridError;
pub use graph::{AdjacencyThresholds, GraphEdge, VoxelGraph};
pub use regular::{Cell, Maneuver, RegularGrid};
