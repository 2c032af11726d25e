//! Errors raised by the grid module.

use thiserror::Error;

use crate::VoxelIndex;

/// Errors raised while constructing or querying a voxel grid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// A regular grid was requested with a zero-length axis.
    #[error("grid axis {axis} must contain at least one cell")]
    EmptyExtent {
        /// Name of the offending axis (`x`, `y` or `z`).
        axis: &'static str,
    },
    /// A lookup was attempted against a grid without voxels.
    #[error("no voxels loaded")]
    EmptyGrid,
    /// Two records share an index but describe different cells.
    #[error("voxel {index} appears with conflicting coordinates")]
    InconsistentVoxel {
        /// Index shared by the conflicting records.
        index: VoxelIndex,
    },
    /// The requested voxel index is not part of the grid.
    #[error("voxel {index} is not part of the grid")]
    UnknownVoxel {
        /// The missing index.
        index: VoxelIndex,
    },
}
