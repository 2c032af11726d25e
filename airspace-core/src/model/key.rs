//! Structured variable keys.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::grid::{Cell, Maneuver};
use crate::{FlightNumber, VoxelIndex};

/// Occupancy indicator of the dense formulation: aircraft `aircraft` is in
/// `cell` at step `time` performing `maneuver`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OccupancyKey {
    /// Discrete time step.
    pub time: usize,
    /// Position of the aircraft in the problem's aircraft list.
    pub aircraft: usize,
    /// Occupied cell.
    pub cell: Cell,
    /// Manoeuvre class.
    pub maneuver: Maneuver,
}

/// Edge indicator of the graph formulation: `flight` travels from `from` to
/// `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EdgeKey {
    /// Flight using the edge.
    pub flight: FlightNumber,
    /// Origin voxel.
    pub from: VoxelIndex,
    /// Target voxel.
    pub to: VoxelIndex,
}

/// Key of a binary decision variable.
///
/// Keys are compared structurally, never by rendered name, and always embed
/// the owning aircraft or flight so no variable is shared between aircraft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum VariableKey {
    /// Dense occupancy indicator.
    Occupancy(OccupancyKey),
    /// Graph edge indicator.
    Edge(EdgeKey),
}

impl From<OccupancyKey> for VariableKey {
    fn from(key: OccupancyKey) -> Self {
        Self::Occupancy(key)
    }
}

impl From<EdgeKey> for VariableKey {
    fn from(key: EdgeKey) -> Self {
        Self::Edge(key)
    }
}

impl fmt::Display for VariableKey {
    /// Render an identifier safe for LP-format files.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Occupancy(key) => write!(
                f,
                "q_t{}_a{}_x{}_y{}_z{}_{}",
                key.time, key.aircraft, key.cell.x, key.cell.y, key.cell.z, key.maneuver
            ),
            Self::Edge(key) => write!(f, "x_f{}_{}_{}", key.flight, key.from, key.to),
        }
    }
}

/// Dense handle of a variable within one [`VariableRegistry`].
///
/// [`VariableRegistry`]: super::VariableRegistry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct VariableId(pub(crate) usize);

impl VariableId {
    /// Position of the variable in declaration order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}
