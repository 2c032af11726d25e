//! Dense, integer-addressed airspace grid.

use std::collections::BTreeSet;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::GridError;

/// Integer coordinates of a cell in a [`RegularGrid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cell {
    /// Longitude axis position.
    pub x: usize,
    /// Latitude axis position.
    pub y: usize,
    /// Flight-level axis position.
    pub z: usize,
}

impl Cell {
    /// Construct a cell from its coordinates.
    #[must_use]
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Vertical manoeuvre class attached to an occupancy indicator.
///
/// The ordinal order (`Descend`, `Level`, `Climb`) is part of the model's
/// variable layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Maneuver {
    /// One flight level down.
    Descend,
    /// Same flight level.
    Level,
    /// One flight level up.
    Climb,
}

impl Maneuver {
    /// Every manoeuvre class in ordinal order.
    pub const ALL: [Self; 3] = [Self::Descend, Self::Level, Self::Climb];

    /// Position of the class in [`Maneuver::ALL`].
    #[must_use]
    pub const fn ordinal(self) -> usize {
        match self {
            Self::Descend => 0,
            Self::Level => 1,
            Self::Climb => 2,
        }
    }
}

impl fmt::Display for Maneuver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Descend => "descend",
            Self::Level => "level",
            Self::Climb => "climb",
        })
    }
}

/// A regular `size_x × size_y × size_z` grid.
///
/// Neighbour requests that would leave the grid clamp to the boundary: an
/// aircraft at the edge "moves" onto itself rather than out of the airspace.
///
/// # Examples
/// ```
/// use airspace_core::{Cell, RegularGrid};
///
/// # fn main() -> Result<(), airspace_core::GridError> {
/// let grid = RegularGrid::new(5, 5, 1)?;
/// let [east, west, north, south] = grid.horizontal_neighbors(Cell::new(0, 0, 0));
/// assert_eq!(east, Cell::new(1, 0, 0));
/// assert_eq!(west, Cell::new(0, 0, 0));
/// assert_eq!(north, Cell::new(0, 1, 0));
/// assert_eq!(south, Cell::new(0, 0, 0));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RegularGrid {
    size_x: usize,
    size_y: usize,
    size_z: usize,
}

impl RegularGrid {
    /// Construct a grid; every axis must hold at least one cell.
    pub const fn new(size_x: usize, size_y: usize, size_z: usize) -> Result<Self, GridError> {
        if size_x == 0 {
            return Err(GridError::EmptyExtent { axis: "x" });
        }
        if size_y == 0 {
            return Err(GridError::EmptyExtent { axis: "y" });
        }
        if size_z == 0 {
            return Err(GridError::EmptyExtent { axis: "z" });
        }
        Ok(Self {
            size_x,
            size_y,
            size_z,
        })
    }

    /// Number of cells along the longitude axis.
    #[must_use]
    pub const fn size_x(&self) -> usize {
        self.size_x
    }

    /// Number of cells along the latitude axis.
    #[must_use]
    pub const fn size_y(&self) -> usize {
        self.size_y
    }

    /// Number of flight levels.
    #[must_use]
    pub const fn size_z(&self) -> usize {
        self.size_z
    }

    /// Total number of cells.
    #[must_use]
    pub const fn cell_count(&self) -> usize {
        self.size_x * self.size_y * self.size_z
    }

    /// Whether `cell` lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: Cell) -> bool {
        cell.x < self.size_x && cell.y < self.size_y && cell.z < self.size_z
    }

    /// Whether `z` is the highest flight level of the grid.
    #[must_use]
    pub const fn is_top_level(&self, z: usize) -> bool {
        z + 1 == self.size_z
    }

    /// Every cell in canonical order: `x` outermost, then `y`, then `z`.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.size_x).flat_map(move |x| {
            (0..self.size_y).flat_map(move |y| (0..self.size_z).map(move |z| Cell::new(x, y, z)))
        })
    }

    /// The four horizontal neighbours in the order `+x`, `-x`, `+y`, `-y`,
    /// each clamped to the grid.
    #[must_use]
    pub fn horizontal_neighbors(&self, cell: Cell) -> [Cell; 4] {
        [
            Cell::new(clamp_up(cell.x, self.size_x), cell.y, cell.z),
            Cell::new(cell.x.saturating_sub(1), cell.y, cell.z),
            Cell::new(cell.x, clamp_up(cell.y, self.size_y), cell.z),
            Cell::new(cell.x, cell.y.saturating_sub(1), cell.z),
        ]
    }

    /// The cell reached by applying `maneuver` vertically, clamped to the grid.
    #[must_use]
    pub fn vertical_neighbor(&self, cell: Cell, maneuver: Maneuver) -> Cell {
        let z = match maneuver {
            Maneuver::Descend => cell.z.saturating_sub(1),
            Maneuver::Level => cell.z,
            Maneuver::Climb => clamp_up(cell.z, self.size_z),
        };
        Cell::new(cell.x, cell.y, z)
    }

    /// Cells reachable in one step: a horizontal move combined with any
    /// manoeuvre class, all clamped.
    #[must_use]
    pub fn neighbors(&self, cell: Cell) -> BTreeSet<Cell> {
        Maneuver::ALL
            .into_iter()
            .flat_map(|maneuver| {
                self.horizontal_neighbors(self.vertical_neighbor(cell, maneuver))
            })
            .collect()
    }
}

fn clamp_up(value: usize, size: usize) -> usize {
    value.saturating_add(1).min(size.saturating_sub(1))
}
