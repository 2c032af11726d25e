//! Addressable airspace cells.
//!
//! A [`Voxel`] is one longitude × latitude × flight-level cell. Canonical
//! voxels carry a [`VoxelIndex`] assigned when the grid is loaded; transient
//! voxels parsed from flight requests have no index until they are snapped to
//! the nearest canonical voxel.

use std::fmt;

use geo::{Coord, Distance, Euclidean, Point};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::units;

/// Stable identifier of a canonical voxel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct VoxelIndex(pub u32);

impl fmt::Display for VoxelIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Discretised altitude band in hundreds of feet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct FlightLevel(pub u16);

impl FlightLevel {
    /// Altitude of this flight level in metres.
    #[must_use]
    pub fn metres(self) -> f64 {
        units::flight_level_to_metres(self.0)
    }
}

impl fmt::Display for FlightLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FL{:03}", self.0)
    }
}

/// Opaque, ordered instant attached to a voxel sample.
///
/// The core only compares timestamps for equality and order; sources decide
/// the epoch and resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct Timestamp(pub i64);

/// Position of a voxel in the metric frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricPosition {
    /// Horizontal position in metres (`x = longitude`, `y = latitude`).
    pub horizontal: Coord<f64>,
    /// Altitude in metres.
    pub altitude: f64,
}

impl MetricPosition {
    /// Coordinates as an `[x, y, altitude]` triple.
    #[must_use]
    pub const fn to_array(self) -> [f64; 3] {
        [self.horizontal.x, self.horizontal.y, self.altitude]
    }
}

/// A single discretised airspace cell.
///
/// Two voxels that both carry an index are equal iff the indices match.
/// Otherwise equality falls back to the cell coordinates, which is what lets a
/// transient flight voxel compare equal to the canonical voxel it was snapped
/// to. Because this relation is not transitive, `Voxel` deliberately does not
/// implement `Eq` or `Hash`; key maps by [`VoxelIndex`] instead.
///
/// # Examples
/// ```
/// use airspace_core::{FlightLevel, Voxel, VoxelIndex};
///
/// let canonical = Voxel::new(Some(VoxelIndex(7)), 10, 50, FlightLevel(350));
/// let parsed = Voxel::unindexed(10, 50, FlightLevel(350));
/// assert_eq!(canonical, parsed);
/// ```
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Voxel {
    index: Option<VoxelIndex>,
    longitude: i32,
    latitude: i32,
    flight_level: FlightLevel,
}

impl Voxel {
    /// Construct a voxel from its cell coordinates.
    #[must_use]
    pub const fn new(
        index: Option<VoxelIndex>,
        longitude: i32,
        latitude: i32,
        flight_level: FlightLevel,
    ) -> Self {
        Self {
            index,
            longitude,
            latitude,
            flight_level,
        }
    }

    /// Construct a transient voxel that has not been assigned a grid index.
    #[must_use]
    pub const fn unindexed(longitude: i32, latitude: i32, flight_level: FlightLevel) -> Self {
        Self::new(None, longitude, latitude, flight_level)
    }

    /// Grid index, if this voxel is canonical.
    #[must_use]
    pub const fn index(&self) -> Option<VoxelIndex> {
        self.index
    }

    /// Longitude cell in whole degrees.
    #[must_use]
    pub const fn longitude(&self) -> i32 {
        self.longitude
    }

    /// Latitude cell in whole degrees.
    #[must_use]
    pub const fn latitude(&self) -> i32 {
        self.latitude
    }

    /// Flight-level cell.
    #[must_use]
    pub const fn flight_level(&self) -> FlightLevel {
        self.flight_level
    }

    /// Position in the metric frame.
    #[must_use]
    pub fn position(&self) -> MetricPosition {
        MetricPosition {
            horizontal: Coord {
                x: units::longitude_to_metres(self.longitude),
                y: units::latitude_to_metres(self.latitude),
            },
            altitude: self.flight_level.metres(),
        }
    }

    /// Horizontal distance to `other` in metres.
    #[must_use]
    pub fn horizontal_distance(&self, other: &Self) -> f64 {
        let from = Point::from(self.position().horizontal);
        let to = Point::from(other.position().horizontal);
        Euclidean.distance(from, to)
    }

    /// Absolute altitude difference to `other` in metres.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "altitude difference in metres")]
    pub fn vertical_distance(&self, other: &Self) -> f64 {
        (self.flight_level.metres() - other.flight_level.metres()).abs()
    }

    /// Full 3D Euclidean distance to `other` in metres.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "Euclidean distance in metres")]
    pub fn distance(&self, other: &Self) -> f64 {
        let [ax, ay, az] = self.position().to_array();
        let [bx, by, bz] = other.position().to_array();
        ((ax - bx).powi(2) + (ay - by).powi(2) + (az - bz).powi(2)).sqrt()
    }

    pub(crate) const fn same_cell(&self, other: &Self) -> bool {
        self.longitude == other.longitude
            && self.latitude == other.latitude
            && self.flight_level.0 == other.flight_level.0
    }
}

impl PartialEq for Voxel {
    fn eq(&self, other: &Self) -> bool {
        if let (Some(lhs), Some(rhs)) = (self.index, other.index) {
            return lhs == rhs;
        }
        // Metric coordinates are an exact function of the integer cell, so
        // comparing cells is equivalent to comparing metric positions.
        self.same_cell(other)
    }
}

impl fmt::Display for Voxel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "#{index} ")?,
            None => f.write_str("#- ")?,
        }
        write!(
            f,
            "(lon {}, lat {}, {})",
            self.longitude, self.latitude, self.flight_level
        )
    }
}

/// A voxel bound to an optional timestamp.
///
/// Destination voxels carry no time: they may be reached at any point of the
/// planning horizon.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimeVoxel {
    /// The spatial cell.
    pub voxel: Voxel,
    /// When the cell is occupied, if time-bound.
    pub time: Option<Timestamp>,
}

impl TimeVoxel {
    /// Bind `voxel` to `time`.
    #[must_use]
    pub const fn at(voxel: Voxel, time: Timestamp) -> Self {
        Self {
            voxel,
            time: Some(time),
        }
    }

    /// A voxel that is not bound to any timestamp.
    #[must_use]
    pub const fn untimed(voxel: Voxel) -> Self {
        Self { voxel, time: None }
    }
}
