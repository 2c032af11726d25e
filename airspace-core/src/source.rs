//! Reference-data records and read-only sources.
//!
//! Ingestion of the climate, aircraft-performance and flight-schedule data is
//! handled outside the core. External loaders expose their rows through the
//! source traits below; [`ProblemData`] is the in-memory implementation used
//! by the CLI and by tests.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{FlightLevel, FlightNumber, Timestamp, Voxel, VoxelIndex};

/// One climate sample: a canonical voxel at one timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VoxelRecord {
    /// Canonical index of the voxel.
    pub index: VoxelIndex,
    /// Longitude cell in whole degrees.
    pub longitude: i32,
    /// Latitude cell in whole degrees.
    pub latitude: i32,
    /// Flight-level cell.
    pub flight_level: FlightLevel,
    /// Sample time.
    pub time: Timestamp,
    /// Climate cost weighting for this voxel and time.
    pub climate_cost: f64,
}

impl VoxelRecord {
    /// The canonical voxel described by this record.
    #[must_use]
    pub const fn voxel(&self) -> Voxel {
        Voxel::new(
            Some(self.index),
            self.longitude,
            self.latitude,
            self.flight_level,
        )
    }
}

/// Aircraft performance figures for one flight level, in source units.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PerformanceRecord {
    /// Flight level the figures apply to.
    pub flight_level: FlightLevel,
    /// True airspeed in knots.
    pub cruise_speed_kts: f64,
    /// Rate of descent in feet per minute.
    pub descent_rate_ft_min: f64,
    /// Rate of climb in feet per minute.
    pub climb_rate_ft_min: f64,
    /// Fuel burn while cruising, kg/min.
    pub cruise_fuel_kg_min: f64,
    /// Fuel burn while descending, kg/min.
    pub descent_fuel_kg_min: f64,
    /// Fuel burn while climbing, kg/min.
    pub climb_fuel_kg_min: f64,
}

/// A raw, unsnapped cell coordinate from a flight schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Coordinate {
    /// Longitude cell in whole degrees.
    pub longitude: i32,
    /// Latitude cell in whole degrees.
    pub latitude: i32,
    /// Flight-level cell.
    pub flight_level: FlightLevel,
}

impl Coordinate {
    /// A transient voxel at this coordinate.
    #[must_use]
    pub const fn voxel(&self) -> Voxel {
        Voxel::unindexed(self.longitude, self.latitude, self.flight_level)
    }
}

/// One scheduled flight before snapping to the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlightRequestRecord {
    /// Flight identifier, unique within a problem instance.
    pub flight_number: FlightNumber,
    /// Departure coordinate.
    pub start: Coordinate,
    /// Departure time.
    pub start_time: Timestamp,
    /// Arrival coordinate.
    pub end: Coordinate,
}

/// Read-only access to voxel climate samples.
///
/// Records are yielded in the source's canonical order, which determines
/// tie-breaking in nearest-voxel lookups.
pub trait VoxelRecordSource {
    /// Iterate over every (voxel, time) sample.
    fn voxel_records(&self) -> Box<dyn Iterator<Item = VoxelRecord> + Send + '_>;
}

/// Read-only access to aircraft performance rows.
pub trait PerformanceSource {
    /// Iterate over performance rows, one per flight level.
    fn performance_records(&self) -> Box<dyn Iterator<Item = PerformanceRecord> + Send + '_>;
}

/// Read-only access to the flight schedule.
pub trait FlightRequestSource {
    /// Iterate over scheduled flights.
    fn flight_requests(&self) -> Box<dyn Iterator<Item = FlightRequestRecord> + Send + '_>;
}

/// In-memory problem description implementing every source trait.
///
/// # Examples
/// ```
/// use airspace_core::source::{ProblemData, VoxelRecordSource};
///
/// let data = ProblemData::default();
/// assert_eq!(data.voxel_records().count(), 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProblemData {
    /// Climate samples.
    #[cfg_attr(feature = "serde", serde(default))]
    pub voxels: Vec<VoxelRecord>,
    /// Aircraft performance table.
    #[cfg_attr(feature = "serde", serde(default))]
    pub performance: Vec<PerformanceRecord>,
    /// Flight schedule.
    #[cfg_attr(feature = "serde", serde(default))]
    pub flights: Vec<FlightRequestRecord>,
}

impl VoxelRecordSource for ProblemData {
    fn voxel_records(&self) -> Box<dyn Iterator<Item = VoxelRecord> + Send + '_> {
        Box::new(self.voxels.iter().copied())
    }
}

impl PerformanceSource for ProblemData {
    fn performance_records(&self) -> Box<dyn Iterator<Item = PerformanceRecord> + Send + '_> {
        Box::new(self.performance.iter().copied())
    }
}

impl FlightRequestSource for ProblemData {
    fn flight_requests(&self) -> Box<dyn Iterator<Item = FlightRequestRecord> + Send + '_> {
        Box::new(self.flights.iter().copied())
    }
}
