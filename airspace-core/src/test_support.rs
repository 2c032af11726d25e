//! Test-only fixtures: in-memory sources, sample performance data and small
//! graphs used by unit, behaviour and downstream solver tests.

use crate::grid::{AdjacencyThresholds, GridError, VoxelGraph};
use crate::performance::{PerformanceError, PerformanceTable};
use crate::source::{PerformanceRecord, VoxelRecord, VoxelRecordSource};
use crate::{FlightLevel, Timestamp, VoxelIndex};

/// In-memory `VoxelRecordSource` that yields its records in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryVoxelSource {
    records: Vec<VoxelRecord>,
}

impl MemoryVoxelSource {
    /// Create a source from a collection of records.
    #[must_use]
    pub fn with_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = VoxelRecord>,
    {
        Self {
            records: records.into_iter().collect(),
        }
    }

    /// Append one sample.
    pub fn push(&mut self, record: VoxelRecord) {
        self.records.push(record);
    }
}

impl VoxelRecordSource for MemoryVoxelSource {
    fn voxel_records(&self) -> Box<dyn Iterator<Item = VoxelRecord> + Send + '_> {
        Box::new(self.records.iter().copied())
    }
}

/// A climate sample at FL300 and time zero.
#[must_use]
pub const fn sample(index: u32, longitude: i32, latitude: i32, climate_cost: f64) -> VoxelRecord {
    VoxelRecord {
        index: VoxelIndex(index),
        longitude,
        latitude,
        flight_level: FlightLevel(300),
        time: Timestamp(0),
        climate_cost,
    }
}

/// Performance rows for FL300 to FL340 in steps of ten, with a faster and
/// thirstier aircraft higher up.
#[must_use]
pub fn sample_performance_records() -> Vec<PerformanceRecord> {
    [
        (300, 440.0, 42.0),
        (310, 445.0, 41.0),
        (320, 450.0, 40.0),
        (330, 455.0, 39.5),
        (340, 460.0, 39.0),
    ]
    .into_iter()
    .map(|(level, speed, cruise)| PerformanceRecord {
        flight_level: FlightLevel(level),
        cruise_speed_kts: speed,
        descent_rate_ft_min: 2000.0,
        climb_rate_ft_min: 1200.0,
        cruise_fuel_kg_min: cruise,
        descent_fuel_kg_min: 12.0,
        climb_fuel_kg_min: 75.0,
    })
    .collect()
}

/// [`sample_performance_records`] as a table.
pub fn sample_performance_table() -> Result<PerformanceTable, PerformanceError> {
    PerformanceTable::from_records(sample_performance_records())
}

/// Three voxels along one latitude at the given longitudes, indexed 1 to 3,
/// with the given climate costs.
pub fn three_voxel_graph(
    longitudes: [i32; 3],
    climate: [f64; 3],
) -> Result<VoxelGraph, GridError> {
    let records: Vec<VoxelRecord> = (1_u32..)
        .zip(longitudes.into_iter().zip(climate))
        .map(|(index, (longitude, cost))| sample(index, longitude, 0, cost))
        .collect();
    VoxelGraph::from_source(
        &MemoryVoxelSource::with_records(records),
        AdjacencyThresholds::default(),
    )
}
