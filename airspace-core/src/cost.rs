//! Transition and occupancy costs.
//!
//! The graph formulation prices each edge with [`edge_cost`], splitting the
//! distance evenly between the two endpoints and charging each half at that
//! endpoint's fuel burn, speed and climate cost. The dense formulation prices
//! each occupancy indicator through a [`DenseCellCost`].

use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::{Cell, GridError, Maneuver, RegularGrid};
use crate::performance::{Direction, PerformanceError, PerformanceTable};
use crate::source::VoxelRecord;
use crate::{FlightLevel, Voxel};

/// Errors raised while pricing dense occupancy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CostError {
    /// No climate sample matches the cell's bins.
    #[error("no climate sample for cell {cell}")]
    MissingClimate {
        /// The unpriced cell.
        cell: Cell,
    },
    /// The cell's flight-level bin does not exist.
    #[error("no flight-level bin {z}")]
    MissingFlightLevel {
        /// Vertical position of the cell.
        z: usize,
    },
    /// A scaled coefficient does not fit in an `i64`.
    #[error("cost coefficient for cell {cell} overflows")]
    Overflow {
        /// The cell whose coefficient overflowed.
        cell: Cell,
    },
    /// Fuel burn for a bin's flight level is unavailable.
    #[error(transparent)]
    Performance(#[from] PerformanceError),
}

/// Cost of flying from `a` to `b` given the climate costs sampled at each end.
///
/// # Examples
/// ```
/// use airspace_core::cost::edge_cost;
/// use airspace_core::source::PerformanceRecord;
/// use airspace_core::{FlightLevel, PerformanceTable, Voxel};
///
/// # fn main() -> Result<(), airspace_core::PerformanceError> {
/// let table = PerformanceTable::from_records([PerformanceRecord {
///     flight_level: FlightLevel(300),
///     cruise_speed_kts: 1.94384,
///     descent_rate_ft_min: 0.0,
///     climb_rate_ft_min: 0.0,
///     cruise_fuel_kg_min: 60.0,
///     descent_fuel_kg_min: 60.0,
///     climb_fuel_kg_min: 60.0,
/// }])?;
/// let a = Voxel::unindexed(0, 0, FlightLevel(300));
/// let b = Voxel::unindexed(1, 0, FlightLevel(300));
/// // 85 km at 1 m/s burning 1 kg/s, half at each climate weight.
/// let cost = edge_cost(&table, &a, &b, 1.0, 3.0)?;
/// assert!((cost - 170_000.0).abs() < 1e-6);
/// # Ok(())
/// # }
/// ```
#[expect(clippy::float_arithmetic, reason = "cost is a product of rates and times")]
pub fn edge_cost(
    table: &PerformanceTable,
    a: &Voxel,
    b: &Voxel,
    climate_a: f64,
    climate_b: f64,
) -> Result<f64, PerformanceError> {
    let direction = Direction::between(a.flight_level(), b.flight_level());
    let half = a.distance(b) / 2.0;
    let leg = |level: FlightLevel, climate: f64| -> Result<f64, PerformanceError> {
        Ok(climate * table.fuel_rate(level, direction)? * table.transit_time(half, level)?)
    };
    Ok(leg(a.flight_level(), climate_a)? + leg(b.flight_level(), climate_b)?)
}

/// Integer weight of one dense occupancy indicator.
pub trait DenseCellCost: Send + Sync {
    /// Weight of occupying `cell` with `maneuver` for one step.
    fn coefficient(&self, cell: Cell, maneuver: Maneuver) -> Result<i64, CostError>;
}

/// The same weight for every cell and manoeuvre.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct UniformCellCost(pub i64);

impl DenseCellCost for UniformCellCost {
    fn coefficient(&self, _cell: Cell, _maneuver: Maneuver) -> Result<i64, CostError> {
        Ok(self.0)
    }
}

/// Scale factors applied before truncating costs to integers.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CostScales {
    /// Multiplier for climate costs.
    pub climate: f64,
    /// Multiplier for fuel burn in kg/min.
    pub fuel: f64,
}

impl Default for CostScales {
    fn default() -> Self {
        Self {
            climate: 1e6,
            fuel: 10.0,
        }
    }
}

/// Climate-weighted fuel burn over the bins of a climate sample set.
///
/// The distinct longitudes, latitudes and flight levels of the samples, in
/// order of first appearance, become the `x`, `y` and `z` axes. A cell's
/// coefficient is `trunc(climate scale × climate) × trunc(fuel scale × fuel)`
/// where the climate comes from the first sample in the cell and the fuel burn
/// is the manoeuvre's regime at the cell's flight level.
#[derive(Debug, Clone, PartialEq)]
pub struct ClimateFuelCellCost {
    longitudes: Vec<i32>,
    latitudes: Vec<i32>,
    flight_levels: Vec<FlightLevel>,
    climate: HashMap<(usize, usize, usize), i64>,
    fuel: Vec<[i64; 3]>,
}

impl ClimateFuelCellCost {
    /// Bin `records` and precompute the scaled costs.
    ///
    /// Fails when a binned flight level has no performance row.
    pub fn new(
        records: &[VoxelRecord],
        table: &PerformanceTable,
        scales: CostScales,
    ) -> Result<Self, CostError> {
        let mut longitudes = Vec::new();
        let mut latitudes = Vec::new();
        let mut flight_levels = Vec::new();
        let mut climate = HashMap::new();

        for record in records {
            let x = bin(&mut longitudes, record.longitude);
            let y = bin(&mut latitudes, record.latitude);
            let z = bin(&mut flight_levels, record.flight_level);
            climate
                .entry((x, y, z))
                .or_insert_with(|| truncate(scales.climate, record.climate_cost));
        }

        let fuel = flight_levels
            .iter()
            .map(|&level| {
                let row = table.lookup(level)?;
                Ok(Maneuver::ALL.map(|maneuver| {
                    truncate(scales.fuel, row.fuel_rate_kg_min(Direction::from(maneuver)))
                }))
            })
            .collect::<Result<Vec<_>, PerformanceError>>()?;

        log::debug!(
            "binned {} climate samples into {}x{}x{} cells",
            records.len(),
            longitudes.len(),
            latitudes.len(),
            flight_levels.len()
        );
        Ok(Self {
            longitudes,
            latitudes,
            flight_levels,
            climate,
            fuel,
        })
    }

    /// Regular grid spanning every bin.
    pub fn grid(&self) -> Result<RegularGrid, GridError> {
        RegularGrid::new(
            self.longitudes.len(),
            self.latitudes.len(),
            self.flight_levels.len(),
        )
    }

    /// Cell whose bins hold the given coordinates, if every bin exists.
    #[must_use]
    pub fn cell_of(&self, longitude: i32, latitude: i32, flight_level: FlightLevel) -> Option<Cell> {
        let x = self.longitudes.iter().position(|&lon| lon == longitude)?;
        let y = self.latitudes.iter().position(|&lat| lat == latitude)?;
        let z = self
            .flight_levels
            .iter()
            .position(|&level| level == flight_level)?;
        Some(Cell::new(x, y, z))
    }

    /// Flight level of vertical bin `z`.
    #[must_use]
    pub fn flight_level(&self, z: usize) -> Option<FlightLevel> {
        self.flight_levels.get(z).copied()
    }
}

impl DenseCellCost for ClimateFuelCellCost {
    fn coefficient(&self, cell: Cell, maneuver: Maneuver) -> Result<i64, CostError> {
        let climate = self
            .climate
            .get(&(cell.x, cell.y, cell.z))
            .copied()
            .ok_or(CostError::MissingClimate { cell })?;
        let fuel = self
            .fuel
            .get(cell.z)
            .and_then(|row| row.get(maneuver.ordinal()))
            .copied()
            .ok_or(CostError::MissingFlightLevel { z: cell.z })?;
        climate
            .checked_mul(fuel)
            .ok_or(CostError::Overflow { cell })
    }
}

fn bin<T: PartialEq + Copy>(bins: &mut Vec<T>, value: T) -> usize {
    if let Some(position) = bins.iter().position(|&known| known == value) {
        return position;
    }
    bins.push(value);
    bins.len() - 1
}

#[expect(clippy::float_arithmetic, reason = "cost scaling")]
#[expect(
    clippy::cast_possible_truncation,
    reason = "costs are truncated to integers by definition"
)]
fn truncate(scale: f64, value: f64) -> i64 {
    (scale * value).trunc() as i64
}
