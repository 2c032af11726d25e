//! Aircraft performance by flight level.
//!
//! Each flight level has exactly one row of cruise speed, vertical rates and
//! fuel burn. Lookups never interpolate: asking for a level that has no row is
//! an error.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::Maneuver;
use crate::source::{PerformanceRecord, PerformanceSource};
use crate::{FlightLevel, units};

/// Vertical regime of a transition, selecting the fuel-burn figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Direction {
    /// Moving to a higher flight level.
    Climb,
    /// Moving to a lower flight level.
    Descent,
    /// Staying at the same flight level.
    Cruise,
}

impl Direction {
    /// Regime of a transition from `start` to `end`.
    ///
    /// # Examples
    /// ```
    /// use airspace_core::{Direction, FlightLevel};
    ///
    /// assert_eq!(Direction::between(FlightLevel(340), FlightLevel(320)), Direction::Descent);
    /// assert_eq!(Direction::between(FlightLevel(320), FlightLevel(320)), Direction::Cruise);
    /// ```
    #[must_use]
    pub fn between(start: FlightLevel, end: FlightLevel) -> Self {
        match start.cmp(&end) {
            std::cmp::Ordering::Greater => Self::Descent,
            std::cmp::Ordering::Less => Self::Climb,
            std::cmp::Ordering::Equal => Self::Cruise,
        }
    }
}

impl From<Maneuver> for Direction {
    fn from(maneuver: Maneuver) -> Self {
        match maneuver {
            Maneuver::Descend => Self::Descent,
            Maneuver::Level => Self::Cruise,
            Maneuver::Climb => Self::Climb,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Climb => "climb",
            Self::Descent => "descent",
            Self::Cruise => "cruise",
        })
    }
}

/// Errors returned by [`PerformanceTable`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PerformanceError {
    /// No performance row exists for the flight level.
    #[error("no performance data for {flight_level}")]
    UnknownFlightLevel {
        /// The requested level.
        flight_level: FlightLevel,
    },
    /// Two rows describe the same flight level.
    #[error("duplicate performance data for {flight_level}")]
    DuplicateFlightLevel {
        /// The repeated level.
        flight_level: FlightLevel,
    },
    /// A row's cruise speed is zero, negative or not a number.
    #[error("cruise speed at {flight_level} must be positive")]
    NonPositiveSpeed {
        /// Level of the offending row.
        flight_level: FlightLevel,
    },
}

/// Performance figures for one flight level in model units.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AircraftPerformance {
    /// Level these figures apply to.
    pub flight_level: FlightLevel,
    /// True airspeed in knots, as supplied.
    pub cruise_speed_kts: f64,
    /// True airspeed in metres per second.
    pub cruise_speed_m_s: f64,
    /// Rate of descent in metres per second.
    pub descent_rate_m_s: f64,
    /// Rate of climb in metres per second.
    pub climb_rate_m_s: f64,
    /// Cruise fuel burn in kg/min.
    pub cruise_fuel_kg_min: f64,
    /// Descent fuel burn in kg/min.
    pub descent_fuel_kg_min: f64,
    /// Climb fuel burn in kg/min.
    pub climb_fuel_kg_min: f64,
}

impl AircraftPerformance {
    /// Convert a source row to model units.
    #[must_use]
    pub fn from_record(record: &PerformanceRecord) -> Self {
        Self {
            flight_level: record.flight_level,
            cruise_speed_kts: record.cruise_speed_kts,
            cruise_speed_m_s: units::knots_to_metres_per_second(record.cruise_speed_kts),
            descent_rate_m_s: units::feet_per_minute_to_metres_per_second(
                record.descent_rate_ft_min,
            ),
            climb_rate_m_s: units::feet_per_minute_to_metres_per_second(record.climb_rate_ft_min),
            cruise_fuel_kg_min: record.cruise_fuel_kg_min,
            descent_fuel_kg_min: record.descent_fuel_kg_min,
            climb_fuel_kg_min: record.climb_fuel_kg_min,
        }
    }

    /// Fuel burn for `direction` in kg/min.
    #[must_use]
    pub const fn fuel_rate_kg_min(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Climb => self.climb_fuel_kg_min,
            Direction::Descent => self.descent_fuel_kg_min,
            Direction::Cruise => self.cruise_fuel_kg_min,
        }
    }

    /// Fuel burn for `direction` in kg/s.
    #[must_use]
    pub fn fuel_rate_kg_s(&self, direction: Direction) -> f64 {
        units::per_minute_to_per_second(self.fuel_rate_kg_min(direction))
    }
}

/// Lookup table of [`AircraftPerformance`] keyed by flight level.
///
/// # Examples
/// ```
/// use airspace_core::source::PerformanceRecord;
/// use airspace_core::{Direction, FlightLevel, PerformanceTable};
///
/// # fn main() -> Result<(), airspace_core::PerformanceError> {
/// let table = PerformanceTable::from_records([PerformanceRecord {
///     flight_level: FlightLevel(300),
///     cruise_speed_kts: 450.0,
///     descent_rate_ft_min: 1500.0,
///     climb_rate_ft_min: 1200.0,
///     cruise_fuel_kg_min: 60.0,
///     descent_fuel_kg_min: 30.0,
///     climb_fuel_kg_min: 120.0,
/// }])?;
/// assert_eq!(table.fuel_rate(FlightLevel(300), Direction::Cruise)?, 1.0);
/// assert!(table.lookup(FlightLevel(310)).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerformanceTable {
    by_level: BTreeMap<FlightLevel, AircraftPerformance>,
}

impl PerformanceTable {
    /// Build a table from source rows, one per flight level.
    pub fn from_records<I>(records: I) -> Result<Self, PerformanceError>
    where
        I: IntoIterator<Item = PerformanceRecord>,
    {
        let mut by_level = BTreeMap::new();
        for record in records {
            let flight_level = record.flight_level;
            if record.cruise_speed_kts.is_nan() || record.cruise_speed_kts <= 0.0 {
                return Err(PerformanceError::NonPositiveSpeed { flight_level });
            }
            match by_level.entry(flight_level) {
                Entry::Occupied(_) => {
                    return Err(PerformanceError::DuplicateFlightLevel { flight_level });
                }
                Entry::Vacant(slot) => {
                    slot.insert(AircraftPerformance::from_record(&record));
                }
            }
        }
        Ok(Self { by_level })
    }

    /// Build a table from every row exposed by `source`.
    pub fn from_source<S>(source: &S) -> Result<Self, PerformanceError>
    where
        S: PerformanceSource + ?Sized,
    {
        Self::from_records(source.performance_records())
    }

    /// Figures for `flight_level`.
    pub fn lookup(&self, flight_level: FlightLevel) -> Result<&AircraftPerformance, PerformanceError> {
        self.by_level
            .get(&flight_level)
            .ok_or(PerformanceError::UnknownFlightLevel { flight_level })
    }

    /// Fuel burn at `flight_level` for `direction`, in kg/s.
    pub fn fuel_rate(
        &self,
        flight_level: FlightLevel,
        direction: Direction,
    ) -> Result<f64, PerformanceError> {
        Ok(self.lookup(flight_level)?.fuel_rate_kg_s(direction))
    }

    /// Seconds needed to cover `distance_m` at the cruise speed of
    /// `flight_level`.
    #[expect(clippy::float_arithmetic, reason = "time is distance over speed")]
    pub fn transit_time(
        &self,
        distance_m: f64,
        flight_level: FlightLevel,
    ) -> Result<f64, PerformanceError> {
        Ok(distance_m / self.lookup(flight_level)?.cruise_speed_m_s)
    }

    /// Distinct flight levels in ascending order.
    pub fn flight_levels(&self) -> impl Iterator<Item = FlightLevel> + '_ {
        self.by_level.keys().copied()
    }

    /// Number of flight levels with data.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_level.len()
    }

    /// Whether the table holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_level.is_empty()
    }
}
