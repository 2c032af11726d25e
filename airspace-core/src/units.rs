//! Physical unit conversions.
//!
//! Raw reference data arrives in aviation units: whole degrees for the
//! horizontal cells, flight levels (hundreds of feet) for altitude, knots for
//! speed, feet per minute for vertical rates and kilograms per minute for fuel
//! burn. The model works in metres, seconds and kilograms, so every value is
//! converted here before it reaches the cost function.

/// Metres covered by one degree of latitude.
pub const METRES_PER_DEGREE_LATITUDE: f64 = 111_000.0;

/// Metres covered by one degree of longitude at the latitude band of interest.
pub const METRES_PER_DEGREE_LONGITUDE: f64 = 85_000.0;

/// Metres per foot.
pub const METRES_PER_FOOT: f64 = 0.3048;

/// Feet represented by one flight level.
pub const FEET_PER_FLIGHT_LEVEL: f64 = 100.0;

/// Metres represented by one flight level.
pub const METRES_PER_FLIGHT_LEVEL: f64 = 30.48;

/// Knots equivalent to one metre per second.
pub const KNOTS_PER_METRE_PER_SECOND: f64 = 1.94384;

/// Seconds per minute, used for per-minute rates.
pub const SECONDS_PER_MINUTE: f64 = 60.0;

/// Convert a longitude cell (whole degrees) to metres.
///
/// # Examples
/// ```
/// use airspace_core::units::longitude_to_metres;
///
/// assert_eq!(longitude_to_metres(2), 170_000.0);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "metric conversion is a floating-point scale"
)]
pub fn longitude_to_metres(degrees: i32) -> f64 {
    f64::from(degrees) * METRES_PER_DEGREE_LONGITUDE
}

/// Convert a latitude cell (whole degrees) to metres.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "metric conversion is a floating-point scale"
)]
pub fn latitude_to_metres(degrees: i32) -> f64 {
    f64::from(degrees) * METRES_PER_DEGREE_LATITUDE
}

/// Convert a flight level to metres above the reference datum.
///
/// # Examples
/// ```
/// use airspace_core::units::flight_level_to_metres;
///
/// assert!((flight_level_to_metres(350) - 10_668.0).abs() < 1e-9);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "metric conversion is a floating-point scale"
)]
pub fn flight_level_to_metres(flight_level: u16) -> f64 {
    f64::from(flight_level) * METRES_PER_FLIGHT_LEVEL
}

/// Convert a speed in knots to metres per second.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "metric conversion is a floating-point scale"
)]
pub fn knots_to_metres_per_second(knots: f64) -> f64 {
    knots / KNOTS_PER_METRE_PER_SECOND
}

/// Convert a vertical rate in feet per minute to metres per second.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "metric conversion is a floating-point scale"
)]
pub fn feet_per_minute_to_metres_per_second(feet_per_minute: f64) -> f64 {
    feet_per_minute * METRES_PER_FOOT / SECONDS_PER_MINUTE
}

/// Convert a per-minute rate (e.g. kg/min of fuel) to a per-second rate.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "metric conversion is a floating-point scale"
)]
pub fn per_minute_to_per_second(per_minute: f64) -> f64 {
    per_minute / SECONDS_PER_MINUTE
}
