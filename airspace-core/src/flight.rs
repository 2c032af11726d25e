//! Flight requests snapped onto a voxel graph.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::{GridError, VoxelGraph};
use crate::source::{Coordinate, FlightRequestRecord, FlightRequestSource};
use crate::{TimeVoxel, VoxelIndex};

/// Identifier of a scheduled flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct FlightNumber(pub u32);

impl fmt::Display for FlightNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors returned while assembling a [`FlightRequestSet`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlightError {
    /// Two requests share a flight number.
    #[error("flight {number} is scheduled more than once")]
    DuplicateFlightNumber {
        /// The repeated number.
        number: FlightNumber,
    },
    /// Snapping a coordinate onto the grid failed.
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// One aircraft's start and destination.
///
/// The start is bound to the departure time; the destination is untimed.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlightRequest {
    /// Flight identifier.
    pub number: FlightNumber,
    /// Departure voxel and time.
    pub start: TimeVoxel,
    /// Arrival voxel.
    pub destination: TimeVoxel,
}

impl FlightRequest {
    /// Index of the start voxel, if it is canonical.
    #[must_use]
    pub const fn start_index(&self) -> Option<VoxelIndex> {
        self.start.voxel.index()
    }

    /// Index of the destination voxel, if it is canonical.
    #[must_use]
    pub const fn destination_index(&self) -> Option<VoxelIndex> {
        self.destination.voxel.index()
    }
}

/// Flight requests keyed by flight number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlightRequestSet {
    requests: BTreeMap<FlightNumber, FlightRequest>,
}

impl FlightRequestSet {
    /// Collect already-resolved requests, rejecting duplicate numbers.
    pub fn new<I>(requests: I) -> Result<Self, FlightError>
    where
        I: IntoIterator<Item = FlightRequest>,
    {
        let mut map = BTreeMap::new();
        for request in requests {
            match map.entry(request.number) {
                Entry::Occupied(_) => {
                    return Err(FlightError::DuplicateFlightNumber {
                        number: request.number,
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(request);
                }
            }
        }
        Ok(Self { requests: map })
    }

    /// Snap raw schedule rows onto `graph`.
    ///
    /// Both endpoints are replaced by their nearest canonical voxel. The start
    /// keeps its departure time; the destination is left untimed and is looked
    /// up at the start's flight level, so flights plan towards a voxel at
    /// their departure altitude.
    pub fn snap<I>(records: I, graph: &VoxelGraph) -> Result<Self, FlightError>
    where
        I: IntoIterator<Item = FlightRequestRecord>,
    {
        let resolved = records
            .into_iter()
            .map(|record| {
                let start = graph.snap(&TimeVoxel::at(record.start.voxel(), record.start_time))?;
                let arrival = Coordinate {
                    flight_level: record.start.flight_level,
                    ..record.end
                };
                let destination = graph.snap(&TimeVoxel::untimed(arrival.voxel()))?;
                Ok(FlightRequest {
                    number: record.flight_number,
                    start,
                    destination,
                })
            })
            .collect::<Result<Vec<_>, GridError>>()?;
        Self::new(resolved)
    }

    /// Snap every schedule row exposed by `source` onto `graph`.
    pub fn from_source<S>(source: &S, graph: &VoxelGraph) -> Result<Self, FlightError>
    where
        S: FlightRequestSource + ?Sized,
    {
        Self::snap(source.flight_requests(), graph)
    }

    /// Request for `number`, if scheduled.
    #[must_use]
    pub fn get(&self, number: FlightNumber) -> Option<&FlightRequest> {
        self.requests.get(&number)
    }

    /// Requests in ascending flight-number order.
    pub fn iter(&self) -> impl Iterator<Item = &FlightRequest> + '_ {
        self.requests.values()
    }

    /// Number of requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Whether no flights are scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}
