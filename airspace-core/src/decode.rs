//! Turning solver assignments back into trajectories.

use std::collections::{BTreeMap, BTreeSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::grid::{Cell, Maneuver};
use crate::model::{Assignment, ConstraintModel, FormulationKind, VariableKey};
use crate::{FlightNumber, VoxelIndex};

/// One occupied cell of a dense trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimedCell {
    /// Time step.
    pub time: usize,
    /// Occupied cell.
    pub cell: Cell,
    /// Manoeuvre class.
    pub maneuver: Maneuver,
}

/// Decoded route of one flight.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Trajectory {
    /// Dense formulation: occupied cells ordered by time.
    Timed(Vec<TimedCell>),
    /// Graph formulation: selected edges, plus the path they form when they
    /// chain into a single simple walk.
    Edges {
        /// Selected `(from, to)` pairs.
        edges: BTreeSet<(VoxelIndex, VoxelIndex)>,
        /// Voxels in travel order, when the edges form one path.
        path: Option<Vec<VoxelIndex>>,
    },
}

/// Per-flight trajectories encoded by `assignment`.
///
/// Every flight of the model appears in the result, with an empty trajectory
/// when none of its variables are set. Decoding reads the stored keys; it
/// never parses variable names.
#[must_use]
pub fn decode(model: &ConstraintModel, assignment: &Assignment) -> BTreeMap<FlightNumber, Trajectory> {
    let flights = model.flights();
    let mut timed: BTreeMap<FlightNumber, Vec<TimedCell>> = BTreeMap::new();
    let mut edges: BTreeMap<FlightNumber, BTreeSet<(VoxelIndex, VoxelIndex)>> = BTreeMap::new();

    for id in assignment.active() {
        match model.registry().key(id) {
            Some(VariableKey::Occupancy(key)) => {
                if let Some(&flight) = flights.get(key.aircraft) {
                    timed.entry(flight).or_default().push(TimedCell {
                        time: key.time,
                        cell: key.cell,
                        maneuver: key.maneuver,
                    });
                }
            }
            Some(VariableKey::Edge(key)) => {
                edges.entry(key.flight).or_default().insert((key.from, key.to));
            }
            None => log::warn!("assignment sets {id}, which is not part of the model"),
        }
    }

    flights
        .iter()
        .map(|&flight| {
            let trajectory = match model.formulation() {
                FormulationKind::Dense => {
                    let mut cells = timed.remove(&flight).unwrap_or_default();
                    cells.sort_unstable();
                    Trajectory::Timed(cells)
                }
                FormulationKind::Sparse => {
                    let selected = edges.remove(&flight).unwrap_or_default();
                    let path = chain(&selected);
                    Trajectory::Edges {
                        edges: selected,
                        path,
                    }
                }
            };
            (flight, trajectory)
        })
        .collect()
}

/// Order `edges` into a path from the unique voxel with no selected incoming
/// edge. Returns `None` for empty, branching or cyclic selections.
fn chain(edges: &BTreeSet<(VoxelIndex, VoxelIndex)>) -> Option<Vec<VoxelIndex>> {
    let mut next = BTreeMap::new();
    for &(from, to) in edges {
        if next.insert(from, to).is_some() {
            return None;
        }
    }
    let targets: BTreeSet<VoxelIndex> = edges.iter().map(|&(_, to)| to).collect();
    let mut sources = next.keys().filter(|from| !targets.contains(from));
    let mut current = *sources.next()?;
    if sources.next().is_some() {
        return None;
    }

    let mut path = vec![current];
    while let Some(&to) = next.get(&current) {
        path.push(to);
        current = to;
        if path.len() > edges.len() + 1 {
            return None;
        }
    }
    (path.len() == edges.len() + 1).then_some(path)
}
