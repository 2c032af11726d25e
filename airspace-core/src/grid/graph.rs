//! Sparse voxel graph built from sampled climate records.

use std::collections::{BTreeMap, BTreeSet, HashMap};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::GridError;
use super::nearest::NearestIndex;
use crate::source::{VoxelRecord, VoxelRecordSource};
use crate::{TimeVoxel, Timestamp, Voxel, VoxelIndex};

/// Distance limits for the graph adjacency policy.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AdjacencyThresholds {
    /// Maximum horizontal distance between adjacent voxels, in metres.
    pub horizontal_m: f64,
    /// Maximum altitude difference between adjacent voxels, in metres.
    pub vertical_m: f64,
}

impl AdjacencyThresholds {
    /// Whether `a` and `b` are close enough to be connected.
    #[must_use]
    pub fn admits(&self, a: &Voxel, b: &Voxel) -> bool {
        a.horizontal_distance(b) <= self.horizontal_m && a.vertical_distance(b) <= self.vertical_m
    }
}

impl Default for AdjacencyThresholds {
    fn default() -> Self {
        Self {
            horizontal_m: 8e5,
            vertical_m: 8e2,
        }
    }
}

/// A directed edge between two voxels sampled at the same timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GraphEdge {
    /// Origin voxel.
    pub from: VoxelIndex,
    /// Target voxel.
    pub to: VoxelIndex,
    /// Timestamp shared by both samples.
    pub time: Timestamp,
    /// Climate cost sampled at the origin.
    pub from_climate: f64,
    /// Climate cost sampled at the target.
    pub to_climate: f64,
}

/// Voxels and their distance-threshold adjacency.
///
/// Canonical voxel order is the order in which each index first appears in
/// the source records. When two voxels share several timestamps the edge keeps
/// the climate samples of the last qualifying record pair in source order.
#[derive(Debug, Clone)]
pub struct VoxelGraph {
    voxels: Vec<Voxel>,
    positions: HashMap<VoxelIndex, usize>,
    adjacency: BTreeMap<VoxelIndex, BTreeMap<VoxelIndex, GraphEdge>>,
    thresholds: AdjacencyThresholds,
    nearest: NearestIndex,
}

impl VoxelGraph {
    /// Build a graph from every record exposed by `source`.
    pub fn from_source<S>(source: &S, thresholds: AdjacencyThresholds) -> Result<Self, GridError>
    where
        S: VoxelRecordSource + ?Sized,
    {
        let records: Vec<VoxelRecord> = source.voxel_records().collect();
        Self::from_records(&records, thresholds)
    }

    /// Build a graph from `records` in canonical order.
    ///
    /// # Examples
    /// ```
    /// use airspace_core::source::VoxelRecord;
    /// use airspace_core::{AdjacencyThresholds, FlightLevel, Timestamp, VoxelGraph, VoxelIndex};
    ///
    /// # fn main() -> Result<(), airspace_core::GridError> {
    /// let record = |index, longitude| VoxelRecord {
    ///     index: VoxelIndex(index),
    ///     longitude,
    ///     latitude: 0,
    ///     flight_level: FlightLevel(300),
    ///     time: Timestamp(0),
    ///     climate_cost: 1.0,
    /// };
    /// let graph = VoxelGraph::from_records(
    ///     &[record(1, 0), record(2, 1), record(3, 20)],
    ///     AdjacencyThresholds::default(),
    /// )?;
    /// assert!(graph.neighbors(VoxelIndex(1)).contains(&VoxelIndex(2)));
    /// assert!(graph.neighbors(VoxelIndex(3)).is_empty());
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_records(
        records: &[VoxelRecord],
        thresholds: AdjacencyThresholds,
    ) -> Result<Self, GridError> {
        let mut voxels = Vec::new();
        let mut positions = HashMap::new();
        let mut by_time: BTreeMap<Timestamp, Vec<&VoxelRecord>> = BTreeMap::new();

        for record in records {
            let voxel = record.voxel();
            if let Some(&position) = positions.get(&record.index) {
                let known: Option<&Voxel> = voxels.get(position);
                if known.is_some_and(|existing| !existing.same_cell(&voxel)) {
                    return Err(GridError::InconsistentVoxel {
                        index: record.index,
                    });
                }
            } else {
                positions.insert(record.index, voxels.len());
                voxels.push(voxel);
            }
            by_time.entry(record.time).or_default().push(record);
        }

        let mut adjacency: BTreeMap<VoxelIndex, BTreeMap<VoxelIndex, GraphEdge>> = voxels
            .iter()
            .filter_map(Voxel::index)
            .map(|index| (index, BTreeMap::new()))
            .collect();

        for start in records {
            let Some(peers) = by_time.get(&start.time) else {
                continue;
            };
            let start_voxel = start.voxel();
            for end in peers {
                if end.index == start.index {
                    continue;
                }
                if !thresholds.admits(&start_voxel, &end.voxel()) {
                    continue;
                }
                adjacency.entry(start.index).or_default().insert(
                    end.index,
                    GraphEdge {
                        from: start.index,
                        to: end.index,
                        time: start.time,
                        from_climate: start.climate_cost,
                        to_climate: end.climate_cost,
                    },
                );
            }
        }

        let edge_count: usize = adjacency.values().map(BTreeMap::len).sum();
        log::debug!(
            "built voxel graph with {} voxels and {edge_count} edges from {} records",
            voxels.len(),
            records.len()
        );

        let nearest = NearestIndex::new(&voxels);
        Ok(Self {
            voxels,
            positions,
            adjacency,
            thresholds,
            nearest,
        })
    }

    /// Canonical voxels in first-occurrence order.
    #[must_use]
    pub fn voxels(&self) -> &[Voxel] {
        &self.voxels
    }

    /// Number of canonical voxels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    /// Whether the graph holds no voxels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// Thresholds the adjacency was built with.
    #[must_use]
    pub const fn thresholds(&self) -> AdjacencyThresholds {
        self.thresholds
    }

    /// Canonical voxel with the given index.
    pub fn voxel(&self, index: VoxelIndex) -> Result<&Voxel, GridError> {
        self.positions
            .get(&index)
            .and_then(|&position| self.voxels.get(position))
            .ok_or(GridError::UnknownVoxel { index })
    }

    /// Indices adjacent to `index`; empty for unknown voxels.
    #[must_use]
    pub fn neighbors(&self, index: VoxelIndex) -> BTreeSet<VoxelIndex> {
        self.adjacency
            .get(&index)
            .map(|targets| targets.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Every edge, ordered by origin then target index.
    pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> + '_ {
        self.adjacency.values().flat_map(BTreeMap::values)
    }

    /// Edges leaving `index`.
    pub fn outgoing(&self, index: VoxelIndex) -> impl Iterator<Item = &GraphEdge> + '_ {
        self.adjacency
            .get(&index)
            .into_iter()
            .flat_map(BTreeMap::values)
    }

    /// Edges entering `index`.
    pub fn incoming(&self, index: VoxelIndex) -> impl Iterator<Item = &GraphEdge> + '_ {
        self.edges().filter(move |edge| edge.to == index)
    }

    /// Edge from `from` to `to`, if the voxels are adjacent.
    #[must_use]
    pub fn edge(&self, from: VoxelIndex, to: VoxelIndex) -> Option<&GraphEdge> {
        self.adjacency.get(&from).and_then(|targets| targets.get(&to))
    }

    /// Canonical voxel closest to `query` in 3D.
    ///
    /// Ties resolve to the voxel that appears first in canonical order.
    pub fn nearest(&self, query: &Voxel) -> Result<&Voxel, GridError> {
        self.nearest
            .nearest(query)
            .and_then(|position| self.voxels.get(position))
            .ok_or(GridError::EmptyGrid)
    }

    /// Replace the voxel of `query` with its nearest canonical voxel,
    /// keeping the timestamp.
    pub fn snap(&self, query: &TimeVoxel) -> Result<TimeVoxel, GridError> {
        let voxel = *self.nearest(&query.voxel)?;
        Ok(TimeVoxel {
            voxel,
            time: query.time,
        })
    }
}
