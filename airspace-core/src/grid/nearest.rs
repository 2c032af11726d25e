//! Nearest-voxel lookup backed by an R\*-tree.

use rstar::RTree;
use rstar::primitives::GeomWithData;

use crate::Voxel;

/// Tree entry: metric position tagged with the voxel's canonical position.
type Entry = GeomWithData<[f64; 3], usize>;

/// Spatial index over canonical voxels.
#[derive(Debug, Clone)]
pub(crate) struct NearestIndex {
    tree: RTree<Entry>,
}

impl NearestIndex {
    pub(crate) fn new(voxels: &[Voxel]) -> Self {
        let entries = voxels
            .iter()
            .enumerate()
            .map(|(position, voxel)| Entry::new(voxel.position().to_array(), position))
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Canonical position of the voxel closest to `query`.
    ///
    /// Equidistant candidates resolve to the lowest canonical position, so the
    /// answer never depends on the tree's internal layout.
    pub(crate) fn nearest(&self, query: &Voxel) -> Option<usize> {
        let point = query.position().to_array();
        let mut best: Option<(f64, usize)> = None;
        for (entry, distance) in self.tree.nearest_neighbor_iter_with_distance_2(&point) {
            match best {
                None => best = Some((distance, entry.data)),
                Some((best_distance, _)) if distance > best_distance => break,
                Some((best_distance, position)) if entry.data < position => {
                    best = Some((best_distance, entry.data));
                }
                Some(_) => {}
            }
        }
        best.map(|(_, position)| position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FlightLevel, VoxelIndex};
    use rstest::rstest;

    fn voxel(index: u32, lon: i32, lat: i32) -> Voxel {
        Voxel::new(Some(VoxelIndex(index)), lon, lat, FlightLevel(300))
    }

    #[rstest]
    fn empty_index_has_no_nearest() {
        let index = NearestIndex::new(&[]);
        assert_eq!(index.nearest(&Voxel::unindexed(0, 0, FlightLevel(300))), None);
    }

    #[rstest]
    fn ties_resolve_to_first_canonical_voxel() {
        let voxels = [voxel(10, 5, 0), voxel(11, 2, 0), voxel(12, 0, 0)];
        let index = NearestIndex::new(&voxels);
        let query = Voxel::unindexed(1, 0, FlightLevel(300));
        assert_eq!(index.nearest(&query), Some(1));

        let duplicated = [voxel(20, 0, 0), voxel(21, 0, 0)];
        let dup_index = NearestIndex::new(&duplicated);
        assert_eq!(dup_index.nearest(&Voxel::unindexed(0, 0, FlightLevel(300))), Some(0));
    }
}
