//! Sparse hash grid for neighbour queries on the ground plane

use ahash::AHashMap;
use glam::Vec3;

use crate::core::types::NpcId;

/// Sparse hash grid keyed on (x, z) cells
pub struct SparseHashGrid {
    cell_size: f32,
    cells: AHashMap<(i32, i32), Vec<(NpcId, Vec3)>>,
}

impl SparseHashGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: AHashMap::new(),
        }
    }

    #[inline]
    fn cell_coord(&self, pos: Vec3) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.z / self.cell_size).floor() as i32,
        )
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn insert(&mut self, npc: NpcId, pos: Vec3) {
        let coord = self.cell_coord(pos);
        self.cells.entry(coord).or_default().push((npc, pos));
    }

    /// NPCs within `radius` of `center` (3D distance), sorted by id
    ///
    /// Scans as many cells as the radius needs, so any cell size works.
    /// When that window holds more cells than are occupied, the occupied
    /// cells are scanned directly instead.
    pub fn query_radius(&self, center: Vec3, radius: f32) -> Vec<NpcId> {
        let reach = (radius / self.cell_size).ceil().max(0.0);
        let window = (2.0 * reach + 1.0) * (2.0 * reach + 1.0);

        let candidates: Vec<&(NpcId, Vec3)> = if !window.is_finite()
            || window > self.cells.len() as f32
        {
            self.cells.values().flatten().collect()
        } else {
            let (cx, cz) = self.cell_coord(center);
            let reach = reach as i32;
            (-reach..=reach)
                .flat_map(|dx| (-reach..=reach).map(move |dz| (cx + dx, cz + dz)))
                .filter_map(|coord| self.cells.get(&coord))
                .flatten()
                .collect()
        };

        let mut found: Vec<NpcId> = candidates
            .into_iter()
            .filter(|(_, pos)| center.distance(*pos) <= radius)
            .map(|&(e, _)| e)
            .collect();
        found.sort_unstable();
        found
    }

    /// Rebuild grid from positions
    pub fn rebuild(&mut self, entries: impl Iterator<Item = (NpcId, Vec3)>) {
        self.clear();
        for (npc, pos) in entries {
            self.insert(npc, pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_radius_filters_by_distance() {
        let mut grid = SparseHashGrid::new(10.0);
        grid.insert(NpcId(1), Vec3::new(0.0, 0.0, 0.0));
        grid.insert(NpcId(2), Vec3::new(5.0, 0.0, 0.0));
        grid.insert(NpcId(3), Vec3::new(30.0, 0.0, 0.0));

        let found = grid.query_radius(Vec3::ZERO, 6.0);
        assert_eq!(found, vec![NpcId(1), NpcId(2)]);
    }

    #[test]
    fn test_radius_larger_than_cell_reaches_far_cells() {
        let mut grid = SparseHashGrid::new(2.0);
        // More occupied cells than the 27x27 window, so the window is walked
        for i in 0..800 {
            grid.insert(NpcId(100 + i), Vec3::new(i as f32 * 2.0, 0.0, -100.0));
        }
        grid.insert(NpcId(7), Vec3::new(0.0, 0.0, 24.0));

        assert_eq!(grid.query_radius(Vec3::ZERO, 25.0), vec![NpcId(7)]);
    }

    #[test]
    fn test_rebuild_replaces_contents() {
        let mut grid = SparseHashGrid::new(10.0);
        grid.insert(NpcId(1), Vec3::ZERO);
        grid.rebuild(vec![(NpcId(4), Vec3::new(-3.0, 0.0, -3.0))].into_iter());

        assert_eq!(grid.query_radius(Vec3::ZERO, 5.0), vec![NpcId(4)]);
        assert!(grid.query_radius(Vec3::ZERO, 100.0).len() == 1);
    }

    #[test]
    fn test_negative_coordinates_use_floor_cells() {
        let mut grid = SparseHashGrid::new(10.0);
        grid.insert(NpcId(1), Vec3::new(-0.5, 0.0, -0.5));
        assert_eq!(grid.query_radius(Vec3::new(0.5, 0.0, 0.5), 2.0), vec![NpcId(1)]);
    }

    #[test]
    fn test_huge_and_infinite_radius_scan_occupied_cells() {
        let mut grid = SparseHashGrid::new(25.0);
        grid.insert(NpcId(1), Vec3::new(10.0, 0.0, 10.0));
        grid.insert(NpcId(2), Vec3::new(-90_000.0, 0.0, 40_000.0));

        assert_eq!(grid.query_radius(Vec3::ZERO, 250_000.0), vec![NpcId(1), NpcId(2)]);
        assert_eq!(grid.query_radius(Vec3::ZERO, f32::INFINITY), vec![NpcId(1), NpcId(2)]);
        assert!(grid.query_radius(Vec3::ZERO, f32::NAN).is_empty());
    }
}
