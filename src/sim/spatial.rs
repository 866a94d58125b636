//! Uniform grid broad phase for bullet-vs-entity queries
//!
//! The grid is rebuilt from scratch every tick. The cell edge is at least the
//! largest entity size and at least twice the largest bullet radius, so a
//! bullet can only touch entities binned in its own cell or one of the eight
//! around it. Shrinking the cell below that bound brings back missed hits.

use std::collections::HashMap;

use glam::Vec2;

use super::state::Entity;

/// Entities binned by grid cell
#[derive(Debug, Clone, Default)]
pub struct SpatialHash {
    cell_size: f32,
    /// Packed cell key -> indices into the entity slice used for the last rebuild
    cells: HashMap<i64, Vec<usize>>,
}

impl SpatialHash {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cell edge that keeps every collision pair within one cell boundary
    pub fn cell_size_for(largest_entity_size: f32, largest_bullet_radius: f32) -> f32 {
        largest_entity_size
            .max(2.0 * largest_bullet_radius)
            .max(1.0)
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Pack signed cell coordinates into one key
    #[inline]
    pub fn pack_key(cx: i32, cy: i32) -> i64 {
        ((cx as i64) << 32) | (cy as u32 as i64)
    }

    #[inline]
    pub fn cell_coords(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    /// Re-bin all entities. `largest_bullet_radius` is the biggest bullet live this tick.
    pub fn rebuild(&mut self, entities: &[Entity], largest_bullet_radius: f32) {
        let largest_entity = entities.iter().map(|e| e.size).fold(0.0, f32::max);
        self.cell_size = Self::cell_size_for(largest_entity, largest_bullet_radius);

        // Keep bucket allocations, then drop buckets that stayed empty
        for bucket in self.cells.values_mut() {
            bucket.clear();
        }

        for (index, entity) in entities.iter().enumerate() {
            let (cx, cy) = self.cell_coords(entity.pos);
            self.cells
                .entry(Self::pack_key(cx, cy))
                .or_default()
                .push(index);
        }
        self.cells.retain(|_, bucket| !bucket.is_empty());
    }

    /// Collect entity indices from the 3x3 block of cells around `pos`
    pub fn query_neighborhood(&self, pos: Vec2, out: &mut Vec<usize>) {
        out.clear();
        if self.cells.is_empty() {
            return;
        }
        let (cx, cy) = self.cell_coords(pos);
        for dy in -1..=1 {
            for dx in -1..=1 {
                if let Some(bucket) = self.cells.get(&Self::pack_key(cx + dx, cy + dy)) {
                    out.extend_from_slice(bucket);
                }
            }
        }
    }

    /// Number of occupied cells
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::geometry::ShapeKind;

    fn entity_at(id: u32, x: f32, y: f32) -> Entity {
        Entity::new(id, ShapeKind::Square, Vec2::new(x, y), 40.0, 10.0)
    }

    #[test]
    fn test_cell_size_bound() {
        assert_eq!(SpatialHash::cell_size_for(40.0, 10.0), 40.0);
        assert_eq!(SpatialHash::cell_size_for(40.0, 30.0), 60.0);
        assert_eq!(SpatialHash::cell_size_for(0.0, 0.0), 1.0);
    }

    #[test]
    fn test_pack_key_distinguishes_signs() {
        let keys = [
            SpatialHash::pack_key(1, -1),
            SpatialHash::pack_key(-1, 1),
            SpatialHash::pack_key(-1, -1),
            SpatialHash::pack_key(1, 1),
            SpatialHash::pack_key(0, 0),
        ];
        for i in 0..keys.len() {
            for j in (i + 1)..keys.len() {
                assert_ne!(keys[i], keys[j]);
            }
        }
    }

    #[test]
    fn test_query_finds_adjacent_cells_only() {
        let entities = vec![
            entity_at(1, 10.0, 10.0),
            entity_at(2, 70.0, 10.0),
            entity_at(3, 300.0, 300.0),
        ];
        let mut hash = SpatialHash::new();
        hash.rebuild(&entities, 5.0);
        assert_eq!(hash.cell_size(), 40.0);

        let mut out = Vec::new();
        hash.query_neighborhood(Vec2::new(45.0, 15.0), &mut out);
        out.sort_unstable();
        assert_eq!(out, vec![0, 1]);

        hash.query_neighborhood(Vec2::new(1000.0, 1000.0), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_rebuild_forgets_old_positions() {
        let mut entities = vec![entity_at(1, 10.0, 10.0)];
        let mut hash = SpatialHash::new();
        hash.rebuild(&entities, 5.0);

        entities[0].pos = Vec2::new(500.0, 500.0);
        hash.rebuild(&entities, 5.0);
        assert_eq!(hash.occupied_cells(), 1);

        let mut out = Vec::new();
        hash.query_neighborhood(Vec2::new(10.0, 10.0), &mut out);
        assert!(out.is_empty());
    }
}
