//! Spatial hash broad phase for collision candidate queries.
//!
//! A uniform grid over integer cell coordinates, rebuilt from scratch once
//! per tick. Rebuilding instead of incrementally updating is a deliberate
//! simplicity/memory-churn tradeoff: populations stay in the tens, so the
//! rebuild is cheap and there is no stale-bucket bookkeeping to get wrong.
//!
//! ## Cell Size Choice
//!
//! Cell size (`HASH_CELL_SIZE` in `constants.rs`) should sit near a typical
//! body diameter. Larger cells mean fatter buckets per query; smaller cells
//! mean each body is registered in more cells. Either extreme degrades back
//! toward brute force.

use crate::asteroid::{Asteroid, CollisionRadius, Health};
use crate::config::SimConfig;
use crate::simulation::SimulationStats;
use bevy::prelude::*;
use std::collections::HashMap;

/// Resource holding the broad-phase grid for this frame.
///
/// A body whose bounding square spans k cells is registered in all k buckets;
/// queries deduplicate with a per-item stamp instead of allocating a set.
#[derive(Resource, Debug, Clone)]
pub struct SpatialHash {
    cell_size: f32,
    /// Map from cell coordinates to the entities whose bounding square
    /// overlaps that cell.
    cells: HashMap<(i32, i32), Vec<Entity>>,
    /// Last query id that saw each entity; dedup without clearing between
    /// queries.
    stamps: HashMap<Entity, u64>,
    query_id: u64,
}

impl Default for SpatialHash {
    fn default() -> Self {
        Self::new(crate::constants::HASH_CELL_SIZE)
    }
}

impl SpatialHash {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
            stamps: HashMap::new(),
            query_id: 0,
        }
    }

    /// Cell coordinate for a world position. Floor division, so negative
    /// coordinates land in negative cells rather than collapsing onto cell 0.
    fn cell_coord(&self, v: f32) -> i32 {
        (v / self.cell_size).floor() as i32
    }

    /// Inclusive cell range covered by `[center - radius, center + radius]`.
    fn cell_range(&self, center: f32, radius: f32) -> (i32, i32) {
        (
            self.cell_coord(center - radius),
            self.cell_coord(center + radius),
        )
    }

    /// Empty all buckets, retaining their allocations for reuse next tick.
    pub fn clear(&mut self) {
        for bucket in self.cells.values_mut() {
            bucket.clear();
        }
        self.stamps.clear();
    }

    /// Register `entity` in every cell overlapped by the square
    /// `[x - radius, x + radius] × [y - radius, y + radius]`.
    pub fn insert(&mut self, entity: Entity, x: f32, y: f32, radius: f32) {
        let (cx0, cx1) = self.cell_range(x, radius);
        let (cy0, cy1) = self.cell_range(y, radius);
        for cx in cx0..=cx1 {
            for cy in cy0..=cy1 {
                self.cells.entry((cx, cy)).or_default().push(entity);
            }
        }
    }

    /// Collect every entity registered in a cell overlapped by the query
    /// square into `out`, each exactly once.
    ///
    /// `out` is cleared first; results may include entities outside the
    /// query circle; callers do the exact distance check themselves (the
    /// grid is a conservative over-approximation).
    pub fn query(&mut self, x: f32, y: f32, radius: f32, out: &mut Vec<Entity>) {
        out.clear();
        self.query_id += 1;
        let id = self.query_id;

        let (cx0, cx1) = self.cell_range(x, radius);
        let (cy0, cy1) = self.cell_range(y, radius);
        for cx in cx0..=cx1 {
            for cy in cy0..=cy1 {
                let Some(bucket) = self.cells.get(&(cx, cy)) else {
                    continue;
                };
                for &entity in bucket {
                    let stamp = self.stamps.entry(entity).or_insert(0);
                    if *stamp != id {
                        *stamp = id;
                        out.push(entity);
                    }
                }
            }
        }
    }
}

/// System to rebuild the spatial hash each tick from live asteroid positions.
/// Must run AFTER integration and BEFORE the collision systems that query it.
pub fn rebuild_spatial_hash_system(
    config: Res<SimConfig>,
    mut hash: ResMut<SpatialHash>,
    mut stats: ResMut<SimulationStats>,
    query: Query<(Entity, &Transform, &CollisionRadius, &Health), With<Asteroid>>,
) {
    // Recreate rather than clear when the cell size was changed by config.
    if hash.cell_size != config.hash_cell_size {
        *hash = SpatialHash::new(config.hash_cell_size);
    } else {
        hash.clear();
    }

    for (entity, transform, radius, health) in query.iter() {
        if health.dead {
            continue;
        }
        let pos = transform.translation.truncate();
        hash.insert(entity, pos.x, pos.y, radius.0);
    }
    stats.hash_rebuilds += 1;
}
