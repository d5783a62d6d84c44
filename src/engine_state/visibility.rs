//! # Visibility Selection
//!
//! Decides, once per frame, which columns are drawn and at what detail.
//!
//! ## Algorithm
//!
//! Around the observer's column `(px, pz)`:
//!
//! 1. Candidates are limited to the square `[p - far, p + far]` clamped to the
//!    world, so the pass costs O(far²) regardless of world size.
//! 2. A candidate at squared planar distance `d²` is dropped when
//!    `d² > far²` (distance cull), when the direction to it deviates too far
//!    from the planar view direction (view-cone cull), or when it is empty.
//! 3. Survivors with `d² <= near²` are drawn as full columns, those with
//!    `d² <= mid²` as their top block only. The ring between `mid` and `far`
//!    draws nothing.
//!
//! Instructions come out in scan order, `z` outer and `x` inner.

use std::ops::Range;

use cgmath::{InnerSpace, Vector2};

use super::{camera_state::camera::Observer, config::VisibilityConfig, voxels::world::VoxelStore};

/// Direction vectors shorter than this are treated as pointing at the observer.
const MIN_DIRECTION_LENGTH: f32 = 1e-6;

/// How much of a column is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailLevel {
    /// Every block from `y = 0` to `height - 1`
    FullColumn,
    /// Only the block at `y = height - 1`
    TopBlockOnly,
}

/// A column selected for drawing this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawInstruction {
    /// Column x
    pub x: i32,
    /// Column z
    pub z: i32,
    /// Column height, always at least 1
    pub height: u32,
    /// Detail level the column is drawn at
    pub detail: DetailLevel,
}

impl DrawInstruction {
    /// The `y` coordinates of the blocks to draw.
    pub fn blocks(&self) -> Range<u32> {
        match self.detail {
            DetailLevel::FullColumn => 0..self.height,
            DetailLevel::TopBlockOnly => self.height.saturating_sub(1)..self.height,
        }
    }

    /// Number of unit cubes this instruction expands to.
    pub fn cube_count(&self) -> u32 {
        let blocks = self.blocks();
        blocks.end - blocks.start
    }
}

/// Per-frame counters describing a selection pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionStats {
    /// Columns inside the clamped bounding box
    pub candidates: u32,
    /// Candidates beyond the far radius
    pub distance_culled: u32,
    /// Candidates outside the view cone
    pub cone_culled: u32,
    /// Candidates with height zero
    pub empty: u32,
    /// Candidates between the mid and far radius
    pub outer_ring: u32,
    /// Instructions emitted at full detail
    pub full_columns: u32,
    /// Instructions emitted as top block only
    pub top_blocks: u32,
    /// Unit cubes the emitted instructions expand to, saturating at `u32::MAX`
    pub cubes: u32,
}

impl SelectionStats {
    /// Total number of instructions emitted.
    pub fn instructions(&self) -> u32 {
        self.full_columns + self.top_blocks
    }
}

/// Reusable visibility selector. Keeps its instruction buffer between frames
/// so a steady-state pass does not allocate.
#[derive(Debug, Clone)]
pub struct VisibilitySelector {
    config: VisibilityConfig,
    instructions: Vec<DrawInstruction>,
    stats: SelectionStats,
}

impl VisibilitySelector {
    /// Creates a selector with the given tiers and view cone.
    pub fn new(config: VisibilityConfig) -> Self {
        Self {
            config,
            instructions: Vec::new(),
            stats: SelectionStats::default(),
        }
    }

    /// Tiers and view cone in use.
    pub fn config(&self) -> &VisibilityConfig {
        &self.config
    }

    /// Runs a selection pass and returns this frame's instructions.
    pub fn select(&mut self, observer: &Observer, store: &VoxelStore) -> &[DrawInstruction] {
        self.stats = select_into(observer, store, &self.config, &mut self.instructions);
        &self.instructions
    }

    /// Instructions produced by the latest pass.
    pub fn instructions(&self) -> &[DrawInstruction] {
        &self.instructions
    }

    /// Counters from the latest pass.
    pub fn stats(&self) -> SelectionStats {
        self.stats
    }
}

/// Selects the columns to draw for `observer`.
pub fn select(observer: &Observer, store: &VoxelStore, config: &VisibilityConfig) -> Vec<DrawInstruction> {
    let mut instructions = Vec::new();
    select_into(observer, store, config, &mut instructions);
    instructions
}

/// Selects the columns to draw for `observer`, replacing the contents of `out`.
pub fn select_into(
    observer: &Observer,
    store: &VoxelStore,
    config: &VisibilityConfig,
    out: &mut Vec<DrawInstruction>,
) -> SelectionStats {
    out.clear();
    let mut stats = SelectionStats::default();

    let (px, pz) = store.column_at(observer.position.x, observer.position.z);
    let eye = Vector2::new(observer.position.x, observer.position.z);
    let planar_forward = observer.basis().planar_forward;
    let view = Vector2::new(planar_forward.x, planar_forward.z);

    let near2 = (config.near_radius as i64).pow(2);
    let mid2 = (config.mid_radius as i64).pow(2);
    let far2 = (config.far_radius as i64).pow(2);

    let far = config.far_radius as i64;
    let last = store.world_size() as i64 - 1;
    let (min_x, max_x) = ((px as i64 - far).max(0), (px as i64 + far).min(last));
    let (min_z, max_z) = ((pz as i64 - far).max(0), (pz as i64 + far).min(last));

    for z in min_z..=max_z {
        for x in min_x..=max_x {
            stats.candidates += 1;

            let (dx, dz) = (x - px as i64, z - pz as i64);
            let d2 = dx * dx + dz * dz;
            if d2 > far2 {
                stats.distance_culled += 1;
                continue;
            }

            if d2 != 0 {
                let to = Vector2::new(x as f32, z as f32) - eye;
                let length = to.magnitude();
                if length > MIN_DIRECTION_LENGTH && view.dot(to / length) < config.min_view_dot {
                    stats.cone_culled += 1;
                    continue;
                }
            }

            let (x, z) = (x as i32, z as i32);
            let height = store.height_at(x, z).unwrap_or(0);
            if height == 0 {
                stats.empty += 1;
                continue;
            }

            let detail = if d2 <= near2 {
                stats.full_columns += 1;
                DetailLevel::FullColumn
            } else if d2 <= mid2 {
                stats.top_blocks += 1;
                DetailLevel::TopBlockOnly
            } else {
                stats.outer_ring += 1;
                continue;
            };

            let instruction = DrawInstruction { x, z, height, detail };
            stats.cubes = stats.cubes.saturating_add(instruction.cube_count());
            out.push(instruction);
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use cgmath::{Point3, Rad};
    use std::f32::consts::PI;

    use super::*;
    use crate::engine_state::voxels::{terrain::HeightMap, world::WorldEdit};

    fn observer_at(x: f32, z: f32, yaw: f32) -> Observer {
        Observer::new(Point3::new(x, 10.0, z), Rad(yaw), Rad(0.0))
    }

    fn small_config(min_view_dot: f32) -> VisibilityConfig {
        VisibilityConfig {
            near_radius: 1,
            mid_radius: 3,
            far_radius: 5,
            min_view_dot,
        }
    }

    #[test]
    fn cone_disabled_scenario() {
        let store = VoxelStore::flat(8, 5).unwrap();
        let observer = observer_at(4.0, 4.0, 0.0);
        let mut instructions = Vec::new();
        let stats = select_into(&observer, &store, &small_config(-1.0), &mut instructions);

        let full: Vec<_> = instructions
            .iter()
            .filter(|i| i.detail == DetailLevel::FullColumn)
            .map(|i| (i.x, i.z))
            .collect();
        assert_eq!(full, vec![(4, 3), (3, 4), (4, 4), (5, 4), (4, 5)]);

        let top = instructions
            .iter()
            .filter(|i| i.detail == DetailLevel::TopBlockOnly)
            .count();
        assert_eq!(top, 24);
        assert_eq!(stats.candidates, 64);
        assert_eq!(stats.cone_culled, 0);
        assert_eq!(stats.instructions(), 29);
        assert_eq!(stats.cubes, 5 * 5 + 24);
    }

    #[test]
    fn narrow_cone_keeps_only_columns_straight_ahead() {
        let store = VoxelStore::flat(8, 5).unwrap();
        let observer = observer_at(4.0, 4.0, 0.0);
        let selected: Vec<_> = select(&observer, &store, &small_config(0.99))
            .iter()
            .map(|i| (i.x, i.z))
            .collect();
        assert_eq!(selected, vec![(4, 4), (4, 5), (4, 6), (4, 7)]);
    }

    #[test]
    fn column_behind_is_excluded() {
        let store = VoxelStore::flat(8, 5).unwrap();
        let observer = observer_at(4.0, 4.0, 0.0);
        let selected = select(&observer, &store, &small_config(0.99));
        assert!(selected.iter().all(|i| i.z >= 4));
        assert!(!selected.iter().any(|i| (i.x, i.z) == (4, 3)));
    }

    #[test]
    fn empty_columns_are_never_emitted() {
        let mut store = VoxelStore::flat(8, 5).unwrap();
        store.set_height(4, 5, 0).unwrap();
        store
            .apply(WorldEdit::FillRect {
                x0: 0,
                z0: 0,
                x1: 2,
                z1: 7,
                height: 0,
            })
            .unwrap();
        let observer = observer_at(4.0, 4.0, 0.0);
        let mut instructions = Vec::new();
        let stats = select_into(&observer, &store, &small_config(-1.0), &mut instructions);
        for instruction in &instructions {
            assert_ne!(store.height_at(instruction.x, instruction.z), Some(0));
            assert!(instruction.height > 0);
        }
        assert!(stats.empty > 0);
    }

    #[test]
    fn tiering_is_monotonic_and_bounded_by_far_radius() {
        let store = VoxelStore::flat(64, 3).unwrap();
        let config = VisibilityConfig::default();
        for (x, z, yaw) in [(32.0, 32.0, PI), (0.0, 0.0, 0.7), (63.0, 10.0, -2.0), (20.3, 41.8, 1.2)] {
            let observer = observer_at(x, z, yaw);
            let (px, pz) = store.column_at(x, z);
            for instruction in select(&observer, &store, &config) {
                let d2 = (instruction.x - px).pow(2) + (instruction.z - pz).pow(2);
                assert!(d2 <= (config.far_radius as i32).pow(2));
                if d2 <= (config.near_radius as i32).pow(2) {
                    assert_eq!(instruction.detail, DetailLevel::FullColumn);
                } else {
                    assert!(d2 <= (config.mid_radius as i32).pow(2));
                    assert_eq!(instruction.detail, DetailLevel::TopBlockOnly);
                }
            }
        }
    }

    #[test]
    fn observer_column_passes_the_cone() {
        let store = VoxelStore::flat(8, 2).unwrap();
        // Slightly off the column center and facing away from it
        let observer = observer_at(4.3, 4.2, 0.0);
        let selected = select(&observer, &store, &small_config(1.0));
        assert!(selected.contains(&DrawInstruction {
            x: 4,
            z: 4,
            height: 2,
            detail: DetailLevel::FullColumn,
        }));
    }

    #[test]
    fn bounding_box_is_clamped_to_the_world() {
        let store = VoxelStore::flat(8, 1).unwrap();
        let observer = observer_at(0.0, 0.0, PI / 4.0);
        let mut instructions = Vec::new();
        let stats = select_into(&observer, &store, &small_config(-1.0), &mut instructions);
        // Columns 0..=5 on both axes
        assert_eq!(stats.candidates, 36);
        assert!(instructions.iter().all(|i| store.contains(i.x, i.z)));
    }

    #[test]
    fn scan_order_is_z_outer_x_inner() {
        let store = VoxelStore::flat(16, 4).unwrap();
        let observer = observer_at(8.0, 8.0, 0.0);
        let instructions = select(&observer, &store, &VisibilityConfig {
            near_radius: 2,
            mid_radius: 4,
            far_radius: 6,
            min_view_dot: -1.0,
        });
        assert!(instructions
            .windows(2)
            .all(|pair| (pair[0].z, pair[0].x) < (pair[1].z, pair[1].x)));
    }

    #[test]
    fn instruction_blocks_match_detail() {
        let full = DrawInstruction {
            x: 0,
            z: 0,
            height: 4,
            detail: DetailLevel::FullColumn,
        };
        let top = DrawInstruction {
            detail: DetailLevel::TopBlockOnly,
            ..full
        };
        assert_eq!(full.blocks(), 0..4);
        assert_eq!(top.blocks(), 3..4);
        assert_eq!(top.cube_count(), 1);
    }

    #[test]
    fn selector_reuses_its_buffer() {
        let store = VoxelStore::flat(16, 2).unwrap();
        let mut selector = VisibilitySelector::new(small_config(-1.0));
        let observer = observer_at(8.0, 8.0, 0.0);
        let first = selector.select(&observer, &store).to_vec();
        let second = selector.select(&observer, &store).to_vec();
        assert_eq!(first, second);
        assert_eq!(selector.stats().instructions() as usize, second.len());
    }

    #[test]
    fn cube_count_saturates_for_towering_columns() {
        let store = VoxelStore::from_height_map(HeightMap {
            world_size: 4,
            heights: vec![u32::MAX; 16],
            max_height: u32::MAX,
        });
        let mut instructions = Vec::new();
        let stats = select_into(&observer_at(2.0, 2.0, 0.0), &store, &small_config(-1.0), &mut instructions);
        assert_eq!(stats.full_columns, 5);
        assert_eq!(stats.cubes, u32::MAX);
    }
}
