//! # World Module
//!
//! This module provides the `VoxelStore`, the dense height-column model of the
//! voxel world.
//!
//! ## Storage
//!
//! Every column `(x, z)` is a gapless stack of solid blocks from `y = 0` up to
//! `y = height - 1`. Heights live in a flat buffer indexed by
//! `z * world_size + x`, so storage is O(world_size²) and every lookup is O(1).
//!
//! ## Access policy
//!
//! - Grid reads ([`VoxelStore::height_at`]) return `None` outside the world.
//! - Grid writes ([`VoxelStore::set_height`], [`VoxelStore::apply`]) return
//!   [`VoxelError::OutOfBounds`] outside the world, except `FillRect`, which
//!   clamps its rectangle to the world. Heights above [`MAX_COLUMN_HEIGHT`]
//!   are rejected with [`VoxelError::TooTall`] and leave the world unchanged.
//! - World-space samples ([`VoxelStore::ground_height`]) round to the nearest
//!   column and clamp onto the edge column, never wrapping.

use log::trace;

use crate::engine_state::{
    config::{TerrainConfig, TerrainMethod, MAX_COLUMN_HEIGHT},
    error::{ConfigError, VoxelError},
};

use super::terrain::{HeightMap, TerrainBuilder};

/// A point mutation of the world, as issued by an external command source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldEdit {
    /// Sets the height of a single column
    SetHeight {
        /// Column x
        x: i32,
        /// Column z
        z: i32,
        /// New height
        height: u32,
    },
    /// Sets every column in the inclusive rectangle spanned by the two corners.
    /// Corners may be given in any order and are clamped to the world.
    FillRect {
        /// First corner x
        x0: i32,
        /// First corner z
        z0: i32,
        /// Second corner x
        x1: i32,
        /// Second corner z
        z1: i32,
        /// New height
        height: u32,
    },
    /// Sets every column in the world to the same height
    Clear {
        /// New height
        height: u32,
    },
}

/// Dense height-column voxel storage.
///
/// Exclusively owned by the running session; no synchronization is needed
/// because the frame loop is its only reader and writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoxelStore {
    world_size: u32,
    heights: Vec<u32>,
    max_height: u32,
}

impl VoxelStore {
    /// Creates a store from a generated height map.
    pub fn from_height_map(height_map: HeightMap) -> Self {
        let HeightMap {
            world_size,
            heights,
            max_height,
        } = height_map;
        debug_assert_eq!(heights.len(), (world_size as usize).pow(2));
        Self {
            world_size,
            heights,
            max_height,
        }
    }

    /// Creates a store where every column has the same height.
    ///
    /// # Errors
    /// Returns [`ConfigError::WorldSize`] for a zero-sized world.
    pub fn flat(world_size: u32, height: u32) -> Result<Self, ConfigError> {
        TerrainBuilder::new(TerrainConfig {
            method: TerrainMethod::Flat { height },
            ..TerrainConfig::default()
        })
        .build(world_size)
        .map(Self::from_height_map)
    }

    /// Side length of the world in columns.
    pub fn world_size(&self) -> u32 {
        self.world_size
    }

    /// Tallest column in the world.
    pub fn max_height(&self) -> u32 {
        self.max_height
    }

    /// Whether `(x, z)` addresses a column inside the world.
    #[inline]
    pub fn contains(&self, x: i32, z: i32) -> bool {
        let size = self.world_size as i32;
        (0..size).contains(&x) && (0..size).contains(&z)
    }

    #[inline]
    fn index(&self, x: i32, z: i32) -> Option<usize> {
        self.contains(x, z)
            .then(|| z as usize * self.world_size as usize + x as usize)
    }

    /// Height of column `(x, z)`, or `None` outside the world.
    #[inline]
    pub fn height_at(&self, x: i32, z: i32) -> Option<u32> {
        self.index(x, z).map(|index| self.heights[index])
    }

    /// Sets the height of column `(x, z)`. Takes effect on the next selection pass.
    ///
    /// # Errors
    /// Returns [`VoxelError::OutOfBounds`] outside the world and
    /// [`VoxelError::TooTall`] above the column limit.
    pub fn set_height(&mut self, x: i32, z: i32, height: u32) -> Result<(), VoxelError> {
        check_height(height)?;
        let index = self.index(x, z).ok_or(VoxelError::OutOfBounds {
            x,
            z,
            size: self.world_size,
        })?;
        let previous = std::mem::replace(&mut self.heights[index], height);
        if height >= self.max_height {
            self.max_height = height;
        } else if previous == self.max_height {
            self.recompute_max_height();
        }
        trace!("Column ({}, {}) height {} -> {}", x, z, previous, height);
        Ok(())
    }

    /// Applies a world edit.
    ///
    /// # Errors
    /// Returns [`VoxelError::OutOfBounds`] when a `SetHeight` edit addresses a
    /// column outside the world, and [`VoxelError::TooTall`] for any edit above
    /// the column limit. A `FillRect` entirely outside the world is a no-op.
    pub fn apply(&mut self, edit: WorldEdit) -> Result<(), VoxelError> {
        match edit {
            WorldEdit::SetHeight { x, z, height } => self.set_height(x, z, height),
            WorldEdit::FillRect {
                x0,
                z0,
                x1,
                z1,
                height,
            } => {
                check_height(height)?;
                self.fill_rect(x0, z0, x1, z1, height);
                Ok(())
            }
            WorldEdit::Clear { height } => {
                check_height(height)?;
                self.heights.fill(height);
                self.max_height = height;
                Ok(())
            }
        }
    }

    fn fill_rect(&mut self, x0: i32, z0: i32, x1: i32, z1: i32, height: u32) {
        let last = self.world_size as i32 - 1;
        let (min_x, max_x) = (x0.min(x1).max(0), x0.max(x1).min(last));
        let (min_z, max_z) = (z0.min(z1).max(0), z0.max(z1).min(last));
        if min_x > max_x || min_z > max_z {
            return;
        }

        let side = self.world_size as usize;
        for z in min_z..=max_z {
            let row = z as usize * side;
            self.heights[row + min_x as usize..=row + max_x as usize].fill(height);
        }
        self.recompute_max_height();
    }

    fn recompute_max_height(&mut self) {
        self.max_height = self.heights.iter().copied().max().unwrap_or(0);
    }

    /// Column under the world-space point `(x, z)`: rounded to the nearest
    /// column center and clamped onto the world.
    #[inline]
    pub fn column_at(&self, x: f32, z: f32) -> (i32, i32) {
        let last = self.world_size as i32 - 1;
        (
            ((x + 0.5).floor() as i32).clamp(0, last),
            ((z + 0.5).floor() as i32).clamp(0, last),
        )
    }

    /// Height of the ground under the world-space point `(x, z)`.
    #[inline]
    pub fn ground_height(&self, x: f32, z: f32) -> u32 {
        let (column_x, column_z) = self.column_at(x, z);
        self.heights[column_z as usize * self.world_size as usize + column_x as usize]
    }
}

fn check_height(height: u32) -> Result<(), VoxelError> {
    if height > MAX_COLUMN_HEIGHT {
        return Err(VoxelError::TooTall {
            height,
            max: MAX_COLUMN_HEIGHT,
        });
    }
    Ok(())
}
