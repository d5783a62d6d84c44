//! # Voxel World
//!
//! This module contains the world model the renderer draws from.
//!
//! ## Architecture
//!
//! * **Noise**: deterministic lattice value-noise, the raw material for terrain
//! * **Terrain**: turns noise into a height per column, once at startup
//! * **World**: the dense height-column store and its edit contract
//!
//! ## Data Flow
//!
//! 1. `TerrainBuilder` samples `HashNoise` (or Perlin) for every column
//! 2. The resulting `HeightMap` populates the `VoxelStore`
//! 3. The frame loop reads heights for the ground clamp and visibility selection
//! 4. `WorldEdit`s mutate heights in place; the next frame sees them immediately

pub mod noise;
pub mod terrain;
pub mod world;
