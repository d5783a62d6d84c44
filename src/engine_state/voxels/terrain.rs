//! # Terrain Builder
//!
//! Produces the height field the voxel store is populated from. Runs once at
//! session start and is fully deterministic for a given [`TerrainConfig`] and
//! world size.
//!
//! ## Smoothing
//!
//! Lattice noise is sampled at the four corners of each column
//! `(x, z), (x + 1, z), (x, z + 1), (x + 1, z + 1)` and averaged, which gives
//! neighboring columns shared samples and therefore gentle slopes. The averaged
//! value `n` in `[0, 1)` becomes `min_height + floor(n * height_span)`.

use log::debug;
use noise::{NoiseFn, Perlin};

use crate::engine_state::{
    config::{TerrainConfig, TerrainMethod},
    error::ConfigError,
};

use super::noise::HashNoise;

/// Largest value a unit-range sample may take, keeping `floor(n * span) < span`.
const UNIT_MAX: f64 = 1.0 - f64::EPSILON;

/// Generated column heights for a square world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeightMap {
    /// Side length of the world
    pub world_size: u32,
    /// Column heights indexed by `z * world_size + x`
    pub heights: Vec<u32>,
    /// Largest value in `heights`
    pub max_height: u32,
}

/// Perlin noise remapped from `[-1, 1]` into `[0, 1)`.
struct UnitPerlin {
    perlin: Perlin,
    scale: f64,
}

impl NoiseFn<f64, 2> for UnitPerlin {
    fn get(&self, point: [f64; 2]) -> f64 {
        let sample = self.perlin.get([point[0] * self.scale, point[1] * self.scale]);
        (sample * 0.5 + 0.5).clamp(0.0, UNIT_MAX)
    }
}

/// Builds height maps from a terrain configuration.
#[derive(Debug, Clone, Copy)]
pub struct TerrainBuilder {
    config: TerrainConfig,
}

impl TerrainBuilder {
    /// Creates a builder for the given settings.
    pub fn new(config: TerrainConfig) -> Self {
        Self { config }
    }

    /// Generates heights for every column in `[0, world_size)²`.
    ///
    /// # Errors
    /// Returns [`ConfigError::WorldSize`] when `world_size` is zero and
    /// [`ConfigError::TerrainHeight`] when the settings could exceed the column limit.
    pub fn build(&self, world_size: u32) -> Result<HeightMap, ConfigError> {
        if world_size == 0 {
            return Err(ConfigError::WorldSize(world_size));
        }
        self.config.validate()?;

        let height_map = match self.config.method {
            TerrainMethod::Hash => self.build_with(world_size, &HashNoise::new(self.config.seed)),
            TerrainMethod::Perlin { scale } => self.build_with(
                world_size,
                &UnitPerlin {
                    perlin: Perlin::new(self.config.seed),
                    scale,
                },
            ),
            TerrainMethod::Flat { height } => {
                let side = world_size as usize;
                HeightMap {
                    world_size,
                    heights: vec![height; side * side],
                    max_height: height,
                }
            }
        };

        debug!(
            "Generated {}x{} terrain ({:?}), max height {}",
            world_size, world_size, self.config.method, height_map.max_height
        );
        Ok(height_map)
    }

    /// Generates heights from any unit-range noise source.
    fn build_with<N: NoiseFn<f64, 2>>(&self, world_size: u32, noise: &N) -> HeightMap {
        let side = world_size as usize;
        let mut heights = Vec::with_capacity(side * side);
        let mut max_height = 0;

        for z in 0..world_size as i32 {
            for x in 0..world_size as i32 {
                let height = self.height_for(smoothed_sample(noise, x, z));
                max_height = max_height.max(height);
                heights.push(height);
            }
        }

        HeightMap {
            world_size,
            heights,
            max_height,
        }
    }

    /// Maps a unit sample into `[min_height, min_height + height_span)`.
    fn height_for(&self, sample: f64) -> u32 {
        let offset = (sample.clamp(0.0, UNIT_MAX) * self.config.height_span as f64).floor();
        self.config.min_height + offset as u32
    }
}

/// Averages the noise at the four lattice corners of column `(x, z)`.
fn smoothed_sample<N: NoiseFn<f64, 2>>(noise: &N, x: i32, z: i32) -> f64 {
    let (x, z) = (x as f64, z as f64);
    (noise.get([x, z]) + noise.get([x + 1.0, z]) + noise.get([x, z + 1.0]) + noise.get([x + 1.0, z + 1.0]))
        * 0.25
}
