//! # Session Configuration
//!
//! Tunable settings for a running session, fixed once the session starts.
//!
//! Defaults describe a 64x64 world with visibility radii
//! of 18/36/48 blocks and a fairly wide view cone. A JSON file named by the
//! `VOXEL_LOD_CONFIG` environment variable may override any subset of fields.
//!
//! ```json
//! { "world_size": 128, "visibility": { "far_radius": 64, "mid_radius": 40 } }
//! ```

use std::{f32::consts::PI, path::Path};

use log::info;
use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Environment variable naming an optional JSON configuration file.
pub const CONFIG_ENV_VAR: &str = "VOXEL_LOD_CONFIG";

/// Tallest column the world may hold, generated or edited.
pub const MAX_COLUMN_HEIGHT: u32 = 4096;

/// Complete configuration of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Side length of the square world, in columns
    pub world_size: u32,
    /// Terrain generation settings
    pub terrain: TerrainConfig,
    /// Distance tiers and view cone for the visibility selector
    pub visibility: VisibilityConfig,
    /// Observer movement and gravity constants
    pub physics: PhysicsConfig,
    /// Starting pose of the observer
    pub spawn: SpawnConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            world_size: 64,
            terrain: TerrainConfig::default(),
            visibility: VisibilityConfig::default(),
            physics: PhysicsConfig::default(),
            spawn: SpawnConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Loads the configuration named by [`CONFIG_ENV_VAR`], or the defaults when
    /// the variable is unset. The result is always validated.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::from_file(path),
            None => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Reads and validates a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&contents)?;
        info!("Loaded session config from {}", path.display());
        Ok(config)
    }

    /// Parses and validates a JSON configuration document. Missing fields keep
    /// their default values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every precondition the core relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world_size == 0 {
            return Err(ConfigError::WorldSize(self.world_size));
        }
        self.terrain.validate()?;
        self.visibility.validate()?;
        self.physics.validate()?;
        Ok(())
    }
}

/// How column heights are derived during terrain generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TerrainMethod {
    /// Integer hash value-noise averaged over a 2x2 lattice neighborhood
    Hash,
    /// Perlin gradient noise sampled at `scale` blocks per unit
    Perlin {
        /// Frequency multiplier applied to column coordinates
        scale: f64,
    },
    /// Every column has the same height
    Flat {
        /// Height of every column
        height: u32,
    },
}

/// Terrain generation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Seed threaded into the noise source
    pub seed: u32,
    /// Lowest generated column height
    pub min_height: u32,
    /// Number of distinct heights above `min_height`
    pub height_span: u32,
    /// Height source
    pub method: TerrainMethod,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            min_height: 10,
            height_span: 22,
            method: TerrainMethod::Hash,
        }
    }
}

impl TerrainConfig {
    /// Tallest column these settings can generate.
    pub fn tallest_column(&self) -> u64 {
        match self.method {
            TerrainMethod::Flat { height } => height as u64,
            TerrainMethod::Hash | TerrainMethod::Perlin { .. } => {
                self.min_height as u64 + (self.height_span as u64).saturating_sub(1)
            }
        }
    }

    /// Rejects settings that could generate a column above [`MAX_COLUMN_HEIGHT`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tallest = self.tallest_column();
        if tallest > MAX_COLUMN_HEIGHT as u64 {
            return Err(ConfigError::TerrainHeight {
                tallest,
                max: MAX_COLUMN_HEIGHT,
            });
        }
        Ok(())
    }
}

/// Distance tiers and view cone used by the visibility selector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityConfig {
    /// Columns within this radius are drawn in full
    pub near_radius: u32,
    /// Columns within this radius (and outside `near_radius`) draw their top block
    pub mid_radius: u32,
    /// Columns beyond this radius are never considered
    pub far_radius: u32,
    /// Minimum cosine between the planar view direction and a candidate column
    pub min_view_dot: f32,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            near_radius: 18,
            mid_radius: 36,
            far_radius: 48,
            min_view_dot: -0.15,
        }
    }
}

impl VisibilityConfig {
    /// Checks radius ordering and the cone threshold range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.near_radius < self.mid_radius && self.mid_radius < self.far_radius) {
            return Err(ConfigError::Radii {
                near: self.near_radius,
                mid: self.mid_radius,
                far: self.far_radius,
            });
        }
        if !(-1.0..=1.0).contains(&self.min_view_dot) {
            return Err(ConfigError::ViewDot(self.min_view_dot));
        }
        Ok(())
    }
}

/// Observer movement, look and gravity constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Vertical acceleration in blocks/s², negative is down
    pub gravity: f32,
    /// Vertical velocity applied by a jump
    pub jump_speed: f32,
    /// Horizontal speed in blocks/s
    pub move_speed: f32,
    /// Speed multiplier while sprinting
    pub sprint_multiplier: f32,
    /// Height of the eye above the ground under the observer
    pub eye_height: f32,
    /// Radians of rotation per pixel of mouse movement
    pub mouse_sensitivity: f32,
    /// Pitch is clamped to `[-pitch_limit, pitch_limit]`
    pub pitch_limit: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: -18.0,
            jump_speed: 6.5,
            move_speed: 6.0,
            sprint_multiplier: 1.8,
            eye_height: 1.7,
            mouse_sensitivity: 0.003,
            pitch_limit: PI / 3.0,
        }
    }
}

impl PhysicsConfig {
    /// Rejects non-finite constants, non-negative gravity and pitch limits that
    /// would let the view flip past vertical.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.gravity.is_finite() && self.gravity < 0.0) {
            return Err(ConfigError::Gravity(self.gravity));
        }
        let positive = [
            ("jump_speed", self.jump_speed),
            ("move_speed", self.move_speed),
            ("sprint_multiplier", self.sprint_multiplier),
            ("eye_height", self.eye_height),
            ("mouse_sensitivity", self.mouse_sensitivity),
            ("pitch_limit", self.pitch_limit),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        if self.pitch_limit >= PI / 2.0 {
            return Err(ConfigError::NonPositive {
                name: "pitch_limit",
                value: self.pitch_limit,
            });
        }
        Ok(())
    }
}

/// Starting pose of the observer. The vertical position is always derived from
/// the ground under the spawn column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Horizontal spawn position; the world center when absent
    pub position: Option<[f32; 2]>,
    /// Initial yaw in radians (0 faces +Z, π faces -Z)
    pub yaw: f32,
    /// Initial pitch in radians
    pub pitch: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            position: None,
            yaw: PI,
            pitch: -0.15,
        }
    }
}
