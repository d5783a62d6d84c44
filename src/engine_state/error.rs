//! # Engine Errors
//!
//! Error types surfaced by the engine. The core has no I/O of its own, so most
//! variants describe precondition violations caught at construction time:
//! a session with an invalid configuration is never built.

use std::path::PathBuf;

use thiserror::Error;

/// Rejections produced while loading or validating a [`SessionConfig`].
///
/// [`SessionConfig`]: super::config::SessionConfig
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The world must contain at least one column.
    #[error("world size must be positive, got {0}")]
    WorldSize(u32),

    /// Visibility radii must be strictly increasing.
    #[error("visibility radii must satisfy near < mid < far, got {near}/{mid}/{far}")]
    Radii {
        /// Full-column radius
        near: u32,
        /// Top-block radius
        mid: u32,
        /// Cull radius
        far: u32,
    },

    /// The view-cone threshold is a cosine.
    #[error("view-cone threshold must lie in [-1, 1], got {0}")]
    ViewDot(f32),

    /// A physics or look constant that has to be a finite, positive number.
    #[error("{name} must be finite and positive, got {value}")]
    NonPositive {
        /// Name of the offending field
        name: &'static str,
        /// Value that was rejected
        value: f32,
    },

    /// Terrain settings that could generate columns taller than the world allows.
    #[error("terrain could generate columns {tallest} blocks tall, the limit is {max}")]
    TerrainHeight {
        /// Tallest column the settings can produce
        tallest: u64,
        /// Height limit
        max: u32,
    },

    /// Gravity pulls the observer down, so it has to be negative.
    #[error("gravity must be finite and negative, got {0}")]
    Gravity(f32),

    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that was requested
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for a session config.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Rejections produced by the voxel store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VoxelError {
    /// A write addressed a column outside the world.
    #[error("column ({x}, {z}) is outside the {size}x{size} world")]
    OutOfBounds {
        /// Requested column x
        x: i32,
        /// Requested column z
        z: i32,
        /// Side length of the world
        size: u32,
    },

    /// A write asked for a column taller than the world allows.
    #[error("height {height} exceeds the column limit of {max}")]
    TooTall {
        /// Requested height
        height: u32,
        /// Height limit
        max: u32,
    },
}

/// Rejections produced by the GPU buffer registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BufferError {
    /// No buffer was registered under this name.
    #[error("no buffer named '{0}'")]
    Unknown(&'static str),

    /// A write would run past the end of the buffer.
    #[error("write of {len} bytes at offset {offset} overflows buffer '{name}' ({size} bytes)")]
    OutOfBounds {
        /// Buffer name
        name: &'static str,
        /// Byte offset of the write
        offset: u64,
        /// Length of the write in bytes
        len: u64,
        /// Allocated size of the buffer
        size: u64,
    },
}

/// Top-level error returned from [`crate::run`] and session construction.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid or unreadable configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Invalid world access.
    #[error(transparent)]
    Voxel(#[from] VoxelError),

    /// A GPU buffer operation was rejected.
    #[error(transparent)]
    Buffer(#[from] BufferError),

    /// GPU adapter, device or surface could not be created.
    #[error("graphics initialization failed: {0}")]
    Graphics(String),

    /// The window or event loop could not be created.
    #[error("window error: {0}")]
    Window(String),

    /// The event loop terminated abnormally.
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}
