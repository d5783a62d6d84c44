#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel LOD
//!
//! A real-time renderer for a procedurally generated voxel world of height
//! columns, with distance-based level of detail and view-cone culling.
//!
//! ## Key Modules
//!
//! * `application_state` - Window, graphics start-up, input capture and the event loop
//! * `engine_state` - The world, the observer, visibility selection and rendering
//!
//! ## Architecture
//!
//! The frame loop is split so that everything but drawing runs without a GPU:
//! * [`Session`] owns the world, the observer and the visibility selector and
//!   advances them one tick at a time from a [`PlayerAction`] snapshot
//! * The tick's selection is a list of [`DrawInstruction`]s, each naming a
//!   column and whether to draw all of it or only its top block
//! * A [`RenderSink`] turns instructions into pixels; the wgpu renderer draws
//!   one instanced unit cube per block
//!
//! ## Usage
//!
//! ```no_run
//! fn main() {
//!     if let Err(err) = voxel_lod::run() {
//!         eprintln!("{err}");
//!     }
//! }
//! ```
//!
//! Driving a session headless:
//!
//! ```
//! use voxel_lod::{PlayerAction, Session, SessionConfig};
//!
//! let mut session = Session::new(SessionConfig::default()).unwrap();
//! let summary = session.tick(&PlayerAction::default(), 1.0 / 60.0);
//! assert!(summary.grounded);
//! assert!(!session.instructions().is_empty());
//! ```

use application_state::ApplicationState;
use log::info;
use winit::event_loop::EventLoop;

mod application_state;
pub mod engine_state;

pub use engine_state::{
    camera_state::camera::{LookBasis, Observer, Pose, StepOutcome},
    config::{
        PhysicsConfig, SessionConfig, SpawnConfig, TerrainConfig, TerrainMethod, VisibilityConfig, MAX_COLUMN_HEIGHT,
    },
    error::{BufferError, ConfigError, EngineError, VoxelError},
    rendering::{build_cube_instances, shading::color_for, FrameView, RenderSink},
    session::{FrameSummary, Session},
    visibility::{select, select_into, DetailLevel, DrawInstruction, SelectionStats, VisibilitySelector},
    voxels::{
        noise::{noise_2d, HashNoise},
        terrain::{HeightMap, TerrainBuilder},
        world::{VoxelStore, WorldEdit},
    },
    PlayerAction,
};

/// Runs the renderer in a native window until it is closed.
///
/// Logging goes to stdout, filtered by `RUST_LOG`. The session configuration
/// is read from the file named by `VOXEL_LOD_CONFIG`, or defaults.
///
/// # Errors
/// Invalid configuration, window or GPU start-up failures, and fatal
/// rendering errors.
pub fn run() -> Result<(), EngineError> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
    info!("Logger initialized");

    let config = SessionConfig::load()?;
    let session = Session::new(config)?;

    let event_loop = EventLoop::with_user_event().build()?;
    let mut state = ApplicationState::new(session, event_loop.create_proxy());
    event_loop.run_app(&mut state)?;

    match state.take_error() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
