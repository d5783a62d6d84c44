//! # Session
//!
//! The GPU-free frame loop: one [`Session::tick`] takes an input snapshot,
//! advances the observer and runs the visibility selector. Rendering is a
//! separate step that hands the result to any [`RenderSink`].
//!
//! A session owns its voxel store and observer outright; nothing is shared
//! across threads, so no locking is involved.

use cgmath::{Point3, Rad};
use log::{debug, info};

use super::{
    camera_state::camera::{Observer, Pose, StepOutcome},
    config::SessionConfig,
    error::{EngineError, VoxelError},
    rendering::{FrameView, RenderSink},
    visibility::{DrawInstruction, SelectionStats, VisibilitySelector},
    voxels::{
        terrain::TerrainBuilder,
        world::{VoxelStore, WorldEdit},
    },
    PlayerAction,
};

/// What happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSummary {
    /// Whether the observer stood on the ground this frame
    pub grounded: bool,
    /// Point the view is oriented towards
    pub look_target: Point3<f32>,
    /// Counters from this frame's selection pass
    pub stats: SelectionStats,
}

/// A running world: voxel store, observer and visibility selector.
#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
    store: VoxelStore,
    observer: Observer,
    selector: VisibilitySelector,
    last_step: Option<StepOutcome>,
}

impl Session {
    /// Validates `config`, generates terrain and places the observer on the
    /// ground at the spawn point.
    ///
    /// # Errors
    /// Returns [`EngineError::Config`] for an invalid configuration.
    pub fn new(config: SessionConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let height_map = TerrainBuilder::new(config.terrain).build(config.world_size)?;
        Self::with_store(config, VoxelStore::from_height_map(height_map))
    }

    /// Starts a session on a prebuilt world. The store's size takes precedence
    /// over `config.world_size`.
    ///
    /// # Errors
    /// Returns [`EngineError::Config`] for an invalid configuration.
    pub fn with_store(mut config: SessionConfig, store: VoxelStore) -> Result<Self, EngineError> {
        config.world_size = store.world_size();
        config.validate()?;

        let observer = spawn_observer(&config, &store);
        info!(
            "Session started: {}x{} world, max height {}, observer at ({:.1}, {:.1}, {:.1})",
            store.world_size(),
            store.world_size(),
            store.max_height(),
            observer.position.x,
            observer.position.y,
            observer.position.z
        );

        Ok(Self {
            selector: VisibilitySelector::new(config.visibility),
            config,
            store,
            observer,
            last_step: None,
        })
    }

    /// Advances the session by `dt` seconds: observer physics, then selection.
    pub fn tick(&mut self, action: &PlayerAction, dt: f32) -> FrameSummary {
        let step = self.observer.step(action, dt, &self.store, &self.config.physics);
        self.last_step = Some(step);
        self.selector.select(&self.observer, &self.store);

        FrameSummary {
            grounded: step.grounded,
            look_target: step.look_target,
            stats: self.selector.stats(),
        }
    }

    /// Applies a world edit. The change is visible to the next tick.
    pub fn apply_edit(&mut self, edit: WorldEdit) -> Result<(), VoxelError> {
        self.store.apply(edit)?;
        debug!("Applied {:?}, max height now {}", edit, self.store.max_height());
        Ok(())
    }

    /// Teleports the observer. Pitch is clamped to the configured limit.
    pub fn set_pose(&mut self, pose: Pose) {
        self.observer.set_pose(Pose {
            pitch: clamp_pitch(pose.pitch, &self.config),
            ..pose
        });
    }

    /// Hands the latest selection to a render sink.
    pub fn render(&self, sink: &mut impl RenderSink) -> Result<(), EngineError> {
        sink.draw(&self.frame_view())
    }

    /// The latest selection, packaged for a render sink.
    pub fn frame_view(&self) -> FrameView<'_> {
        FrameView {
            observer: &self.observer,
            instructions: self.selector.instructions(),
            max_height: self.store.max_height(),
        }
    }

    /// Configuration the session was started with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The voxel world.
    pub fn store(&self) -> &VoxelStore {
        &self.store
    }

    /// The observer.
    pub fn observer(&self) -> &Observer {
        &self.observer
    }

    /// Whether the latest tick ended on the ground. `false` before the first tick.
    pub fn grounded(&self) -> bool {
        self.last_step.is_some_and(|step| step.grounded)
    }

    /// Instructions from the latest tick.
    pub fn instructions(&self) -> &[DrawInstruction] {
        self.selector.instructions()
    }

    /// Selection counters from the latest tick.
    pub fn stats(&self) -> SelectionStats {
        self.selector.stats()
    }
}

fn spawn_observer(config: &SessionConfig, store: &VoxelStore) -> Observer {
    let center = store.world_size() as f32 / 2.0;
    let [x, z] = config.spawn.position.unwrap_or([center, center]);
    let y = store.ground_height(x, z) as f32 + config.physics.eye_height;
    Observer::new(
        Point3::new(x, y, z),
        Rad(config.spawn.yaw),
        clamp_pitch(Rad(config.spawn.pitch), config),
    )
}

fn clamp_pitch(pitch: Rad<f32>, config: &SessionConfig) -> Rad<f32> {
    let limit = config.physics.pitch_limit;
    Rad(pitch.0.clamp(-limit, limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::{config::TerrainMethod, error::ConfigError};

    fn flat_config(height: u32) -> SessionConfig {
        let mut config = SessionConfig {
            world_size: 16,
            ..SessionConfig::default()
        };
        config.terrain.method = TerrainMethod::Flat { height };
        config
    }

    #[test]
    fn observer_spawns_on_the_ground() {
        let session = Session::new(flat_config(4)).unwrap();
        let observer = session.observer();
        assert_eq!(observer.position.x, 8.0);
        assert_eq!(observer.position.z, 8.0);
        assert!((observer.position.y - 5.7).abs() < 1e-5);
    }

    #[test]
    fn spawn_and_teleport_pitch_respect_the_limit() {
        let mut config = flat_config(4);
        config.spawn.pitch = 1.4;
        let limit = config.physics.pitch_limit;

        let mut session = Session::new(config).unwrap();
        assert_eq!(session.observer().pitch, Rad(limit));

        let pose = Pose {
            pitch: Rad(-1.5),
            ..session.observer().pose()
        };
        session.set_pose(pose);
        assert_eq!(session.observer().pitch, Rad(-limit));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = flat_config(4);
        config.visibility.mid_radius = config.visibility.near_radius;
        assert!(matches!(
            Session::new(config),
            Err(EngineError::Config(ConfigError::Radii { .. }))
        ));
    }

    #[test]
    fn store_size_overrides_config() {
        let store = VoxelStore::flat(8, 2).unwrap();
        let session = Session::with_store(SessionConfig::default(), store).unwrap();
        assert_eq!(session.config().world_size, 8);
    }

    #[test]
    fn tick_selects_visible_columns() {
        let mut session = Session::new(flat_config(3)).unwrap();
        assert!(session.instructions().is_empty());
        let summary = session.tick(&PlayerAction::default(), 1.0 / 60.0);
        assert!(summary.grounded);
        assert!(session.grounded());
        assert_eq!(summary.stats.instructions() as usize, session.instructions().len());
        assert!(summary.stats.instructions() > 0);
    }

    #[test]
    fn edits_show_up_on_the_next_tick() {
        let mut session = Session::new(flat_config(3)).unwrap();
        session.tick(&PlayerAction::default(), 0.0);
        let before = session.stats();

        session.apply_edit(WorldEdit::Clear { height: 0 }).unwrap();
        let after = session.tick(&PlayerAction::default(), 0.0).stats;
        assert!(before.instructions() > 0);
        assert_eq!(after.instructions(), 0);
        assert_eq!(after.empty, before.instructions() + before.outer_ring);
    }

    #[test]
    fn out_of_bounds_edit_is_reported() {
        let mut session = Session::new(flat_config(3)).unwrap();
        let edit = WorldEdit::SetHeight { x: 16, z: 0, height: 1 };
        assert!(session.apply_edit(edit).is_err());
    }
}
