//! # Engine State Module
//!
//! The core of the renderer and the wiring that connects it to a window.
//!
//! ## Key Components
//!
//! * `config` - Session settings and their validation
//! * `error` - Error taxonomy for configuration, world access and start-up
//! * `voxels` - Noise, terrain generation and the height-column voxel store
//! * `camera_state` - The observer with its physics step, plus the GPU camera
//! * `visibility` - Distance-tier and view-cone selection of columns to draw
//! * `session` - The GPU-free frame loop tying the above together
//! * `rendering` - The render sink interface and its wgpu implementation
//! * `buffer_state` - Named GPU buffer registry
//!
//! ## Frame Flow
//!
//! Input snapshot (`PlayerAction`) → observer step → visibility selection →
//! render sink. Everything up to the render sink is pure CPU work and runs
//! without a GPU, which is how the tests drive it.

use log::info;
use wgpu::{Device, Queue, Surface, SurfaceConfiguration};
use winit::keyboard::KeyCode;

use crate::application_state::input_state::ProcessedInputState;

pub mod buffer_state;
pub mod camera_state;
pub mod config;
pub mod error;
pub mod rendering;
pub mod session;
pub mod visibility;
pub mod voxels;

use error::EngineError;
use rendering::CubeRenderer;
use session::{FrameSummary, Session};

/// Connects a [`Session`] to a window surface.
///
/// Owns the session, the wgpu renderer and the current input snapshot.
pub struct EngineState {
    /// The running world and observer
    pub session: Session,
    /// Current player actions derived from input
    pub player_actions: PlayerAction,
    /// Renderer drawing the session's selection
    renderer: CubeRenderer,
    /// Whether mouse motion turns the view
    look_active: bool,
}

impl EngineState {
    /// Creates the renderer for a configured surface and attaches it to `session`.
    ///
    /// # Arguments
    ///
    /// * `session` - The session to draw
    /// * `surface` - The rendering surface
    /// * `surface_config` - Configuration the surface was configured with
    /// * `device` - The GPU device
    /// * `queue` - The GPU command queue
    pub fn new(
        session: Session,
        surface: Surface<'static>,
        surface_config: SurfaceConfiguration,
        device: Device,
        queue: Queue,
    ) -> Result<Self, EngineError> {
        info!(
            "Renderer targeting {}x{} {:?}",
            surface_config.width, surface_config.height, surface_config.format
        );
        let renderer = CubeRenderer::new(surface, surface_config, device, queue)?;

        Ok(Self {
            session,
            player_actions: PlayerAction::default(),
            renderer,
            look_active: true,
        })
    }

    /// Resizes the rendering surface when the window size changes
    pub fn resize_surface(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        self.renderer.resize_surface(size);
    }

    /// Enables or disables mouse look, following cursor capture.
    pub fn set_look_active(&mut self, look_active: bool) {
        self.look_active = look_active;
    }

    /// Renders the latest selection.
    pub fn render(&mut self) -> Result<(), EngineError> {
        self.session.render(&mut self.renderer)
    }

    /// Advances the session by `dt` using the current input snapshot, then
    /// clears the one-shot parts of the snapshot.
    pub fn process_input(&mut self, dt: web_time::Duration) -> FrameSummary {
        let summary = self.session.tick(&self.player_actions, dt.as_secs_f32());

        if self.player_actions.print_pose {
            let pose = self.session.observer().pose();
            info!(
                "pos=({:.2}, {:.2}, {:.2}) yaw={:.3} pitch={:.3}",
                pose.position.x, pose.position.y, pose.position.z, pose.yaw.0, pose.pitch.0
            );
        }
        if self.player_actions.get_buffer_data {
            self.renderer.log_buffer_analytics();
        }

        self.player_actions.consume_one_shots();
        summary
    }

    /// Sets the input commands for the next tick.
    pub fn set_input_commands(&mut self, input: ProcessedInputState) {
        self.player_actions = PlayerAction::from_input(&input, self.look_active);
    }
}

/// Input snapshot for one tick.
///
/// Movement keys are level-triggered (active while held); `jump` and the
/// debug actions are edge-triggered (set only on the frame the key went down).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerAction {
    /// Move along the planar view direction
    pub move_forward: bool,
    /// Move against the planar view direction
    pub move_backward: bool,
    /// Strafe left
    pub move_left: bool,
    /// Strafe right
    pub move_right: bool,
    /// Multiply movement speed
    pub sprint: bool,
    /// Jump if standing on the ground
    pub jump: bool,
    /// Whether `mouse_delta` turns the view
    pub look_active: bool,
    /// Mouse movement in pixels since the previous tick
    pub mouse_delta: (f32, f32),
    /// Log the observer pose
    pub print_pose: bool,
    /// Log GPU buffer analytics
    pub get_buffer_data: bool,
}

impl PlayerAction {
    /// Translates the processed input state into player actions.
    ///
    /// # Arguments
    /// * `input` - Key transitions and mouse motion since the last tick
    /// * `look_active` - Whether the cursor is captured
    pub fn from_input(input: &ProcessedInputState, look_active: bool) -> Self {
        let (delta_x, delta_y) = input.get_mouse_delta().unwrap_or((0.0, 0.0));
        Self {
            move_forward: input.get_key_state(KeyCode::KeyW).is_active(),
            move_backward: input.get_key_state(KeyCode::KeyS).is_active(),
            move_left: input.get_key_state(KeyCode::KeyA).is_active(),
            move_right: input.get_key_state(KeyCode::KeyD).is_active(),
            sprint: input.get_key_state(KeyCode::ShiftLeft).is_active()
                || input.get_key_state(KeyCode::ShiftRight).is_active(),
            jump: input.get_key_state(KeyCode::Space).is_just_pressed(),
            look_active,
            mouse_delta: (delta_x as f32, delta_y as f32),
            print_pose: input.get_key_state(KeyCode::KeyP).is_just_pressed(),
            get_buffer_data: input.get_key_state(KeyCode::KeyB).is_just_pressed(),
        }
    }

    /// Clears edge-triggered actions and mouse motion so they apply to one tick only.
    pub fn consume_one_shots(&mut self) {
        self.jump = false;
        self.print_pose = false;
        self.get_buffer_data = false;
        self.mouse_delta = (0.0, 0.0);
    }
}
