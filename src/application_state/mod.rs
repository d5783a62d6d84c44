//! # Application State Management
//!
//! This module handles the application's state management, including:
//! - Window and graphics initialization
//! - Input handling and cursor capture
//! - Frame timing and the once-per-second statistics report
//! - Application lifecycle events

pub mod graphics_resources_builder;
pub mod input_manager;
pub mod input_state;

use std::sync::Arc;

use graphics_resources_builder::{Graphics, GraphicsBuilder, MaybeGraphics, WINDOW_TITLE};
use input_manager::InputManager;
use log::{debug, error, warn};
use web_time::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoopProxy},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowId},
};

use crate::engine_state::{
    error::EngineError,
    session::{FrameSummary, Session},
    visibility::SelectionStats,
    EngineState,
};

/// Longest time step fed to the physics, so a stalled frame cannot tunnel
/// the observer through the ground clamp.
const MAX_FRAME_TIME: Duration = Duration::from_millis(100);

/// How often frame statistics are reported.
const REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// The main application state container that manages the application's lifecycle.
pub struct ApplicationState {
    /// The current graphics state
    graphics: MaybeGraphics,
    /// The session waiting for graphics to become available
    pending_session: Option<Session>,
    /// The initialized application state, once graphics are ready
    state: Option<InitializedApplicationState>,
    /// First fatal error, reported after the event loop exits
    fatal_error: Option<EngineError>,
}

/// Represents the fully initialized and running state of the application.
pub struct InitializedApplicationState {
    /// The core engine state
    pub engine_state: EngineState,
    /// Handle to the application window
    pub window: Arc<Window>,
    /// Manages input state and event processing
    pub input_manager: InputManager,
    /// Timestamp of the last frame for delta time calculations
    pub last_wait_time: Instant,
    /// Whether the cursor is captured for mouse look
    pub cursor_captured: bool,
    /// Accumulates statistics between reports
    pub frame_counter: FrameCounter,
}

impl ApplicationState {
    /// Creates the application for `session`; graphics are built once the
    /// event loop resumes.
    pub fn new(session: Session, event_loop_proxy: EventLoopProxy<Graphics>) -> Self {
        Self {
            graphics: MaybeGraphics::Builder(GraphicsBuilder::new(event_loop_proxy)),
            pending_session: Some(session),
            state: None,
            fatal_error: None,
        }
    }

    /// Takes the fatal error that stopped the event loop, if any.
    pub fn take_error(&mut self) -> Option<EngineError> {
        self.fatal_error.take()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: EngineError) {
        error!("{}", err);
        self.fatal_error.get_or_insert(err);
        event_loop.exit();
    }

    /// Moves the graphics resources and the pending session into a running engine.
    fn initialize_application_state(&mut self) -> Result<(), EngineError> {
        let MaybeGraphics::Graphics(gfx) = std::mem::replace(&mut self.graphics, MaybeGraphics::Moved) else {
            return Ok(());
        };
        let Some(session) = self.pending_session.take() else {
            return Ok(());
        };

        let engine_state = EngineState::new(session, gfx.surface, gfx.surface_config, gfx.device, gfx.queue)?;

        let mut state = InitializedApplicationState {
            engine_state,
            window: gfx.window,
            input_manager: InputManager::new(),
            last_wait_time: Instant::now(),
            cursor_captured: false,
            frame_counter: FrameCounter::default(),
        };
        state.set_cursor_captured(true);
        state.window.request_redraw();

        self.state = Some(state);
        Ok(())
    }
}

impl InitializedApplicationState {
    /// Grabs or releases the cursor and switches mouse look accordingly.
    fn set_cursor_captured(&mut self, captured: bool) {
        let grab = if captured {
            self.window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined))
        } else {
            self.window.set_cursor_grab(CursorGrabMode::None)
        };
        if let Err(err) = grab {
            warn!("Could not change cursor grab: {}", err);
        }
        self.window.set_cursor_visible(!captured);
        self.cursor_captured = captured;
        self.engine_state.set_look_active(captured);
    }
}

fn is_exit_event(event: &WindowEvent) -> bool {
    matches!(
        event,
        WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event: KeyEvent {
                    state: ElementState::Pressed,
                    physical_key: PhysicalKey::Code(KeyCode::Escape),
                    ..
                },
                ..
            }
    )
}

impl ApplicationHandler<Graphics> for ApplicationState {
    /// Handles window-related events such as resize, focus changes, and input events.
    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if is_exit_event(&event) {
            event_loop.exit();
            return;
        }

        let Some(state) = &mut self.state else {
            return;
        };

        state.input_manager.intake_input(&event);

        match event {
            WindowEvent::Resized(size) => {
                state.engine_state.resize_surface(size);
            }
            WindowEvent::Focused(false) => {
                state.input_manager.reset_inputs();
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = state.engine_state.render() {
                    self.fail(event_loop, err);
                }
            }
            _ => (),
        }
    }

    /// Handles device-level input events such as mouse motion.
    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let Some(state) = &mut self.state {
            if let DeviceEvent::MouseMotion { delta } = event {
                state.input_manager.intake_mouse_motion(delta);
            }
        }
    }

    /// Builds the window and graphics the first time the application resumes.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let MaybeGraphics::Builder(builder) = &mut self.graphics {
            if let Err(err) = builder.build_and_send(event_loop) {
                self.fail(event_loop, err);
            }
        }
    }

    /// Receives the initialized graphics and starts the engine.
    fn user_event(&mut self, event_loop: &ActiveEventLoop, graphics: Graphics) {
        self.graphics = MaybeGraphics::Graphics(graphics);
        if let Err(err) = self.initialize_application_state() {
            self.fail(event_loop, err);
        }
    }

    /// Runs one tick: input snapshot, session step, statistics, redraw request.
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        let Some(state) = &mut self.state else {
            return;
        };

        let now = Instant::now();
        let dt = (now - state.last_wait_time).min(MAX_FRAME_TIME);
        state.last_wait_time = now;

        let processed_input = state.input_manager.get_and_reset_processed_input();
        if processed_input.get_key_state(KeyCode::Tab).is_just_pressed() {
            let captured = !state.cursor_captured;
            state.set_cursor_captured(captured);
        }
        state.engine_state.set_input_commands(processed_input);

        let summary = state.engine_state.process_input(dt);
        if let Some(report) = state.frame_counter.record(dt, &summary) {
            debug!(
                "{:.0} fps, {} columns ({} full, {} top), {} cubes, culled {} by distance and {} by view cone",
                report.fps,
                report.stats.instructions(),
                report.stats.full_columns,
                report.stats.top_blocks,
                report.stats.cubes,
                report.stats.distance_culled,
                report.stats.cone_culled
            );
            state.window.set_title(&report.title());
        }

        state.window.request_redraw();
    }
}

/// Statistics reported once per [`REPORT_INTERVAL`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Average frames per second over the interval
    pub fps: f32,
    /// Selection counters from the latest frame
    pub stats: SelectionStats,
}

impl FrameReport {
    /// Window title showing the report.
    pub fn title(&self) -> String {
        format!("{} | {:.0} fps | cubes drawn: {}", WINDOW_TITLE, self.fps, self.stats.cubes)
    }
}

/// Counts frames between reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameCounter {
    frames: u32,
    elapsed: Duration,
}

impl FrameCounter {
    /// Records one frame, returning a report once per interval.
    pub fn record(&mut self, dt: Duration, summary: &FrameSummary) -> Option<FrameReport> {
        self.frames += 1;
        self.elapsed += dt;
        if self.elapsed < REPORT_INTERVAL {
            return None;
        }

        let report = FrameReport {
            fps: self.frames as f32 / self.elapsed.as_secs_f32(),
            stats: summary.stats,
        };
        *self = Self::default();
        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Point3;

    use super::*;

    fn summary(cubes: u32) -> FrameSummary {
        FrameSummary {
            grounded: true,
            look_target: Point3::new(0.0, 0.0, 0.0),
            stats: SelectionStats {
                cubes,
                ..SelectionStats::default()
            },
        }
    }

    #[test]
    fn reports_once_per_interval() {
        let mut counter = FrameCounter::default();
        let frame = Duration::from_millis(250);
        assert!(counter.record(frame, &summary(1)).is_none());
        assert!(counter.record(frame, &summary(2)).is_none());
        assert!(counter.record(frame, &summary(3)).is_none());
        let report = counter.record(frame, &summary(4)).unwrap();
        assert!((report.fps - 4.0).abs() < 1e-4);
        assert_eq!(report.stats.cubes, 4);
        assert!(counter.record(frame, &summary(5)).is_none());
    }

    #[test]
    fn title_shows_cubes_drawn() {
        let report = FrameReport {
            fps: 59.6,
            stats: SelectionStats {
                cubes: 1234,
                ..SelectionStats::default()
            },
        };
        assert_eq!(report.title(), "Voxel LOD | 60 fps | cubes drawn: 1234");
    }
}
