//! # Graphics Resources Builder
//!
//! Creates the window and the WebGPU context it renders into.
//!
//! The main components are:
//! - `Graphics`: Holds all graphics-related resources
//! - `GraphicsBuilder`: Creates `Graphics` and posts it back to the event loop
//! - `MaybeGraphics`: Represents the various states of graphics initialization

use std::future::Future;
use std::sync::Arc;

use log::info;
use wgpu::{Device, Queue, Surface, SurfaceConfiguration};
use winit::{
    dpi::LogicalSize,
    event_loop::{ActiveEventLoop, EventLoopProxy},
    window::Window,
};

use crate::engine_state::error::EngineError;

/// Title shown until the first frame statistics arrive.
pub const WINDOW_TITLE: &str = "Voxel LOD";

/// Contains all graphics-related resources required by the application.
pub struct Graphics {
    /// The application window
    pub window: Arc<Window>,
    /// Surface presenting into `window`
    pub surface: Surface<'static>,
    /// Configuration the surface was configured with
    pub surface_config: SurfaceConfiguration,
    /// The GPU device
    pub device: Device,
    /// The GPU command queue
    pub queue: Queue,
}

/// Creates the window and starts the asynchronous WebGPU setup.
///
/// # Arguments
/// * `event_loop` - The active event loop used to create the window and surface
///
/// # Returns
/// A `Future` that resolves to configured `Graphics`
fn create_graphics(
    event_loop: &ActiveEventLoop,
) -> Result<impl Future<Output = Result<Graphics, EngineError>> + 'static, EngineError> {
    let window_attrs = Window::default_attributes()
        .with_title(WINDOW_TITLE)
        .with_inner_size(LogicalSize::new(1280, 720));

    let window = Arc::new(
        event_loop
            .create_window(window_attrs)
            .map_err(|err| EngineError::Window(err.to_string()))?,
    );

    // The instance is a handle to our GPU
    // Backends::PRIMARY => Vulkan + Metal + DX12 + Browser WebGPU
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        flags: wgpu::InstanceFlags::empty(),
        backend_options: wgpu::BackendOptions::from_env_or_default(),
    });

    let surface = instance
        .create_surface(window.clone())
        .map_err(|err| EngineError::Graphics(err.to_string()))?;

    Ok(async move {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|err| EngineError::Graphics(err.to_string()))?;
        info!("Using adapter {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: wgpu::MemoryHints::MemoryUsage,
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|err| EngineError::Graphics(err.to_string()))?;

        let size = window.inner_size();

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| EngineError::Graphics(String::from("surface supports no formats")))?;
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &surface_config);
        Ok(Graphics {
            window,
            surface,
            surface_config,
            device,
            queue,
        })
    })
}

/// Helper struct for managing the initialization of graphics resources.
pub struct GraphicsBuilder {
    event_loop_proxy: Option<EventLoopProxy<Graphics>>,
}

/// Represents the possible states of the graphics initialization process.
pub enum MaybeGraphics {
    /// Waiting for the event loop to resume
    Builder(GraphicsBuilder),

    /// Graphics resources are ready but not yet handed to the engine
    Graphics(Graphics),

    /// Graphics resources have been moved into the engine
    Moved,
}

impl GraphicsBuilder {
    /// Creates a new GraphicsBuilder with the specified event loop proxy.
    ///
    /// # Arguments
    /// * `event_loop_proxy` - Used to send the initialized graphics resources back to the event loop
    pub fn new(event_loop_proxy: EventLoopProxy<Graphics>) -> Self {
        Self {
            event_loop_proxy: Some(event_loop_proxy),
        }
    }

    /// Creates the graphics resources and sends them to the event loop.
    ///
    /// Does nothing if graphics were already built.
    ///
    /// # Errors
    /// Window, adapter, device or surface creation failures, or a closed event loop.
    pub fn build_and_send(&mut self, event_loop: &ActiveEventLoop) -> Result<(), EngineError> {
        let Some(event_loop_proxy) = self.event_loop_proxy.take() else {
            // event_loop_proxy is already spent - we already constructed Graphics
            return Ok(());
        };

        let gfx = pollster::block_on(create_graphics(event_loop)?)?;
        event_loop_proxy
            .send_event(gfx)
            .map_err(|_| EngineError::Window(String::from("event loop closed during start-up")))
    }
}
