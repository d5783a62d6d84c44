//! Rendering system for the voxel engine.
//!
//! The core hands each frame to a [`RenderSink`] as abstract draw
//! instructions; it never issues draw calls itself. [`CubeRenderer`] is the
//! wgpu sink: it expands instructions into one colored unit cube per block and
//! draws them all with a single instanced call.

use log::warn;
use wgpu::{Device, Queue, Surface, SurfaceConfiguration};

use pipeline_manager::PipelineManager;
use vertex::{CubeInstance, CUBE_INDICES, CUBE_VERTICES};

use super::{
    buffer_state::BufferState,
    camera_state::{camera::Observer, CameraState},
    error::EngineError,
    visibility::DrawInstruction,
};

mod pipeline_manager;
pub mod shading;
mod texture;
pub mod vertex;

/// Name of the static cube vertex buffer
pub const CUBE_VERTEX_BUFFER_NAME: &str = "cube_vertex_buffer";
/// Name of the static cube index buffer
pub const CUBE_INDEX_BUFFER_NAME: &str = "cube_index_buffer";
/// Name of the per-frame instance buffer
pub const INSTANCE_BUFFER_NAME: &str = "cube_instance_buffer";

/// Everything a sink needs to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    /// Observer the view is rendered from
    pub observer: &'a Observer,
    /// Columns selected this frame
    pub instructions: &'a [DrawInstruction],
    /// Tallest column in the world, for shading
    pub max_height: u32,
}

/// Consumer of per-frame draw instructions.
pub trait RenderSink {
    /// Draws one frame.
    fn draw(&mut self, frame: &FrameView<'_>) -> Result<(), EngineError>;
}

/// Expands draw instructions into one cube instance per block, replacing the
/// contents of `out`.
///
/// Full columns produce cubes at `y = 0..height`, top-only columns a single
/// cube at `y = height - 1`. Cubes are centered on integer coordinates.
pub fn build_cube_instances(instructions: &[DrawInstruction], max_height: u32, out: &mut Vec<CubeInstance>) {
    out.clear();
    for instruction in instructions {
        for y in instruction.blocks() {
            out.push(CubeInstance {
                center: [instruction.x as f32, y as f32, instruction.z as f32],
                color: shading::to_linear(shading::color_for(y, max_height)),
            });
        }
    }
}

/// Renders frames into a window surface with wgpu.
pub struct CubeRenderer {
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,
    device: Device,
    queue: Queue,
    buffer_state: BufferState,
    camera_state: CameraState,
    pipeline_manager: PipelineManager,
    instances: Vec<CubeInstance>,
}

impl CubeRenderer {
    /// Creates the renderer for an already configured surface.
    ///
    /// # Arguments
    /// * `surface` - The WebGPU surface to render to
    /// * `surface_config` - Configuration the surface was configured with
    /// * `device` - The WebGPU device
    /// * `queue` - The WebGPU queue
    pub fn new(
        surface: Surface<'static>,
        surface_config: SurfaceConfiguration,
        device: Device,
        queue: Queue,
    ) -> Result<Self, EngineError> {
        let mut buffer_state = BufferState::new(device.clone(), queue.clone());

        buffer_state.create_buffer_init(
            CUBE_VERTEX_BUFFER_NAME,
            wgpu::util::BufferInitDescriptor {
                label: Some(CUBE_VERTEX_BUFFER_NAME),
                contents: bytemuck::cast_slice(&CUBE_VERTICES),
                usage: wgpu::BufferUsages::VERTEX,
            },
        );
        buffer_state.create_buffer_init(
            CUBE_INDEX_BUFFER_NAME,
            wgpu::util::BufferInitDescriptor {
                label: Some(CUBE_INDEX_BUFFER_NAME),
                contents: bytemuck::cast_slice(&CUBE_INDICES),
                usage: wgpu::BufferUsages::INDEX,
            },
        );

        let camera_state = CameraState::new(&mut buffer_state, surface_config.width, surface_config.height);
        let pipeline_manager = PipelineManager::new(&device, &surface_config, &buffer_state)?;

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            buffer_state,
            camera_state,
            pipeline_manager,
            instances: Vec::new(),
        })
    }

    /// Handles window resize events.
    ///
    /// # Arguments
    /// * `size` - The new window size in physical pixels
    pub fn resize_surface(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.surface_config.width = size.width;
        self.surface_config.height = size.height;
        self.surface.configure(&self.device, &self.surface_config);

        self.camera_state.resize(size.width, size.height);
        self.pipeline_manager.resize(&self.device, &self.surface_config);
    }

    /// Logs GPU buffer memory analytics.
    pub fn log_buffer_analytics(&self) {
        self.buffer_state.log_analytics();
    }
}

impl RenderSink for CubeRenderer {
    fn draw(&mut self, frame: &FrameView<'_>) -> Result<(), EngineError> {
        self.camera_state.update(frame.observer, &mut self.buffer_state)?;

        build_cube_instances(frame.instructions, frame.max_height, &mut self.instances);
        self.buffer_state.write_or_grow(
            INSTANCE_BUFFER_NAME,
            bytemuck::cast_slice(&self.instances),
            wgpu::BufferUsages::VERTEX,
        );

        let surface_texture = match self.surface.get_current_texture() {
            Ok(surface_texture) => surface_texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(EngineError::Graphics(String::from(
                    "out of memory while acquiring the surface texture",
                )));
            }
            Err(err) => {
                warn!("Skipping frame: {}", err);
                return Ok(());
            }
        };

        let view = surface_texture.texture.create_view(&Default::default());
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Cube Encoder"),
        });
        self.pipeline_manager
            .render(&mut encoder, &view, &self.buffer_state, self.instances.len() as u32)?;

        self.queue.submit([encoder.finish()]);
        surface_texture.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::visibility::DetailLevel;

    fn instruction(x: i32, z: i32, height: u32, detail: DetailLevel) -> DrawInstruction {
        DrawInstruction { x, z, height, detail }
    }

    #[test]
    fn full_columns_expand_to_every_block() {
        let mut instances = Vec::new();
        build_cube_instances(&[instruction(3, 7, 4, DetailLevel::FullColumn)], 8, &mut instances);
        let centers: Vec<_> = instances.iter().map(|i| i.center).collect();
        assert_eq!(
            centers,
            vec![[3.0, 0.0, 7.0], [3.0, 1.0, 7.0], [3.0, 2.0, 7.0], [3.0, 3.0, 7.0]]
        );
    }

    #[test]
    fn top_only_columns_expand_to_one_block() {
        let mut instances = Vec::new();
        build_cube_instances(&[instruction(1, 2, 9, DetailLevel::TopBlockOnly)], 9, &mut instances);
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].center, [1.0, 8.0, 2.0]);
        assert_eq!(instances[0].color, shading::to_linear(shading::color_for(8, 9)));
    }

    #[test]
    fn instance_count_matches_cube_count() {
        let instructions = [
            instruction(0, 0, 5, DetailLevel::FullColumn),
            instruction(1, 0, 3, DetailLevel::TopBlockOnly),
            instruction(2, 0, 1, DetailLevel::FullColumn),
        ];
        let mut instances = vec![CubeInstance {
            center: [0.0; 3],
            color: [0.0; 4],
        }];
        build_cube_instances(&instructions, 5, &mut instances);
        let expected: u32 = instructions.iter().map(DrawInstruction::cube_count).sum();
        assert_eq!(instances.len() as u32, expected);
    }
}
