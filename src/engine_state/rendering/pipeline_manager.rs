//! Manages the cube render pipeline and the resources bound to it.
//!
//! # Resources
//!
//! - One render pipeline drawing instanced unit cubes with depth testing
//! - The camera bind group (group 0) wrapping the camera uniform buffer
//! - The depth texture, recreated whenever the surface is resized
//!
//! The pass clears to sky blue and issues a single instanced draw covering
//! every block selected this frame.

use wgpu::{BindGroup, CommandEncoder, Device, RenderPipeline, SurfaceConfiguration, TextureView};

use super::{
    shading, texture,
    vertex::{CubeInstance, CubeVertex, CUBE_INDICES},
    CUBE_INDEX_BUFFER_NAME, CUBE_VERTEX_BUFFER_NAME, INSTANCE_BUFFER_NAME,
};
use crate::engine_state::{
    buffer_state::BufferState, camera_state::CAMERA_BUFFER_NAME, error::BufferError,
};

const SHADER_SOURCE: &str = include_str!("shaders/cube.wgsl");

/// Owns the render pipeline and per-pass resources.
pub struct PipelineManager {
    render_pipeline: RenderPipeline,
    camera_bind_group: BindGroup,
    depth_texture: texture::Texture,
}

impl PipelineManager {
    /// Creates the pipeline, camera bind group and depth texture.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `config` - Surface configuration containing size and format
    /// * `buffer_state` - Registry holding the camera uniform buffer
    ///
    /// # Errors
    /// Fails if the camera buffer has not been created yet.
    pub fn new(
        device: &Device,
        config: &SurfaceConfiguration,
        buffer_state: &BufferState,
    ) -> Result<Self, BufferError> {
        let camera_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("camera_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera_bind_group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer_state.get_entire_binding(CAMERA_BUFFER_NAME)?,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Cube Render Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Cube Shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER_SOURCE.into()),
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Cube Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[CubeVertex::desc(), CubeInstance::desc()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: texture::Texture::DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let depth_texture = texture::Texture::create_depth_texture(device, config, "DEPTH TEXTURE");

        Ok(Self {
            render_pipeline,
            camera_bind_group,
            depth_texture,
        })
    }

    /// Records the cube pass into `encoder`.
    ///
    /// # Arguments
    /// * `encoder` - Command encoder for this frame
    /// * `view` - Color target for this frame
    /// * `buffer_state` - Registry holding the cube geometry and instance stream
    /// * `instance_count` - Number of cube instances written this frame
    pub fn render(
        &self,
        encoder: &mut CommandEncoder,
        view: &TextureView,
        buffer_state: &BufferState,
        instance_count: u32,
    ) -> Result<(), BufferError> {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Cube Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(shading::clear_color()),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });

        if instance_count == 0 {
            return Ok(());
        }

        rpass.set_pipeline(&self.render_pipeline);
        rpass.set_bind_group(0, &self.camera_bind_group, &[]);
        rpass.set_vertex_buffer(0, buffer_state.get_buffer(CUBE_VERTEX_BUFFER_NAME)?.slice(..));
        rpass.set_vertex_buffer(1, buffer_state.get_buffer(INSTANCE_BUFFER_NAME)?.slice(..));
        rpass.set_index_buffer(
            buffer_state.get_buffer(CUBE_INDEX_BUFFER_NAME)?.slice(..),
            wgpu::IndexFormat::Uint16,
        );
        rpass.draw_indexed(0..CUBE_INDICES.len() as u32, 0, 0..instance_count);
        Ok(())
    }

    /// Recreates the depth texture for a resized surface.
    pub fn resize(&mut self, device: &Device, config: &SurfaceConfiguration) {
        self.depth_texture = texture::Texture::create_depth_texture(device, config, "DEPTH TEXTURE");
    }
}
