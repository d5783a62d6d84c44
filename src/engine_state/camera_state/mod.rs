//! # Camera State Management
//!
//! This module connects the observer to the GPU:
//! - `camera::Observer`: pose, vertical velocity and the per-frame physics step
//! - `camera::Projection`: perspective settings tracking the surface size
//! - `camera::CameraUniform`: view-projection matrix uploaded every frame
//!
//! The observer itself lives in the session and never touches the GPU;
//! `CameraState` only mirrors its pose into the camera uniform buffer.

use cgmath::Deg;

use super::{buffer_state::BufferState, error::BufferError};

pub mod camera;

/// Name of the GPU buffer used for camera uniform data
pub const CAMERA_BUFFER_NAME: &str = "camera_buffer";

/// Vertical field of view of the rendered view.
pub const FIELD_OF_VIEW: Deg<f32> = Deg(60.0);
/// Near clipping plane distance.
pub const Z_NEAR: f32 = 0.1;
/// Far clipping plane distance, comfortably past the largest cull radius.
pub const Z_FAR: f32 = 500.0;

/// GPU-side camera resources.
///
/// # Fields
/// - `camera_uniform`: GPU-optimized camera data for shaders
/// - `projection`: perspective settings for the current surface size
pub struct CameraState {
    /// GPU-optimized camera data for shaders
    pub camera_uniform: camera::CameraUniform,
    /// Perspective projection for the current surface size
    pub projection: camera::Projection,
}

impl CameraState {
    /// Creates the camera uniform buffer and the projection for a surface.
    ///
    /// # Arguments
    /// * `buffer_state` - Registry the camera buffer is created in
    /// * `width` - Surface width in pixels
    /// * `height` - Surface height in pixels
    pub fn new(buffer_state: &mut BufferState, width: u32, height: u32) -> Self {
        let projection = camera::Projection::new(width, height, FIELD_OF_VIEW, Z_NEAR, Z_FAR);
        let camera_uniform = camera::CameraUniform::new();

        buffer_state.create_buffer_init(
            CAMERA_BUFFER_NAME,
            wgpu::util::BufferInitDescriptor {
                label: Some(CAMERA_BUFFER_NAME),
                contents: bytemuck::cast_slice(&[camera_uniform]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            },
        );

        CameraState {
            camera_uniform,
            projection,
        }
    }

    /// Updates the projection for a resized surface.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection.resize(width, height);
    }

    /// Recomputes the view-projection matrix from the observer and uploads it.
    ///
    /// # Errors
    /// Fails only if the camera buffer is missing from `buffer_state`.
    pub fn update(
        &mut self,
        observer: &camera::Observer,
        buffer_state: &mut BufferState,
    ) -> Result<(), BufferError> {
        self.camera_uniform
            .update_view_proj(observer, &self.projection);
        buffer_state.write_buffer(
            CAMERA_BUFFER_NAME,
            0,
            bytemuck::cast_slice(&[self.camera_uniform]),
        )
    }
}
