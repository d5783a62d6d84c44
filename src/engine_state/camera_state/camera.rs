//! # Camera Implementation
//!
//! This module contains the observer and the camera math built on it:
//! - `Observer`: first-person pose plus vertical velocity, advanced once per frame
//! - `Projection`: perspective projection settings
//! - `CameraUniform`: packed view-projection matrix for the GPU
//!
//! ## Conventions
//! - Y is up, yaw rotates around Y and pitch around the observer's right axis
//! - `forward = (cos(pitch)·sin(yaw), sin(pitch), cos(pitch)·cos(yaw))`, so
//!   yaw = 0 faces +Z and yaw = π faces -Z
//! - `right = normalize(cross(forward, up))`, which is -X when facing +Z
//!
//! ## Grounded vs. airborne
//! There is no stored mode flag. Each step reports whether the ground clamp
//! engaged, and only a grounded step may start a jump.

use cgmath::*;
use std::f32::consts::FRAC_PI_2;

use crate::engine_state::{
    config::PhysicsConfig, voxels::world::VoxelStore, PlayerAction,
};

/// Transformation matrix to convert from OpenGL's coordinate system to WGPU's.
///
/// WGPU's NDC depth range is [0, 1] instead of OpenGL's [-1, 1]; this matrix
/// scales and translates Z accordingly.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,  // Scale Z from [-1,1] to [-0.5,0.5]
    0.0, 0.0, 0.5, 1.0,  // Translate Z from [-0.5,0.5] to [0,1]
);

/// Movement vectors shorter than this are treated as "no input".
const MIN_MOVE_LENGTH: f32 = 1e-4;

/// Orthonormal look directions derived from yaw and pitch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookBasis {
    /// Unit view direction
    pub forward: Vector3<f32>,
    /// Unit vector to the observer's right, always horizontal
    pub right: Vector3<f32>,
    /// Unit view direction projected onto the ground plane
    pub planar_forward: Vector3<f32>,
}

impl LookBasis {
    /// Computes the basis for the given orientation.
    pub fn new(yaw: Rad<f32>, pitch: Rad<f32>) -> Self {
        let (yaw_sin, yaw_cos) = yaw.0.sin_cos();
        let (pitch_sin, pitch_cos) = pitch.0.sin_cos();
        Self {
            forward: Vector3::new(pitch_cos * yaw_sin, pitch_sin, pitch_cos * yaw_cos).normalize(),
            // cross(forward, up) reduces to this for any |pitch| < π/2
            right: Vector3::new(-yaw_cos, 0.0, yaw_sin),
            planar_forward: Vector3::new(yaw_sin, 0.0, yaw_cos),
        }
    }
}

/// Position and orientation of an observer, as set or reported by a host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Eye position in world space
    pub position: Point3<f32>,
    /// Horizontal rotation around Y
    pub yaw: Rad<f32>,
    /// Vertical rotation, positive looks up
    pub pitch: Rad<f32>,
}

/// Result of one physics step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// Whether the ground clamp engaged this frame
    pub grounded: bool,
    /// Point one unit ahead of the eye, for orienting the view matrix
    pub look_target: Point3<f32>,
}

/// A first-person observer with simple gravity physics.
///
/// # Invariant
/// After every [`Observer::step`], `position.y >= ground + eye_height` where
/// `ground` is the height of the column under `position.xz`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observer {
    /// Eye position in world space
    pub position: Point3<f32>,
    /// Horizontal rotation around Y in radians
    pub yaw: Rad<f32>,
    /// Vertical rotation in radians
    pub pitch: Rad<f32>,
    /// Vertical velocity in blocks per second
    pub velocity_y: f32,
}

impl Observer {
    /// Creates a resting observer with the specified position and orientation.
    ///
    /// # Example
    /// ```rust
    /// use cgmath::{Point3, Rad};
    /// use voxel_lod::Observer;
    ///
    /// let observer = Observer::new(
    ///     Point3::new(32.0, 30.0, 32.0),
    ///     Rad(std::f32::consts::PI),   // Facing -Z
    ///     Rad(-0.15),                  // Slightly downward
    /// );
    /// ```
    pub fn new<V: Into<Point3<f32>>, Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(
        position: V,
        yaw: Y,
        pitch: P,
    ) -> Self {
        let pitch: Rad<f32> = pitch.into();
        Self {
            position: position.into(),
            yaw: yaw.into(),
            pitch: Rad(pitch.0.clamp(-FRAC_PI_2 + 1e-3, FRAC_PI_2 - 1e-3)),
            velocity_y: 0.0,
        }
    }

    /// Current pose.
    pub fn pose(&self) -> Pose {
        Pose {
            position: self.position,
            yaw: self.yaw,
            pitch: self.pitch,
        }
    }

    /// Teleports the observer and stops any vertical motion. The ground clamp
    /// is reapplied on the next step.
    pub fn set_pose(&mut self, pose: Pose) {
        *self = Self::new(pose.position, pose.yaw, pose.pitch);
    }

    /// Look directions for the current orientation.
    pub fn basis(&self) -> LookBasis {
        LookBasis::new(self.yaw, self.pitch)
    }

    /// Unit view direction.
    pub fn forward(&self) -> Vector3<f32> {
        self.basis().forward
    }

    /// Point one unit ahead of the eye.
    pub fn look_target(&self) -> Point3<f32> {
        self.position + self.forward()
    }

    /// Advances the observer by `dt` seconds.
    ///
    /// In order: mouse look, horizontal movement along the ground plane,
    /// gravity integration, ground clamp, and an edge-triggered jump when the
    /// clamp engaged this frame.
    pub fn step(
        &mut self,
        action: &PlayerAction,
        dt: f32,
        world: &VoxelStore,
        physics: &PhysicsConfig,
    ) -> StepOutcome {
        // Look
        if action.look_active {
            let (delta_x, delta_y) = action.mouse_delta;
            self.yaw -= Rad(delta_x * physics.mouse_sensitivity);
            self.pitch -= Rad(delta_y * physics.mouse_sensitivity);
            self.pitch = Rad(self.pitch.0.clamp(-physics.pitch_limit, physics.pitch_limit));
        }

        let basis = self.basis();

        // Move in the ground plane so looking up or down never changes speed
        let mut movement = Vector3::zero();
        if action.move_forward {
            movement += basis.planar_forward;
        }
        if action.move_backward {
            movement -= basis.planar_forward;
        }
        if action.move_right {
            movement += basis.right;
        }
        if action.move_left {
            movement -= basis.right;
        }
        if movement.magnitude() > MIN_MOVE_LENGTH {
            let mut speed = physics.move_speed;
            if action.sprint {
                speed *= physics.sprint_multiplier;
            }
            self.position += movement.normalize() * speed * dt;
        }

        // Gravity
        self.velocity_y += physics.gravity * dt;
        self.position.y += self.velocity_y * dt;

        // Ground clamp
        let ground = world.ground_height(self.position.x, self.position.z) as f32;
        let min_y = ground + physics.eye_height;
        let grounded = self.position.y <= min_y;
        if grounded {
            self.position.y = min_y;
            self.velocity_y = 0.0;
        }

        if grounded && action.jump {
            self.velocity_y = physics.jump_speed;
        }

        StepOutcome {
            grounded,
            look_target: self.position + basis.forward,
        }
    }
}

/// Perspective projection settings.
#[derive(Debug)]
pub struct Projection {
    /// Aspect ratio (width / height)
    aspect: f32,
    /// Vertical field of view in radians
    fovy: Rad<f32>,
    /// Near clipping plane distance
    znear: f32,
    /// Far clipping plane distance
    zfar: f32,
}

impl Projection {
    /// Creates a new projection for a viewport of the given pixel size.
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    /// Updates the aspect ratio for viewport resizing.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// Projection matrix in WGPU clip space.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// GPU-friendly representation of camera data for shaders.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    // cgmath matrices are not Pod, so the matrix is stored as a plain array
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    /// Creates a uniform holding the identity matrix.
    pub fn new() -> Self {
        Self {
            view_proj: Matrix4::identity().into(),
        }
    }

    /// Recomputes the view-projection matrix from the observer's eye and view direction.
    pub fn update_view_proj(&mut self, observer: &Observer, projection: &Projection) {
        let view = Matrix4::look_to_rh(observer.position, observer.forward(), Vector3::unit_y());
        self.view_proj = (projection.calc_matrix() * view).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}
