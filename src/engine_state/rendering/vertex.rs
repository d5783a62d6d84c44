//! Vertex and instance layouts for cube rendering.
//!
//! Every drawn block is one instance of a shared unit cube. The cube geometry
//! is uploaded once; per-frame data is limited to one [`CubeInstance`] per block.

/// A corner of the unit cube.
///
/// # Memory Layout
/// - Position: [f32; 3] (12 bytes)
/// - Shade: f32 (4 bytes)
///
/// Total size: 16 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CubeVertex {
    /// Offset from the cube center, each component ±0.5
    position: [f32; 3],
    /// Brightness factor of the face this corner belongs to
    shade: f32,
}

impl CubeVertex {
    const fn new(position: [f32; 3], shade: f32) -> Self {
        Self { position, shade }
    }

    /// Returns the vertex buffer layout for slot 0.
    ///
    /// # Shader Attributes
    /// - `location = 0`: position (vec3<f32>)
    /// - `location = 1`: shade (f32)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CubeVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32,
                },
            ],
        }
    }
}

/// One drawn block.
///
/// # Memory Layout
/// - Center: [f32; 3] (12 bytes)
/// - Color: [f32; 4] linear RGBA (16 bytes)
///
/// Total size: 28 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CubeInstance {
    /// Block center in world space
    pub center: [f32; 3],
    /// Linear RGBA color
    pub color: [f32; 4],
}

impl CubeInstance {
    /// Returns the vertex buffer layout for slot 1.
    ///
    /// # Shader Attributes
    /// - `location = 2`: center (vec3<f32>)
    /// - `location = 3`: color (vec4<f32>)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CubeInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

const TOP: f32 = 1.0;
const SIDE_X: f32 = 0.8;
const SIDE_Z: f32 = 0.7;
const BOTTOM: f32 = 0.5;

/// Unit cube corners, four per face, faces in +Y, -Y, +X, -X, +Z, -Z order.
#[rustfmt::skip]
pub const CUBE_VERTICES: [CubeVertex; 24] = [
    // +Y
    CubeVertex::new([-0.5, 0.5, -0.5], TOP),
    CubeVertex::new([-0.5, 0.5, 0.5], TOP),
    CubeVertex::new([0.5, 0.5, 0.5], TOP),
    CubeVertex::new([0.5, 0.5, -0.5], TOP),
    // -Y
    CubeVertex::new([-0.5, -0.5, -0.5], BOTTOM),
    CubeVertex::new([0.5, -0.5, -0.5], BOTTOM),
    CubeVertex::new([0.5, -0.5, 0.5], BOTTOM),
    CubeVertex::new([-0.5, -0.5, 0.5], BOTTOM),
    // +X
    CubeVertex::new([0.5, -0.5, -0.5], SIDE_X),
    CubeVertex::new([0.5, 0.5, -0.5], SIDE_X),
    CubeVertex::new([0.5, 0.5, 0.5], SIDE_X),
    CubeVertex::new([0.5, -0.5, 0.5], SIDE_X),
    // -X
    CubeVertex::new([-0.5, -0.5, 0.5], SIDE_X),
    CubeVertex::new([-0.5, 0.5, 0.5], SIDE_X),
    CubeVertex::new([-0.5, 0.5, -0.5], SIDE_X),
    CubeVertex::new([-0.5, -0.5, -0.5], SIDE_X),
    // +Z
    CubeVertex::new([0.5, -0.5, 0.5], SIDE_Z),
    CubeVertex::new([0.5, 0.5, 0.5], SIDE_Z),
    CubeVertex::new([-0.5, 0.5, 0.5], SIDE_Z),
    CubeVertex::new([-0.5, -0.5, 0.5], SIDE_Z),
    // -Z
    CubeVertex::new([-0.5, -0.5, -0.5], SIDE_Z),
    CubeVertex::new([-0.5, 0.5, -0.5], SIDE_Z),
    CubeVertex::new([0.5, 0.5, -0.5], SIDE_Z),
    CubeVertex::new([0.5, -0.5, -0.5], SIDE_Z),
];

/// Two triangles per face, counter-clockwise when viewed from outside.
#[rustfmt::skip]
pub const CUBE_INDICES: [u16; 36] = [
    0, 1, 2, 0, 2, 3,
    4, 5, 6, 4, 6, 7,
    8, 9, 10, 8, 10, 11,
    12, 13, 14, 12, 14, 15,
    16, 17, 18, 16, 18, 19,
    20, 21, 22, 20, 22, 23,
];

#[cfg(test)]
mod tests {
    use cgmath::{InnerSpace, Vector3};

    use super::*;

    fn corner(index: u16) -> Vector3<f32> {
        CUBE_VERTICES[index as usize].position.into()
    }

    #[test]
    fn layouts_match_struct_sizes() {
        assert_eq!(std::mem::size_of::<CubeVertex>(), 16);
        assert_eq!(std::mem::size_of::<CubeInstance>(), 28);
    }

    #[test]
    fn every_triangle_faces_outward() {
        for triangle in CUBE_INDICES.chunks(3) {
            let (a, b, c) = (corner(triangle[0]), corner(triangle[1]), corner(triangle[2]));
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid) > 0.0, "triangle {triangle:?} faces inward");
        }
    }
}
