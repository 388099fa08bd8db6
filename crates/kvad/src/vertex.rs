//! Per-corner data sent to the GPU.
//!
//! Positions are in world space — the CPU applies each quad's affine
//! transform before upload, so the shader only multiplies by the camera
//! view-projection. Quads with different transforms but the same texture can
//! therefore share one draw call.
//!
//! `#[repr(C)]` plus bytemuck's `Pod`/`Zeroable` let us cast
//! `&[BatchVertex]` straight to bytes for `queue.write_buffer` without
//! copies. Layout: position at offset 0, uv at 12, color at 20, stride 36.

use bytemuck::{Pod, Zeroable};

/// One corner of a quad: world-space position (z always 0), texture
/// coordinate, and tint color.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct BatchVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl BatchVertex {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<BatchVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // uv
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x2,
            },
            // color
            wgpu::VertexAttribute {
                offset: 20,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x4,
            },
        ],
    };
}

/// The combined view × projection matrix, uploaded once per flush.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(crate) struct CameraUniform {
    pub view_projection: [[f32; 4]; 4],
}
