use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::RenderCtx;

// ── quad vertex ───────────────────────────────────────────────────────────

/// Interleaved quad vertex: NDC position + texture coordinate (5 floats).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl QuadVertex {
    pub const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x2  // uv
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Corners in the order top-right, bottom-right, bottom-left, top-left.
/// UV origin is bottom-left.
pub const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { position: [1.0, 1.0, 0.0], uv: [1.0, 1.0] },
    QuadVertex { position: [1.0, -1.0, 0.0], uv: [1.0, 0.0] },
    QuadVertex { position: [-1.0, -1.0, 0.0], uv: [0.0, 0.0] },
    QuadVertex { position: [-1.0, 1.0, 0.0], uv: [0.0, 1.0] },
];

/// Two triangles sharing the top-right/bottom-left diagonal.
pub const QUAD_INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

// ── renderer ──────────────────────────────────────────────────────────────

/// Static fullscreen quad.
///
/// Buffers are uploaded once at construction and never written again.
pub struct FullscreenQuad {
    vbo: wgpu::Buffer,
    ibo: wgpu::Buffer,
}

impl FullscreenQuad {
    pub fn new(ctx: &RenderCtx<'_>) -> Self {
        let vbo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("parallax quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let ibo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("parallax quad ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self { vbo, ibo }
    }

    /// Issues the 6-index draw. A pipeline must already be set on `rpass`.
    pub fn draw(&self, rpass: &mut wgpu::RenderPass<'_>) {
        rpass.set_vertex_buffer(0, self.vbo.slice(..));
        rpass.set_index_buffer(self.ibo.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
    }
}
