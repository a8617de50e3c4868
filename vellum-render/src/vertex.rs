//! GPU vertex, instance, and uniform types for the two render passes.
//!
//! All types derive `bytemuck::Pod` + `Zeroable` for zero-copy upload.

use bytemuck::{Pod, Zeroable};
use wgpu::{BufferAddress, VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

use vellum_core::Mat4;
use vellum_text::MeshVertex;

// ───────────────────────────────────────────────────────────────────
// Encode pass
// ───────────────────────────────────────────────────────────────────

/// Vertex layout of the glyph mesh: one `vec4` per vertex, xy holding
/// the em-unit position and zw the implicit quadratic coordinate.
pub fn mesh_vertex_layout() -> VertexBufferLayout<'static> {
    static ATTRS: &[VertexAttribute] = &[
        // location(0) = position + quadratic coord
        VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: VertexFormat::Float32x4,
        },
    ];
    VertexBufferLayout {
        array_stride: std::mem::size_of::<MeshVertex>() as BufferAddress,
        step_mode: VertexStepMode::Vertex,
        attributes: ATTRS,
    }
}

/// Per-jitter-sample uniforms: the jittered model transform plus the
/// channel mask weight. One 256-byte-aligned slot per sample; the
/// encode pass binds them with dynamic offsets.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct EncodeUniforms {
    /// Column-major model transform for this jitter sample.
    pub transform: Mat4,
    /// Channel seed mask: R, G, or B (alpha unused).
    pub weight: [f32; 4],
}

// ───────────────────────────────────────────────────────────────────
// Decode pass
// ───────────────────────────────────────────────────────────────────

/// A single vertex of the unit quad the decode rect is stretched over.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct QuadVertex {
    /// Position in [0, 1] space.
    pub position: [f32; 2],
}

impl QuadVertex {
    pub const VERTICES: [QuadVertex; 4] = [
        QuadVertex { position: [0.0, 0.0] },
        QuadVertex { position: [1.0, 0.0] },
        QuadVertex { position: [0.0, 1.0] },
        QuadVertex { position: [1.0, 1.0] },
    ];

    pub const INDICES: [u16; 6] = [0, 1, 2, 2, 1, 3];

    pub fn layout() -> VertexBufferLayout<'static> {
        static ATTRS: &[VertexAttribute] = &[
            // location(0) = position
            VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: VertexFormat::Float32x2,
            },
        ];
        VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as BufferAddress,
            step_mode: VertexStepMode::Vertex,
            attributes: ATTRS,
        }
    }
}

/// One decode draw: a destination rect in normalized target
/// coordinates plus the foreground color applied to the coverage.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct DecodeInstance {
    /// `[x_min, y_min, x_max, y_max]`, each in [0, 1].
    pub rect: [f32; 4],
    /// RGBA foreground, each channel in [0.0, 1.0].
    pub color: [f32; 4],
}

impl DecodeInstance {
    pub fn new(rect: [f32; 4], color: [f32; 4]) -> Self {
        Self { rect, color }
    }

    /// Cover the whole destination.
    pub fn full(color: [f32; 4]) -> Self {
        Self::new([0.0, 0.0, 1.0, 1.0], color)
    }

    pub fn layout() -> VertexBufferLayout<'static> {
        static ATTRS: &[VertexAttribute] = &[
            // location(1) = rect
            VertexAttribute {
                offset: 0,
                shader_location: 1,
                format: VertexFormat::Float32x4,
            },
            // location(2) = color
            VertexAttribute {
                offset: 16,
                shader_location: 2,
                format: VertexFormat::Float32x4,
            },
        ];
        VertexBufferLayout {
            array_stride: std::mem::size_of::<DecodeInstance>() as BufferAddress,
            step_mode: VertexStepMode::Instance,
            attributes: ATTRS,
        }
    }
}

/// Uniform for the decode shader's output mode.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct DecodeParams {
    /// 1.0 → seed pass (`1 − coverage`), 0.0 → color pass.
    pub first_round: f32,
    pub _pad: [f32; 3],
}

impl DecodeParams {
    pub fn new(first_round: bool) -> Self {
        Self {
            first_round: if first_round { 1.0 } else { 0.0 },
            _pad: [0.0; 3],
        }
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_vertex_layout_matches_struct() {
        let layout = mesh_vertex_layout();
        assert_eq!(layout.array_stride, 16);
        assert_eq!(layout.attributes.len(), 1);
        assert_eq!(layout.attributes[0].shader_location, 0);
        assert_eq!(layout.step_mode, VertexStepMode::Vertex);
    }

    #[test]
    fn test_encode_uniforms_size_fits_slot() {
        // mat4 + vec4; must fit within one 256-byte dynamic slot.
        assert_eq!(std::mem::size_of::<EncodeUniforms>(), 80);
    }

    #[test]
    fn test_quad_vertex_geometry() {
        assert_eq!(std::mem::size_of::<QuadVertex>(), 8);
        assert_eq!(QuadVertex::VERTICES.len(), 4);
        assert_eq!(QuadVertex::INDICES.len(), 6);
    }

    #[test]
    fn test_decode_instance_size_and_locations() {
        assert_eq!(std::mem::size_of::<DecodeInstance>(), 32);
        let layout = DecodeInstance::layout();
        assert_eq!(layout.attributes.len(), 2);
        assert_eq!(layout.attributes[0].shader_location, 1); // rect
        assert_eq!(layout.attributes[1].shader_location, 2); // color
        assert_eq!(layout.step_mode, VertexStepMode::Instance);
    }

    #[test]
    fn test_decode_instance_full_covers_unit_rect() {
        let inst = DecodeInstance::full([1.0, 0.5, 0.0, 1.0]);
        assert_eq!(inst.rect, [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(inst.color, [1.0, 0.5, 0.0, 1.0]);
    }

    #[test]
    fn test_decode_params_flag() {
        assert_eq!(DecodeParams::new(true).first_round, 1.0);
        assert_eq!(DecodeParams::new(false).first_round, 0.0);
    }

    #[test]
    fn test_decode_instance_bytemuck_round_trip() {
        let inst = DecodeInstance::new([0.1, 0.2, 0.9, 0.8], [1.0, 0.0, 0.0, 1.0]);
        let bytes = bytemuck::bytes_of(&inst);
        assert_eq!(bytes.len(), 32);
        let back: &DecodeInstance = bytemuck::from_bytes(bytes);
        assert_eq!(back.rect, inst.rect);
        assert_eq!(back.color, inst.color);
    }
}
