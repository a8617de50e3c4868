//! Glyph mesh — the triangle representation the encode pass rasterizes.
//!
//! A glyph outline becomes a triangle list of two kinds:
//!
//! 1. **Fan triangles** `(anchor, a, b)` for every outline segment,
//!    where the anchor is the first point of the first contour.
//!    Overlapping fans from opposite windings cancel through the
//!    encode pass's front/back-face weighting, reconstructing the
//!    nonzero fill rule without any explicit polygon fill step.
//! 2. **Control triangles** for quadratic segments, carrying the
//!    Loop–Blinn implicit coordinates `(0,0) (½,0) (1,1)`. The
//!    fragment shader discards where `u² − v > 0`, trimming the
//!    triangle to the curve's interior side.
//!
//! Fill triangles carry the constant coordinate `(0, 1)`, which the
//! discard test always passes. All coordinates are in em units; the
//! glyph transform chain does the rest.

use bytemuck::{Pod, Zeroable};

/// Quadratic implicit coordinate that always survives the discard test.
const SOLID: [f32; 2] = [0.0, 1.0];

/// One mesh vertex: position plus implicit quadratic coordinate,
/// interleaved exactly as the encode pass's `vec4` attribute expects.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub x: f32,
    pub y: f32,
    pub u: f32,
    pub v: f32,
}

impl MeshVertex {
    fn new(p: [f32; 2], uv: [f32; 2]) -> Self {
        Self {
            x: p[0],
            y: p[1],
            u: uv[0],
            v: uv[1],
        }
    }
}

/// A glyph ready for the encode pass.
///
/// Borrowed by the renderer for one draw call; never mutated after
/// construction.
#[derive(Clone, Debug)]
pub struct GlyphMesh {
    /// Triangle list in em units.
    pub vertices: Vec<MeshVertex>,
    /// Horizontal advance, pre-scaled to window pixel units.
    pub advance_x: f32,
}

impl GlyphMesh {
    /// Whitespace and other markless glyphs: advance only, no draw.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }
}

/// Incremental outline-sink that triangulates a glyph contour walk.
#[derive(Debug, Default)]
pub struct MeshBuilder {
    vertices: Vec<MeshVertex>,
    /// Fan anchor: first point of the first contour.
    anchor: Option<[f32; 2]>,
    contour_start: [f32; 2],
    cursor: [f32; 2],
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, p: [f32; 2]) {
        if self.anchor.is_none() {
            self.anchor = Some(p);
        }
        self.contour_start = p;
        self.cursor = p;
    }

    pub fn line_to(&mut self, p: [f32; 2]) {
        self.push_fan(self.cursor, p);
        self.cursor = p;
    }

    /// Quadratic segment: chord fan plus the Loop–Blinn control
    /// triangle that bends the chord into the curve.
    pub fn quad_to(&mut self, ctrl: [f32; 2], p: [f32; 2]) {
        let from = self.cursor;
        self.push_fan(from, p);
        self.vertices.push(MeshVertex::new(from, [0.0, 0.0]));
        self.vertices.push(MeshVertex::new(ctrl, [0.5, 0.0]));
        self.vertices.push(MeshVertex::new(p, [1.0, 1.0]));
        self.cursor = p;
    }

    /// Cubic segment, approximated by two quadratics via midpoint
    /// subdivision. Glyph cubics are tame enough at text sizes that
    /// one split stays below a sub-texel error.
    pub fn cubic_to(&mut self, c1: [f32; 2], c2: [f32; 2], p: [f32; 2]) {
        let from = self.cursor;
        let q1 = lerp(from, c1, 0.75);
        let q2 = lerp(p, c2, 0.75);
        let mid = lerp(q1, q2, 0.5);
        self.quad_to(q1, mid);
        self.quad_to(q2, p);
    }

    /// Close the current contour with an implicit line back to its
    /// starting point.
    pub fn close(&mut self) {
        if self.cursor != self.contour_start {
            self.line_to(self.contour_start);
        }
    }

    /// Finish the walk and hand back the triangle list.
    pub fn build(self) -> Vec<MeshVertex> {
        self.vertices
    }

    fn push_fan(&mut self, a: [f32; 2], b: [f32; 2]) {
        let Some(anchor) = self.anchor else { return };
        // Segments touching the anchor span zero area.
        if a == anchor || b == anchor || a == b {
            return;
        }
        self.vertices.push(MeshVertex::new(anchor, SOLID));
        self.vertices.push(MeshVertex::new(a, SOLID));
        self.vertices.push(MeshVertex::new(b, SOLID));
    }
}

fn lerp(a: [f32; 2], b: [f32; 2], t: f32) -> [f32; 2] {
    [a[0] + (b[0] - a[0]) * t, a[1] + (b[1] - a[1]) * t]
}

// ===================================================================
// Tests
// ===================================================================
