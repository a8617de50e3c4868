//! Column-major 4×4 matrix helpers and the glyph model transform.
//!
//! The encode pass positions a glyph with
//!
//! ```text
//! T(2·pen.x/win_w, 2·pen.y/win_h) ∘ T(−1, −1)
//!     ∘ S(pt_size/pt_width, pt_size/pt_height) ∘ T(0, descender)
//! ```
//!
//! reading right to left: shift the em-unit outline down by the
//! descender, scale it to its point size relative to the viewport's
//! point extent, move the origin to the NDC corner, then place the pen.
//! Each jitter sample pre-multiplies one more translation whose offset
//! is scaled by `72/dpi` and the point-to-pixel conversion so it is a
//! true sub-texel shift in the raster grid, not a glyph-local shift.

use crate::pen::Pen;
use crate::viewport::Viewport;

/// Column-major 4×4 matrix: `m[column][row]`, ready for GPU upload.
pub type Mat4 = [[f32; 4]; 4];

pub fn identity() -> Mat4 {
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

pub fn translation(x: f32, y: f32) -> Mat4 {
    let mut m = identity();
    m[3][0] = x;
    m[3][1] = y;
    m
}

pub fn scale(x: f32, y: f32) -> Mat4 {
    let mut m = identity();
    m[0][0] = x;
    m[1][1] = y;
    m
}

/// Matrix product `a ∘ b` (apply `b` first).
pub fn mul(a: &Mat4, b: &Mat4) -> Mat4 {
    let mut out = [[0.0f32; 4]; 4];
    for (col, out_col) in out.iter_mut().enumerate() {
        for (row, v) in out_col.iter_mut().enumerate() {
            *v = (0..4).map(|k| a[k][row] * b[col][k]).sum();
        }
    }
    out
}

/// Transform a 2D point (w = 1). Used by tests and CPU-side culling.
pub fn apply(m: &Mat4, x: f32, y: f32) -> (f32, f32) {
    (
        m[0][0] * x + m[1][0] * y + m[3][0],
        m[0][1] * x + m[1][1] * y + m[3][1],
    )
}

/// Model transform placing a glyph's em-unit outline at the pen.
pub fn glyph_transform(viewport: &Viewport, pen: &Pen, pt_size: f32, descender: f32) -> Mat4 {
    let place = translation(
        2.0 * pen.x / viewport.window_width,
        2.0 * pen.y / viewport.window_height,
    );
    let to_corner = translation(-1.0, -1.0);
    let to_points = scale(
        pt_size / viewport.pt_width(),
        pt_size / viewport.pt_height(),
    );
    let baseline = translation(0.0, descender);

    mul(&mul(&mul(&place, &to_corner), &to_points), &baseline)
}

/// Pre-multiply one jitter offset onto a glyph transform.
///
/// The raw pattern entry is in texel units; dividing by `dpi/72` and
/// the viewport's point extent converts it to the NDC shift of one
/// sub-texel step.
pub fn jittered(transform: &Mat4, viewport: &Viewport, offset: [f32; 2]) -> Mat4 {
    let shift = translation(
        offset[0] * 72.0 / viewport.dpi / viewport.pt_width(),
        offset[1] * 72.0 / viewport.dpi_height / viewport.pt_height(),
    );
    mul(&shift, transform)
}

// ===================================================================
// Tests
// ===================================================================
