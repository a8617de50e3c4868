//! # vellum-core
//!
//! GPU-independent model for the vellum text renderer: viewport and pen
//! state, the jitter sample pattern, the glyph transform chain, and a
//! software reference of the coverage packing arithmetic used by the
//! encode/decode shaders.
//!
//! ## Architecture
//!
//! ```text
//!  Viewport (points ↔ pixels ↔ NDC)
//!      │
//!      ▼
//!  transform::glyph_transform(pen, pt_size, descender)
//!      │
//!      ▼
//!  transform::jittered(…, JITTER_PATTERN[i])   ◀── one matrix per sample
//!      │
//!      ▼
//!  encode pass (vellum-render) ──► packed texture ──► coverage::decode_alpha
//! ```
//!
//! ## Crate modules
//!
//! - [`viewport`] — point/pixel/window dimensions supplied at buffer creation
//! - [`pen`] — cursor and styling state for a text run
//! - [`jitter`] — the fixed 6-sample sub-pixel offset pattern
//! - [`coverage`] — fixed-point reference of the shader packing math
//! - [`transform`] — column-major 4×4 helpers and the glyph transform chain

pub mod coverage;
pub mod jitter;
pub mod pen;
pub mod transform;
pub mod viewport;

// Re-exports for convenience
pub use jitter::JITTER_PATTERN;
pub use pen::{Markup, Pen};
pub use transform::Mat4;
pub use viewport::Viewport;
