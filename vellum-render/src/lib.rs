//! # vellum-render
//!
//! GPU backend for the vellum text renderer, built on `wgpu`. Glyph
//! outlines are rasterized with two passes and no per-glyph distance
//! field:
//!
//! ```text
//!  GlyphSource (vellum-text)
//!       │ triangle mesh + advance
//!       ▼
//!  TextBuffer.add_text()          ◀── pen walk, transform chain
//!       │ 6 jittered additive draws per glyph
//!       ▼
//!  packed coverage texture        ◀── nibbles: front/back winding
//!       │
//!       ▼
//!  TextBuffer.decode()            ◀── mod-16 split, subpixel filter
//!       │
//!       ▼
//!  destination texture / surface
//! ```
//!
//! ## Crate modules
//!
//! - [`context`] — GPU device/queue/surface initialisation
//! - [`vertex`] — vertex, instance, and uniform data types
//! - [`pipelines`] — encode (accumulate) and decode (resolve) pipelines
//! - [`text_buffer`] — coverage target ownership and the pen/layout walk

pub mod context;
pub mod pipelines;
pub mod text_buffer;
pub mod vertex;

// Re-exports for convenience
pub use context::{GpuContext, GpuError};
pub use text_buffer::{RenderError, TextBuffer, COVERAGE_HEIGHT, COVERAGE_WIDTH};
pub use vertex::{DecodeInstance, EncodeUniforms, QuadVertex};
