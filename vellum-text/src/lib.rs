//! # vellum-text
//!
//! Font backend for the vellum renderer. Converts glyph outlines into
//! the triangle meshes the coverage-accumulation encode pass consumes.
//!
//! ## Architecture
//!
//! ```text
//! FontKitSource (font-kit Font + LRU mesh cache)
//!     │
//!     ▼
//! load_glyph(char) ──► Arc<GlyphMesh> { Vec<MeshVertex>, advance_x }
//!     │
//!     ▼
//! MeshBuilder (outline sink) ──► fan + Loop–Blinn control triangles
//! ```
//!
//! - **`mesh`** — mesh vertex format and the outline → triangle builder.
//! - **`source`** — the `GlyphSource` capability trait and `FontError`.
//! - **`fontkit`** — font-kit-backed `GlyphSource` implementation.

pub mod fontkit;
pub mod mesh;
pub mod source;

// Re-exports for ergonomic use.
pub use fontkit::FontKitSource;
pub use mesh::{GlyphMesh, MeshBuilder, MeshVertex};
pub use source::{FontError, GlyphSource};
