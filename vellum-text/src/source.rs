//! The `GlyphSource` capability trait — what the renderer needs from a
//! font backend, and nothing more.
//!
//! Backends are selected at construction time; the renderer only ever
//! sees the trait. A codepoint with no outline is `Ok(None)` and the
//! layout driver treats it as advance-only, so "missing glyph" never
//! aborts a text run.

use std::sync::Arc;

use thiserror::Error;

use crate::mesh::GlyphMesh;

#[derive(Error, Debug)]
pub enum FontError {
    #[error("failed to load font: {0}")]
    Loading(#[from] font_kit::error::FontLoadingError),
    #[error("no font matched the requested family: {0}")]
    Selection(#[from] font_kit::error::SelectionError),
    #[error("failed to load glyph outline: {0}")]
    Glyph(#[from] font_kit::error::GlyphLoadingError),
    /// Escape hatch for backends not built on font-kit.
    #[error("font backend failure: {0}")]
    Backend(String),
}

/// A font backend capable of producing glyph meshes and vertical
/// metrics.
///
/// All metrics are in em units (descender negative below the
/// baseline); `GlyphMesh::advance_x` is pre-scaled to window pixels by
/// the backend.
pub trait GlyphSource {
    /// Mesh for one codepoint, or `None` when the font has no glyph
    /// for it. `&mut self` lets implementations cache built meshes.
    fn load_glyph(&mut self, ch: char) -> Result<Option<Arc<GlyphMesh>>, FontError>;

    fn ascender(&self) -> f32;

    fn descender(&self) -> f32;

    /// Point size this source was configured for.
    fn pt_size(&self) -> f32;

    /// Line height in window pixels for the given viewport mapping.
    fn line_height(&self, window_height: f32, pt_height: f32) -> f32 {
        (self.ascender() - self.descender()) * window_height * self.pt_size() / pt_height
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Fixed-metric source for exercising the trait's defaults.
    struct StubSource;

    impl GlyphSource for StubSource {
        fn load_glyph(&mut self, _ch: char) -> Result<Option<Arc<GlyphMesh>>, FontError> {
            Ok(None)
        }

        fn ascender(&self) -> f32 {
            0.8
        }

        fn descender(&self) -> f32 {
            -0.2
        }

        fn pt_size(&self) -> f32 {
            12.0
        }
    }

    #[test]
    fn test_line_height_formula() {
        let src = StubSource;
        // (0.8 − (−0.2)) · 440 · 12 / 330 = 16
        let lh = src.line_height(440.0, 330.0);
        assert!((lh - 16.0).abs() < 1e-4, "line height = {lh}");
    }

    #[test]
    fn test_missing_glyph_is_none_not_error() {
        let mut src = StubSource;
        assert!(src.load_glyph('\u{0}').unwrap().is_none());
    }
}
