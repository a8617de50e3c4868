//! font-kit-backed `GlyphSource`.
//!
//! Loads a face from raw bytes or the system font source, walks glyph
//! outlines through [`MeshBuilder`], and caches built meshes in an LRU
//! map keyed by codepoint. Outline coordinates are normalized by
//! `units_per_em`, so meshes are in em units regardless of the font's
//! internal grid.
//!
//! The horizontal advance is pre-scaled to window pixel units here,
//! using the viewport supplied at construction: the layout driver adds
//! it straight to `pen.x`.

use std::num::NonZeroUsize;
use std::sync::Arc;

use font_kit::family_name::FamilyName;
use font_kit::font::Font;
use font_kit::hinting::HintingOptions;
use font_kit::outline::OutlineSink;
use font_kit::properties::Properties;
use font_kit::source::SystemSource;
use lru::LruCache;
use pathfinder_geometry::line_segment::LineSegment2F;
use pathfinder_geometry::vector::Vector2F;

use vellum_core::Viewport;

use crate::mesh::{GlyphMesh, MeshBuilder};
use crate::source::{FontError, GlyphSource};

/// Meshes kept alive per source. Text runs revisit a small alphabet,
/// so a few hundred entries make misses rare.
const MESH_CACHE_CAPACITY: usize = 512;

pub struct FontKitSource {
    font: Font,
    pt_size: f32,
    viewport: Viewport,
    units_per_em: f32,
    ascent: f32,
    descent: f32,
    cache: LruCache<char, Arc<GlyphMesh>>,
}

impl FontKitSource {
    /// Load a face from font file bytes (`index` selects within a
    /// collection).
    pub fn from_bytes(
        data: Arc<Vec<u8>>,
        index: u32,
        pt_size: f32,
        viewport: Viewport,
    ) -> Result<Self, FontError> {
        let font = Font::from_bytes(data, index)?;
        Ok(Self::from_font(font, pt_size, viewport))
    }

    /// Pick the system's best sans-serif match. Mostly useful for
    /// demos and tests; real callers load specific files.
    pub fn system_sans_serif(pt_size: f32, viewport: Viewport) -> Result<Self, FontError> {
        let handle = SystemSource::new()
            .select_best_match(&[FamilyName::SansSerif], &Properties::new())?;
        let font = handle.load()?;
        Ok(Self::from_font(font, pt_size, viewport))
    }

    fn from_font(font: Font, pt_size: f32, viewport: Viewport) -> Self {
        let metrics = font.metrics();
        let units_per_em = metrics.units_per_em as f32;
        log::debug!(
            "font '{}': {} units/em, ascent {}, descent {}",
            font.full_name(),
            metrics.units_per_em,
            metrics.ascent,
            metrics.descent,
        );
        Self {
            ascent: metrics.ascent / units_per_em,
            descent: metrics.descent / units_per_em,
            font,
            pt_size,
            viewport,
            units_per_em,
            cache: LruCache::new(
                NonZeroUsize::new(MESH_CACHE_CAPACITY).unwrap(),
            ),
        }
    }

    pub fn full_name(&self) -> String {
        self.font.full_name()
    }

    /// Em-unit advance → window pixels: the glyph's NDC span times
    /// half the window extent.
    fn advance_to_window(&self, advance_em: f32) -> f32 {
        advance_em * self.pt_size / self.viewport.pt_width() * self.viewport.window_width / 2.0
    }
}

impl GlyphSource for FontKitSource {
    fn load_glyph(&mut self, ch: char) -> Result<Option<Arc<GlyphMesh>>, FontError> {
        if let Some(mesh) = self.cache.get(&ch) {
            return Ok(Some(mesh.clone()));
        }

        let Some(glyph_id) = self.font.glyph_for_char(ch) else {
            log::debug!("no glyph for U+{:04X}", ch as u32);
            return Ok(None);
        };

        let mut sink = MeshSink {
            builder: MeshBuilder::new(),
            scale: 1.0 / self.units_per_em,
        };
        self.font
            .outline(glyph_id, HintingOptions::None, &mut sink)?;

        let advance = self.font.advance(glyph_id)?;
        let mesh = Arc::new(GlyphMesh {
            vertices: sink.builder.build(),
            advance_x: self.advance_to_window(advance.x() / self.units_per_em),
        });
        self.cache.put(ch, mesh.clone());
        Ok(Some(mesh))
    }

    fn ascender(&self) -> f32 {
        self.ascent
    }

    fn descender(&self) -> f32 {
        self.descent
    }

    fn pt_size(&self) -> f32 {
        self.pt_size
    }
}

/// Adapts font-kit's outline walk onto the mesh builder, normalizing
/// font units to em units on the way through.
struct MeshSink {
    builder: MeshBuilder,
    scale: f32,
}

impl MeshSink {
    fn point(&self, v: Vector2F) -> [f32; 2] {
        [v.x() * self.scale, v.y() * self.scale]
    }
}

impl OutlineSink for MeshSink {
    fn move_to(&mut self, to: Vector2F) {
        let p = self.point(to);
        self.builder.move_to(p);
    }

    fn line_to(&mut self, to: Vector2F) {
        let p = self.point(to);
        self.builder.line_to(p);
    }

    fn quadratic_curve_to(&mut self, ctrl: Vector2F, to: Vector2F) {
        let (c, p) = (self.point(ctrl), self.point(to));
        self.builder.quad_to(c, p);
    }

    fn cubic_curve_to(&mut self, ctrl: LineSegment2F, to: Vector2F) {
        let (c1, c2, p) = (
            self.point(ctrl.from()),
            self.point(ctrl.to()),
            self.point(to),
        );
        self.builder.cubic_to(c1, c2, p);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

// ===================================================================
// Tests
// ===================================================================
