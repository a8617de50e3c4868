//! Viewport — the mapping between point units, raster pixels, and the
//! window coordinate space the pen moves in.
//!
//! Supplied once when a text buffer is created and read-only for the
//! buffer's lifetime.

/// Dimensions and DPI of the rendering target.
///
/// `pixel_width`/`pixel_height` describe the coverage target's raster
/// grid; `window_width`/`window_height` the coordinate space pen
/// positions live in; `dpi`/`dpi_height` the physical resolution used
/// to convert between points and pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub pixel_width: f32,
    pub pixel_height: f32,
    pub window_width: f32,
    pub window_height: f32,
    pub dpi: f32,
    pub dpi_height: f32,
}

impl Viewport {
    /// Horizontal extent of the target in points (1 pt = 1/72 inch).
    pub fn pt_width(&self) -> f32 {
        self.pixel_width * 72.0 / self.dpi
    }

    /// Vertical extent of the target in points.
    pub fn pt_height(&self) -> f32 {
        self.pixel_height * 72.0 / self.dpi_height
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport_96dpi() -> Viewport {
        Viewport {
            pixel_width: 1000.0,
            pixel_height: 440.0,
            window_width: 1000.0,
            window_height: 440.0,
            dpi: 96.0,
            dpi_height: 96.0,
        }
    }

    #[test]
    fn test_pt_width_at_96_dpi() {
        let vp = viewport_96dpi();
        // 1000 px at 96 dpi = 750 pt.
        assert!((vp.pt_width() - 750.0).abs() < 1e-4);
    }

    #[test]
    fn test_pt_height_at_96_dpi() {
        let vp = viewport_96dpi();
        // 440 px at 96 dpi = 330 pt.
        assert!((vp.pt_height() - 330.0).abs() < 1e-4);
    }

    #[test]
    fn test_pt_extent_at_72_dpi_is_pixel_extent() {
        let vp = Viewport {
            dpi: 72.0,
            dpi_height: 72.0,
            ..viewport_96dpi()
        };
        assert!((vp.pt_width() - vp.pixel_width).abs() < 1e-4);
        assert!((vp.pt_height() - vp.pixel_height).abs() < 1e-4);
    }
}
