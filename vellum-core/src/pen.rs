//! Pen and markup — mutable cursor state and per-call styling for a
//! text run.

/// Cursor position in window pixel space.
///
/// Owned by the caller across a whole text run; the layout driver
/// advances it after each glyph and resets `x` on newline.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pen {
    pub x: f32,
    pub y: f32,
}

impl Pen {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Styling bundle for one `add_text` call. Read-only to the renderer.
///
/// The font itself is passed alongside at the call site so a single
/// markup can be reused across backends.
#[derive(Clone, Copy, Debug)]
pub struct Markup {
    /// RGBA foreground color, each channel in [0.0, 1.0].
    pub foreground: [f32; 4],
}

impl Default for Markup {
    fn default() -> Self {
        Self {
            foreground: [1.0, 1.0, 1.0, 1.0],
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
    fn test_pen_default_is_origin() {
        assert_eq!(Pen::default(), Pen { x: 0.0, y: 0.0 });
    }

    #[test]
    fn test_markup_default_is_opaque_white() {
        assert_eq!(Markup::default().foreground, [1.0, 1.0, 1.0, 1.0]);
    }
}
