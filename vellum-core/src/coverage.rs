//! Software reference of the coverage packing arithmetic.
//!
//! The encode pass accumulates winding contributions into an 8-bit
//! channel with additive blending: front faces add 16/255, back faces
//! 1/255. The channel value therefore carries two nibbles —
//!
//! ```text
//!   upper nibble: number of front-face samples
//!   lower nibble: number of back-face samples
//! ```
//!
//! — and the decode pass recovers coverage as `|upper − lower|`,
//! clamped to 2 (one channel holds two jitter samples, so 2 is full
//! coverage). These helpers mirror the shader math bit-for-bit so the
//! packing scheme is testable without a GPU.

/// Front-face blend weight, in 1/255 units (upper nibble).
pub const FRONT_WEIGHT: u8 = 16;

/// Back-face blend weight, in 1/255 units (lower nibble).
pub const BACK_WEIGHT: u8 = 1;

/// Full coverage for one channel: two jitter samples.
pub const MAX_ALPHA: f32 = 2.0;

/// One additive blend of a winding sample into an 8-bit unorm channel.
///
/// Models `(ONE, ONE)` blending: the hardware clamps at 255 instead of
/// wrapping.
pub fn accumulate(channel: u8, front_facing: bool) -> u8 {
    let weight = if front_facing { FRONT_WEIGHT } else { BACK_WEIGHT };
    channel.saturating_add(weight)
}

/// Decode one packed channel (in 0..=255) into a coverage alpha.
///
/// Nonzero-fill reconstruction: front and back contributions cancel,
/// and anything beyond the representable overlap saturates at
/// [`MAX_ALPHA`] rather than wrapping.
pub fn decode_alpha(value: f32) -> f32 {
    let lower = value % 16.0;
    let upper = (value - lower) / 16.0;
    (upper - lower).abs().min(MAX_ALPHA)
}

/// The 6-tap horizontal box filter producing per-subpixel coverage.
///
/// `right` holds the decoded alphas of this texel's three channels
/// (phases 0, +1/3, +2/3); `left` the G and B alphas of the texel one
/// step to the right, which the shader reuses as phases −2/3 and −1/3.
/// Each output channel averages three adjacent phases; the division by
/// 6 folds in the per-channel maximum of 2.
pub fn subpixel_filter(left: [f32; 2], right: [f32; 3]) -> [f32; 3] {
    [
        (right[0] + right[1] + right[2]) / 6.0,
        (left[1] + right[0] + right[1]) / 6.0,
        (left[0] + left[1] + right[0]) / 6.0,
    ]
}

/// Grayscale coverage: the same filter collapsed to a single value.
///
/// Averaging all three taps of the center channel degrades gracefully
/// to plain antialiasing when the output has no known subpixel layout.
pub fn grayscale(right: [f32; 3]) -> f32 {
    (right[0] + right[1] + right[2]) / 6.0
}

// ===================================================================
// Tests
// ===================================================================
