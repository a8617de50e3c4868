//! The fixed 6-sample jitter pattern driving coverage accumulation.
//!
//! Each glyph is drawn six times, each time shifted by one of these
//! sub-pixel offsets. Consecutive pairs of samples land in the same
//! texture channel, so the packed texture ends up holding coverage for
//! three horizontal sub-pixel phases:
//!
//! ```text
//!   R = phase 0      G = phase +1/3      B = phase +2/3
//! ```
//!
//! The decode shader reconstructs phases −2/3 and −1/3 from one extra
//! lookup at the neighboring texel, giving the 6-tap LCD filter
//!
//! ```text
//!   R = (f(x − 2/3) + f(x − 1/3) + f(x)) / 3
//!   G = (f(x − 1/3) + f(x)       + f(x + 1/3)) / 3
//!   B = (f(x)       + f(x + 1/3) + f(x + 2/3)) / 3
//! ```
//!
//! Storing phases 0, +1/3, +2/3 (rather than −1/3, 0, +1/3) is what
//! keeps the shader at two texture lookups instead of three.

/// Sub-pixel sample offsets, in texel units of a 12-unit subdivision.
///
/// Invariant: never mutated, shared process-wide.
pub const JITTER_PATTERN: [[f32; 2]; 6] = [
    [-1.0 / 12.0, -5.0 / 12.0],
    [1.0 / 12.0, 1.0 / 12.0],
    [3.0 / 12.0, -1.0 / 12.0],
    [5.0 / 12.0, 5.0 / 12.0],
    [7.0 / 12.0, -3.0 / 12.0],
    [9.0 / 12.0, 3.0 / 12.0],
];

/// Per-sample channel weight vector for the encode pass.
///
/// Even samples seed their channel; odd samples reuse the previous
/// seed, pairing adjacent jitter offsets into the same channel.
pub fn channel_weight(sample: usize) -> [f32; 4] {
    let seeded = sample - sample % 2;
    [
        if seeded == 0 { 1.0 } else { 0.0 },
        if seeded == 2 { 1.0 } else { 0.0 },
        if seeded == 4 { 1.0 } else { 0.0 },
        0.0,
    ]
}

// ===================================================================
// Tests
// ===================================================================
