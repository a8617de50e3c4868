//! End-to-end coverage tests against a real (headless) GPU device.
//!
//! Every test skips gracefully when no adapter is available, so CI
//! images without a GPU still pass.

use std::sync::Arc;

use vellum_core::coverage::decode_alpha;
use vellum_core::{Markup, Pen, Viewport};
use vellum_render::{GpuContext, TextBuffer, COVERAGE_HEIGHT, COVERAGE_WIDTH};
use vellum_text::{FontError, GlyphMesh, GlyphSource, MeshBuilder};

fn gpu() -> Option<GpuContext> {
    pollster::block_on(GpuContext::new_headless()).ok()
}

fn viewport() -> Viewport {
    Viewport {
        pixel_width: COVERAGE_WIDTH as f32,
        pixel_height: COVERAGE_HEIGHT as f32,
        window_width: COVERAGE_WIDTH as f32,
        window_height: COVERAGE_HEIGHT as f32,
        dpi: 72.0,
        dpi_height: 72.0,
    }
}

fn text_buffer(gpu: &GpuContext) -> TextBuffer {
    pollster::block_on(TextBuffer::new(gpu, viewport())).expect("target setup should succeed")
}

/// Deterministic test font: every letter is a unit em square, space is
/// advance-only, `\u{1}` fails, everything else is missing.
struct SquareFont {
    advance: f32,
}

impl SquareFont {
    fn new(advance: f32) -> Self {
        Self { advance }
    }

    fn square_mesh(&self) -> Arc<GlyphMesh> {
        let mut b = MeshBuilder::new();
        b.move_to([0.0, 0.0]);
        b.line_to([1.0, 0.0]);
        b.line_to([1.0, 1.0]);
        b.line_to([0.0, 1.0]);
        b.close();
        Arc::new(GlyphMesh {
            vertices: b.build(),
            advance_x: self.advance,
        })
    }
}

impl GlyphSource for SquareFont {
    fn load_glyph(&mut self, ch: char) -> Result<Option<Arc<GlyphMesh>>, FontError> {
        match ch {
            '\u{1}' => Err(FontError::Backend("poisoned codepoint".into())),
            ' ' => Ok(Some(Arc::new(GlyphMesh {
                vertices: Vec::new(),
                advance_x: self.advance,
            }))),
            c if c.is_ascii_alphabetic() => Ok(Some(self.square_mesh())),
            _ => Ok(None),
        }
    }

    fn ascender(&self) -> f32 {
        0.8
    }

    fn descender(&self) -> f32 {
        -0.2
    }

    fn pt_size(&self) -> f32 {
        100.0
    }
}

#[test]
fn test_clear_is_idempotent() {
    let Some(gpu) = gpu() else { return };
    let buffer = text_buffer(&gpu);

    for round in 0..2 {
        buffer.clear(&gpu);
        let pixels = buffer.read_coverage(&gpu).expect("readback");
        assert!(
            pixels.iter().all(|&b| b == 0),
            "round {round}: cleared target must be all zeros"
        );
    }
}

#[test]
fn test_whitespace_advances_without_draw() {
    let Some(gpu) = gpu() else { return };
    let mut buffer = text_buffer(&gpu);
    let mut font = SquareFont::new(12.5);
    let mut pen = Pen::new(100.0, 200.0);

    buffer
        .add_char(&gpu, &mut pen, &Markup::default(), &mut font, ' ')
        .expect("space should succeed");

    assert_eq!(pen.x, 112.5);
    assert_eq!(pen.y, 200.0);
    let pixels = buffer.read_coverage(&gpu).expect("readback");
    assert!(pixels.iter().all(|&b| b == 0), "space must not draw");
}

#[test]
fn test_newline_resets_pen() {
    let Some(gpu) = gpu() else { return };
    let mut buffer = text_buffer(&gpu);
    let mut font = SquareFont::new(10.0);
    let mut pen = Pen::new(321.0, 400.0);

    buffer
        .add_char(&gpu, &mut pen, &Markup::default(), &mut font, '\n')
        .expect("newline should succeed");

    assert_eq!(pen.x, 0.0);
    // (ascender − descender) · window_height · pt_size / pt_height
    let vp = viewport();
    let expected = (0.8 - (-0.2)) * vp.window_height * 100.0 / vp.pt_height();
    assert!(
        (pen.y - (400.0 - expected)).abs() < 1e-3,
        "pen.y = {}, expected {}",
        pen.y,
        400.0 - expected,
    );
    let pixels = buffer.read_coverage(&gpu).expect("readback");
    assert!(pixels.iter().all(|&b| b == 0), "newline must not draw");
}

#[test]
fn test_missing_glyph_is_not_an_error() {
    let Some(gpu) = gpu() else { return };
    let mut buffer = text_buffer(&gpu);
    let mut font = SquareFont::new(10.0);
    let mut pen = Pen::new(0.0, 220.0);

    // '?' has no glyph in SquareFont: the run still succeeds and the
    // pen only moves for the mapped characters.
    buffer
        .add_text(&gpu, &mut pen, &Markup::default(), &mut font, "A?B")
        .expect("missing glyph is advance-only");
    assert_eq!(pen.x, 20.0);
}

#[test]
fn test_failure_aborts_remaining_characters() {
    let Some(gpu) = gpu() else { return };
    let mut buffer = text_buffer(&gpu);
    let mut font = SquareFont::new(10.0);
    let mut pen = Pen::new(0.0, 220.0);

    let result = buffer.add_text(&gpu, &mut pen, &Markup::default(), &mut font, "AB\u{1}C");
    assert!(result.is_err(), "poisoned codepoint must propagate");
    // Pen stays where the last successful character left it.
    assert_eq!(pen.x, 20.0);
}

#[test]
fn test_encode_accumulates_full_coverage() {
    let Some(gpu) = gpu() else { return };
    let mut buffer = text_buffer(&gpu);
    let mut font = SquareFont::new(10.0);
    let mut pen = Pen::new(400.0, 150.0);

    buffer
        .add_char(&gpu, &mut pen, &Markup::default(), &mut font, 'A')
        .expect("glyph should encode");

    let pixels = buffer.read_coverage(&gpu).expect("readback");
    assert!(
        pixels.iter().any(|&b| b != 0),
        "a drawn glyph must leave packed coverage"
    );

    // Texels inside the square see both jitter samples of every
    // channel from one consistent winding: full decoded coverage.
    let full_interior = pixels.chunks(4).any(|texel| {
        texel[..3]
            .iter()
            .all(|&c| decode_alpha(c as f32) == 2.0)
    });
    assert!(full_interior, "interior texels must decode to full alpha");

    // Nothing may decode beyond the clamp.
    for texel in pixels.chunks(4) {
        for &c in &texel[..3] {
            assert!(decode_alpha(c as f32) <= 2.0);
        }
    }
}

/// Read an RGBA8-class texture back as tightly packed rows.
fn read_texture(gpu: &GpuContext, texture: &wgpu::Texture, width: u32, height: u32) -> Vec<u8> {
    const ROW_ALIGN: u32 = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    let unpadded = width * 4;
    let padded = unpadded.div_ceil(ROW_ALIGN) * ROW_ALIGN;

    let readback = gpu.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("destination_readback"),
        size: (padded * height) as u64,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let mut encoder = gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("destination_readback_encoder"),
        });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &readback,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    gpu.queue.submit(std::iter::once(encoder.finish()));

    let slice = readback.slice(..);
    let (sender, receiver) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = sender.send(result);
    });
    let _ = gpu.device.poll(wgpu::Maintain::Wait);
    receiver.recv().expect("map callback").expect("map");

    let data = slice.get_mapped_range();
    let mut pixels = Vec::with_capacity((unpadded * height) as usize);
    for row in 0..height {
        let start = (row * padded) as usize;
        pixels.extend_from_slice(&data[start..start + unpadded as usize]);
    }
    drop(data);
    readback.unmap();
    pixels
}

#[test]
fn test_decode_places_coverage_at_pen_position() {
    let Some(gpu) = gpu() else { return };
    let mut buffer = text_buffer(&gpu);
    let mut font = SquareFont::new(10.0);
    let mut pen = Pen::new(200.0, 150.0);

    buffer
        .add_char(&gpu, &mut pen, &Markup::default(), &mut font, 'X')
        .expect("glyph should encode");

    const SIZE: u32 = 256;
    let destination = gpu.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("decode_destination"),
        size: wgpu::Extent3d {
            width: SIZE,
            height: SIZE,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: gpu.surface_format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = destination.create_view(&wgpu::TextureViewDescriptor::default());

    let markup = Markup {
        foreground: [0.9, 0.9, 0.9, 1.0],
    };
    // Seed stage then color stage, as a compositor would. The target
    // starts zero-initialized, so only the color stage leaves pixels.
    buffer.decode(&gpu, &view, [0.0, 0.0, 1.0, 1.0], &markup, true);
    buffer.decode(&gpu, &view, [0.0, 0.0, 1.0, 1.0], &markup, false);

    let pixels = read_texture(&gpu, &destination, SIZE, SIZE);

    let mut rows = Vec::new();
    let mut cols = Vec::new();
    for (i, texel) in pixels.chunks(4).enumerate() {
        if texel.iter().any(|&b| b != 0) {
            rows.push(i as u32 / SIZE);
            cols.push(i as u32 % SIZE);
        }
    }
    assert!(!rows.is_empty(), "decoded glyph must reach the destination");

    // The em square at pen (200, 150), pt 100, descender −0.2 spans
    // NDC x ∈ [−0.6, −0.5] and y ∈ [−0.364, −0.136]: destination rows
    // 145..175 and columns 51..64 (top-down). A vertically mirrored
    // resolve would land the rows at 81..111 instead.
    let (row_min, row_max) = (rows[0], rows[rows.len() - 1]);
    let col_min = cols.iter().min().copied().unwrap_or(0);
    let col_max = cols.iter().max().copied().unwrap_or(0);
    assert!(
        row_min >= 135 && row_max <= 185,
        "glyph rows {row_min}..{row_max} outside the expected 145..175 band"
    );
    assert!(
        col_min >= 45 && col_max <= 72,
        "glyph columns {col_min}..{col_max} outside the expected 51..64 band"
    );
}

#[test]
fn test_dimensions_are_fixed() {
    let Some(gpu) = gpu() else { return };
    let buffer = text_buffer(&gpu);
    assert_eq!(buffer.dimensions(), (COVERAGE_WIDTH, COVERAGE_HEIGHT));
}
