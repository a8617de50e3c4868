//! TextBuffer — owns the off-screen coverage target and drives the
//! pen/layout walk over a text run.
//!
//! The target is a single-slot resource: glyph accumulation and
//! decoding are strictly sequenced by submission order, and each
//! glyph's six jitter draws are recorded in one render pass, so a
//! decode can never observe partial accumulation.
//!
//! ```text
//! add_text(pen, markup, font, "ab\nc")
//!     │  per char: transform chain + 6 jittered draws (additive)
//!     ▼
//! packed coverage texture (1000 × 440, RGBA8)
//!     │  decode(rect, first_round)
//!     ▼
//! destination texture / surface
//! ```

use thiserror::Error;
use wgpu::{
    CommandEncoderDescriptor, Extent3d, LoadOp, Operations, RenderPassColorAttachment,
    RenderPassDepthStencilAttachment, RenderPassDescriptor, StoreOp, Texture, TextureDescriptor,
    TextureDimension, TextureUsages, TextureView, TextureViewDescriptor,
};

use vellum_core::transform::{glyph_transform, jittered};
use vellum_core::{jitter, Markup, Pen, Viewport, JITTER_PATTERN};
use vellum_text::{FontError, GlyphSource, MeshVertex};

use crate::context::GpuContext;
use crate::pipelines::encode::{COVERAGE_FORMAT, DEPTH_FORMAT, SAMPLE_COUNT};
use crate::pipelines::{DecodePipeline, EncodePipeline};
use crate::vertex::{DecodeInstance, EncodeUniforms};

/// Fixed coverage target extent in texels.
pub const COVERAGE_WIDTH: u32 = 1000;
pub const COVERAGE_HEIGHT: u32 = 440;

#[derive(Error, Debug)]
pub enum RenderError {
    /// The coverage target could not be created; the buffer refuses
    /// all further draws.
    #[error("coverage target setup failed: {0}")]
    TargetSetup(String),
    #[error(transparent)]
    Font(#[from] FontError),
    #[error("coverage readback failed: {0}")]
    Readback(String),
}

/// Owns the coverage target and both pipelines; walks text runs.
pub struct TextBuffer {
    viewport: Viewport,
    encode: EncodePipeline,
    decode: DecodePipeline,
    coverage_texture: Texture,
    coverage_view: TextureView,
    depth_view: TextureView,
    quad_uploaded: bool,
}

impl TextBuffer {
    /// Create the coverage target and pipelines.
    ///
    /// Any validation failure during target setup is surfaced here;
    /// a `TextBuffer` that constructs successfully has a complete,
    /// cleared target.
    pub async fn new(gpu: &GpuContext, viewport: Viewport) -> Result<Self, RenderError> {
        gpu.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let coverage_texture = gpu.device.create_texture(&TextureDescriptor {
            label: Some("coverage_target"),
            size: Extent3d {
                width: COVERAGE_WIDTH,
                height: COVERAGE_HEIGHT,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: COVERAGE_FORMAT,
            usage: TextureUsages::RENDER_ATTACHMENT
                | TextureUsages::TEXTURE_BINDING
                | TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let coverage_view = coverage_texture.create_view(&TextureViewDescriptor::default());

        let depth_texture = gpu.device.create_texture(&TextureDescriptor {
            label: Some("coverage_depth"),
            size: Extent3d {
                width: COVERAGE_WIDTH,
                height: COVERAGE_HEIGHT,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth_texture.create_view(&TextureViewDescriptor::default());

        let encode = EncodePipeline::new(&gpu.device);
        let decode = DecodePipeline::new(&gpu.device, gpu.surface_format, &coverage_view);

        if let Some(error) = gpu.device.pop_error_scope().await {
            return Err(RenderError::TargetSetup(error.to_string()));
        }

        let buffer = Self {
            viewport,
            encode,
            decode,
            coverage_texture,
            coverage_view,
            depth_view,
            quad_uploaded: false,
        };
        buffer.clear(gpu);
        Ok(buffer)
    }

    /// Reset the coverage target to transparent black.
    ///
    /// Call before starting a fresh accumulation sequence; clearing an
    /// already-clear target is a no-op in effect.
    pub fn clear(&self, gpu: &GpuContext) {
        let mut encoder = gpu
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("coverage_clear_encoder"),
            });
        // An empty pass whose load ops do the clearing.
        let _pass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("coverage_clear_pass"),
            color_attachments: &[Some(RenderPassColorAttachment {
                view: &self.coverage_view,
                resolve_target: None,
                ops: Operations {
                    load: LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(Operations {
                    load: LoadOp::Clear(1.0),
                    store: StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        drop(_pass);
        gpu.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Accumulate a whole text run. Characters are processed in
    /// order; the first failure aborts the rest and leaves the pen at
    /// its last successful position.
    pub fn add_text(
        &mut self,
        gpu: &GpuContext,
        pen: &mut Pen,
        markup: &Markup,
        font: &mut dyn GlyphSource,
        text: &str,
    ) -> Result<(), RenderError> {
        for ch in text.chars() {
            self.add_char(gpu, pen, markup, font, ch)?;
        }
        Ok(())
    }

    /// Accumulate one character and advance the pen.
    ///
    /// Whitespace and missing glyphs advance without any GPU
    /// submission; newline resets `pen.x` and moves down one line
    /// height. The markup's foreground is applied later, at decode
    /// time — accumulation is colorless coverage.
    pub fn add_char(
        &mut self,
        gpu: &GpuContext,
        pen: &mut Pen,
        _markup: &Markup,
        font: &mut dyn GlyphSource,
        ch: char,
    ) -> Result<(), RenderError> {
        if ch == '\n' {
            pen.y -= font.line_height(self.viewport.window_height, self.viewport.pt_height());
            pen.x = 0.0;
            return Ok(());
        }

        if ch == ' ' {
            if let Some(mesh) = font.load_glyph(' ')? {
                pen.x += mesh.advance_x;
            }
            return Ok(());
        }

        let Some(mesh) = font.load_glyph(ch)? else {
            // No glyph for this codepoint: advance-only.
            return Ok(());
        };

        if !mesh.is_empty() {
            self.encode_glyph(gpu, pen, font.pt_size(), font.descender(), &mesh.vertices);
        }

        pen.x += mesh.advance_x;
        Ok(())
    }

    /// Resolve the accumulated coverage into `target` over `rect`
    /// (normalized destination coordinates), tinted by the markup's
    /// foreground.
    ///
    /// Must only run after a complete clear-then-accumulate sequence;
    /// `first_round` selects the seed stage of the two-stage subpixel
    /// composite.
    pub fn decode(
        &mut self,
        gpu: &GpuContext,
        target: &TextureView,
        rect: [f32; 4],
        markup: &Markup,
        first_round: bool,
    ) {
        if !self.quad_uploaded {
            self.decode.upload_quad(&gpu.queue);
            self.quad_uploaded = true;
        }
        self.decode.upload(
            &gpu.queue,
            &[DecodeInstance::new(rect, markup.foreground)],
            first_round,
        );

        let mut encoder = gpu
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("decode_encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("decode_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Load,
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.decode.draw(&mut pass, first_round);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
    }

    /// The packed coverage texture, for external compositors.
    pub fn coverage_view(&self) -> &TextureView {
        &self.coverage_view
    }

    /// Coverage target extent in texels.
    pub fn dimensions(&self) -> (u32, u32) {
        (COVERAGE_WIDTH, COVERAGE_HEIGHT)
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Read the packed coverage texture back to the CPU, tightly
    /// packed RGBA rows. Debugging and test aid; rendering never needs
    /// the round trip.
    pub fn read_coverage(&self, gpu: &GpuContext) -> Result<Vec<u8>, RenderError> {
        const ROW_ALIGN: u32 = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let unpadded = COVERAGE_WIDTH * 4;
        let padded = unpadded.div_ceil(ROW_ALIGN) * ROW_ALIGN;

        let readback = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("coverage_readback"),
            size: (padded * COVERAGE_HEIGHT) as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = gpu
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("coverage_readback_encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.coverage_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(COVERAGE_HEIGHT),
                },
            },
            Extent3d {
                width: COVERAGE_WIDTH,
                height: COVERAGE_HEIGHT,
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
        receiver
            .recv()
            .map_err(|e| RenderError::Readback(e.to_string()))?
            .map_err(|e| RenderError::Readback(e.to_string()))?;

        let data = slice.get_mapped_range();
        let mut pixels = Vec::with_capacity((unpadded * COVERAGE_HEIGHT) as usize);
        for row in 0..COVERAGE_HEIGHT {
            let start = (row * padded) as usize;
            pixels.extend_from_slice(&data[start..start + unpadded as usize]);
        }
        drop(data);
        readback.unmap();
        Ok(pixels)
    }

    /// Record and submit one glyph's six jittered accumulation draws.
    fn encode_glyph(
        &mut self,
        gpu: &GpuContext,
        pen: &Pen,
        pt_size: f32,
        descender: f32,
        vertices: &[MeshVertex],
    ) {
        let base = glyph_transform(&self.viewport, pen, pt_size, descender);
        let mut samples = [EncodeUniforms {
            transform: base,
            weight: [0.0; 4],
        }; SAMPLE_COUNT];
        for (i, sample) in samples.iter_mut().enumerate() {
            sample.transform = jittered(&base, &self.viewport, JITTER_PATTERN[i]);
            sample.weight = jitter::channel_weight(i);
        }

        self.encode.upload(&gpu.device, &gpu.queue, &samples, vertices);

        let mut encoder = gpu
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("encode_encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("encode_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &self.coverage_view,
                    resolve_target: None,
                    ops: Operations {
                        // Glyphs accumulate across a run; clears are
                        // explicit.
                        load: LoadOp::Load,
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Load,
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.encode.draw(&mut pass);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
    }
}
