//! Encode pipeline — jittered coverage accumulation.
//!
//! One glyph is drawn [`SAMPLE_COUNT`] times into the coverage target,
//! each draw using one 256-byte uniform slot (jittered transform +
//! channel mask) selected by a dynamic bind-group offset. Blending is
//! pure additive; the fragment shader's front-face weighting packs the
//! winding into nibbles (see `shaders/encode.wgsl`).
//!
//! Culling is disabled: both windings must rasterize for the
//! front/back cancellation to reconstruct the nonzero fill rule.

use wgpu::{
    BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayoutDescriptor,
    BindGroupLayoutEntry, BindingResource, BindingType, BlendComponent, BlendFactor, BlendState,
    Buffer, BufferBinding, BufferBindingType, BufferDescriptor, BufferSize, BufferUsages,
    ColorTargetState, ColorWrites, CompareFunction, DepthStencilState, Device, FragmentState,
    FrontFace, MultisampleState, PipelineCompilationOptions, PipelineLayoutDescriptor,
    PolygonMode, PrimitiveState, PrimitiveTopology, Queue, RenderPass, RenderPipeline,
    RenderPipelineDescriptor, ShaderModuleDescriptor, ShaderStages, TextureFormat, VertexState,
};

use vellum_core::JITTER_PATTERN;
use vellum_text::MeshVertex;

use crate::vertex::{mesh_vertex_layout, EncodeUniforms};

/// Jitter samples per glyph.
pub const SAMPLE_COUNT: usize = JITTER_PATTERN.len();

/// Format of the packed coverage texture.
pub const COVERAGE_FORMAT: TextureFormat = TextureFormat::Rgba8Unorm;

/// Depth attachment format. The attachment exists alongside the color
/// target but is never tested or written.
pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

/// Minimum uniform-buffer dynamic offset alignment.
const UNIFORM_SLOT_STRIDE: u64 = 256;

/// Initial scratch vertex buffer: room for a fairly complex glyph.
const INITIAL_VERTEX_CAPACITY: u64 = 1024 * std::mem::size_of::<MeshVertex>() as u64;

/// Owns the accumulation pipeline, the per-sample uniform slots, and
/// the scratch vertex buffer glyph meshes are uploaded through.
pub struct EncodePipeline {
    pipeline: RenderPipeline,
    uniform_buffer: Buffer,
    uniform_bind_group: BindGroup,
    vertex_buffer: Buffer,
    vertex_capacity: u64,
    vertex_count: u32,
}

impl EncodePipeline {
    pub fn new(device: &Device) -> Self {
        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("encode_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/encode.wgsl").into()),
        });

        let uniform_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("encode_uniforms_bgl"),
            entries: &[BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::VERTEX_FRAGMENT,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: BufferSize::new(
                        std::mem::size_of::<EncodeUniforms>() as u64
                    ),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("encode_pipeline_layout"),
            bind_group_layouts: &[&uniform_bgl],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("encode_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: PipelineCompilationOptions::default(),
                buffers: &[mesh_vertex_layout()],
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: PipelineCompilationOptions::default(),
                targets: &[Some(ColorTargetState {
                    format: COVERAGE_FORMAT,
                    // Accumulate: every sample adds onto the target.
                    blend: Some(BlendState {
                        color: BlendComponent {
                            src_factor: BlendFactor::One,
                            dst_factor: BlendFactor::One,
                            operation: wgpu::BlendOperation::Add,
                        },
                        alpha: BlendComponent {
                            src_factor: BlendFactor::One,
                            dst_factor: BlendFactor::One,
                            operation: wgpu::BlendOperation::Add,
                        },
                    }),
                    write_mask: ColorWrites::ALL,
                })],
            }),
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: FrontFace::Ccw,
                // Both windings rasterize; facing only picks the weight.
                cull_mode: None,
                polygon_mode: PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: CompareFunction::Always,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let uniform_buffer = device.create_buffer(&BufferDescriptor {
            label: Some("encode_uniform_slots"),
            size: SAMPLE_COUNT as u64 * UNIFORM_SLOT_STRIDE,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("encode_uniforms_bg"),
            layout: &uniform_bgl,
            entries: &[BindGroupEntry {
                binding: 0,
                resource: BindingResource::Buffer(BufferBinding {
                    buffer: &uniform_buffer,
                    offset: 0,
                    size: BufferSize::new(std::mem::size_of::<EncodeUniforms>() as u64),
                }),
            }],
        });

        let vertex_buffer = Self::create_vertex_buffer(device, INITIAL_VERTEX_CAPACITY);

        Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            vertex_buffer,
            vertex_capacity: INITIAL_VERTEX_CAPACITY,
            vertex_count: 0,
        }
    }

    /// Upload one glyph's six uniform slots and its mesh.
    ///
    /// The scratch vertex buffer grows (doubling) when a mesh exceeds
    /// its capacity.
    pub fn upload(
        &mut self,
        device: &Device,
        queue: &Queue,
        samples: &[EncodeUniforms; SAMPLE_COUNT],
        vertices: &[MeshVertex],
    ) {
        for (i, sample) in samples.iter().enumerate() {
            queue.write_buffer(
                &self.uniform_buffer,
                i as u64 * UNIFORM_SLOT_STRIDE,
                bytemuck::bytes_of(sample),
            );
        }

        let byte_len = std::mem::size_of_val(vertices) as u64;
        if byte_len > self.vertex_capacity {
            let mut capacity = self.vertex_capacity;
            while capacity < byte_len {
                capacity *= 2;
            }
            log::debug!(
                "growing encode vertex buffer {} -> {capacity} bytes",
                self.vertex_capacity
            );
            self.vertex_buffer = Self::create_vertex_buffer(device, capacity);
            self.vertex_capacity = capacity;
        }

        queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(vertices));
        self.vertex_count = vertices.len() as u32;
    }

    /// Record the six accumulation draws for the uploaded glyph.
    pub fn draw(&self, pass: &mut RenderPass<'_>) {
        if self.vertex_count == 0 {
            return;
        }

        pass.set_pipeline(&self.pipeline);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        for sample in 0..SAMPLE_COUNT {
            let offset = (sample as u64 * UNIFORM_SLOT_STRIDE) as u32;
            pass.set_bind_group(0, &self.uniform_bind_group, &[offset]);
            pass.draw(0..self.vertex_count, 0..1);
        }
    }

    fn create_vertex_buffer(device: &Device, capacity: u64) -> Buffer {
        device.create_buffer(&BufferDescriptor {
            label: Some("encode_mesh_vb"),
            size: capacity,
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }
}
