//! Decode pipeline — resolves the packed coverage texture into final
//! color.
//!
//! An instanced unit quad is stretched over each destination rect; the
//! fragment shader splits every packed channel into its front/back
//! nibbles and averages three adjacent subpixel phases (see
//! `shaders/decode.wgsl`).
//!
//! Two blend variants realize the two-stage subpixel composite:
//!
//! - **seed** (`first_round`): output is `1 − coverage`, blended
//!   multiplicatively (`DST, ZERO`) to darken the destination where
//!   the glyphs sit;
//! - **color**: output is `color · coverage`, blended additively on
//!   top of the seeded destination.

use wgpu::{
    AddressMode, BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayoutDescriptor,
    BindGroupLayoutEntry, BindingResource, BindingType, BlendComponent,
    BlendFactor, BlendOperation, BlendState, Buffer, BufferBindingType, BufferDescriptor,
    BufferUsages, ColorTargetState, ColorWrites, Device, FilterMode, FragmentState, FrontFace,
    IndexFormat, MultisampleState, PipelineCompilationOptions, PipelineLayoutDescriptor,
    PolygonMode, PrimitiveState, PrimitiveTopology, Queue, RenderPass, RenderPipeline,
    RenderPipelineDescriptor, SamplerBindingType, SamplerDescriptor, ShaderModule,
    ShaderModuleDescriptor, ShaderStages, TextureFormat, TextureSampleType, TextureView,
    TextureViewDimension, VertexState,
};

use crate::vertex::{DecodeInstance, DecodeParams, QuadVertex};

/// Decode rects per draw call. One per glyph run is typical; atlas
/// blitting batches a few dozen.
const MAX_DECODE_INSTANCES: usize = 256;

/// Owns both blend variants of the resolve pipeline plus the quad,
/// instance, and parameter buffers.
pub struct DecodePipeline {
    color_pipeline: RenderPipeline,
    seed_pipeline: RenderPipeline,

    vertex_buffer: Buffer,
    index_buffer: Buffer,
    instance_buffer: Buffer,
    instance_count: u32,

    params_buffer: Buffer,
    bind_group: BindGroup,
}

impl DecodePipeline {
    /// Create the pipeline resolving `coverage_view` into targets of
    /// `target_format`.
    pub fn new(device: &Device, target_format: TextureFormat, coverage_view: &TextureView) -> Self {
        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("decode_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/decode.wgsl").into()),
        });

        let bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("decode_bgl"),
            entries: &[
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Texture {
                        sample_type: TextureSampleType::Float { filterable: true },
                        view_dimension: TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Sampler(SamplerBindingType::Filtering),
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 2,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Buffer {
                        ty: BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("decode_pipeline_layout"),
            bind_group_layouts: &[&bgl],
            push_constant_ranges: &[],
        });

        // Color pass: add `color · coverage` onto the destination.
        let additive = BlendState {
            color: BlendComponent {
                src_factor: BlendFactor::One,
                dst_factor: BlendFactor::One,
                operation: BlendOperation::Add,
            },
            alpha: BlendComponent {
                src_factor: BlendFactor::One,
                dst_factor: BlendFactor::One,
                operation: BlendOperation::Add,
            },
        };
        // Seed pass: multiply the destination by `1 − coverage`.
        let multiply = BlendState {
            color: BlendComponent {
                src_factor: BlendFactor::Dst,
                dst_factor: BlendFactor::Zero,
                operation: BlendOperation::Add,
            },
            alpha: BlendComponent {
                src_factor: BlendFactor::Dst,
                dst_factor: BlendFactor::Zero,
                operation: BlendOperation::Add,
            },
        };

        let color_pipeline = Self::create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            target_format,
            additive,
            "decode_color_pipeline",
        );
        let seed_pipeline = Self::create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            target_format,
            multiply,
            "decode_seed_pipeline",
        );

        let vertex_buffer = device.create_buffer(&BufferDescriptor {
            label: Some("decode_quad_vb"),
            size: std::mem::size_of::<[QuadVertex; 4]>() as u64,
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let index_buffer = device.create_buffer(&BufferDescriptor {
            label: Some("decode_quad_ib"),
            size: std::mem::size_of::<[u16; 6]>() as u64,
            usage: BufferUsages::INDEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let instance_buffer = device.create_buffer(&BufferDescriptor {
            label: Some("decode_instances"),
            size: (MAX_DECODE_INSTANCES * std::mem::size_of::<DecodeInstance>()) as u64,
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let params_buffer = device.create_buffer(&BufferDescriptor {
            label: Some("decode_params_ub"),
            size: std::mem::size_of::<DecodeParams>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // Nearest sampling: the decode shader does its own phase
        // filtering and must see raw packed texels.
        let sampler = device.create_sampler(&SamplerDescriptor {
            label: Some("coverage_sampler"),
            address_mode_u: AddressMode::ClampToEdge,
            address_mode_v: AddressMode::ClampToEdge,
            mag_filter: FilterMode::Nearest,
            min_filter: FilterMode::Nearest,
            ..Default::default()
        });

        let bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("decode_bg"),
            layout: &bgl,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: BindingResource::TextureView(coverage_view),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: BindingResource::Sampler(&sampler),
                },
                BindGroupEntry {
                    binding: 2,
                    resource: params_buffer.as_entire_binding(),
                },
            ],
        });

        Self {
            color_pipeline,
            seed_pipeline,
            vertex_buffer,
            index_buffer,
            instance_buffer,
            instance_count: 0,
            params_buffer,
            bind_group,
        }
    }

    /// Upload the static quad geometry. Call once after creation.
    pub fn upload_quad(&self, queue: &Queue) {
        queue.write_buffer(
            &self.vertex_buffer,
            0,
            bytemuck::cast_slice(&QuadVertex::VERTICES),
        );
        queue.write_buffer(
            &self.index_buffer,
            0,
            bytemuck::cast_slice(&QuadVertex::INDICES),
        );
    }

    /// Upload destination rects and the output-mode flag.
    pub fn upload(&mut self, queue: &Queue, instances: &[DecodeInstance], first_round: bool) {
        let count = instances.len().min(MAX_DECODE_INSTANCES);
        if count > 0 {
            queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&instances[..count]),
            );
        }
        self.instance_count = count as u32;
        queue.write_buffer(
            &self.params_buffer,
            0,
            bytemuck::bytes_of(&DecodeParams::new(first_round)),
        );
    }

    /// Record the resolve draw. `first_round` must match the flag
    /// passed to [`upload`](Self::upload).
    pub fn draw(&self, pass: &mut RenderPass<'_>, first_round: bool) {
        if self.instance_count == 0 {
            return;
        }

        let pipeline = if first_round {
            &self.seed_pipeline
        } else {
            &self.color_pipeline
        };
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), IndexFormat::Uint16);
        pass.draw_indexed(0..6, 0, 0..self.instance_count);
    }

    fn create_pipeline(
        device: &Device,
        layout: &wgpu::PipelineLayout,
        shader: &ShaderModule,
        target_format: TextureFormat,
        blend: BlendState,
        label: &str,
    ) -> RenderPipeline {
        device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                compilation_options: PipelineCompilationOptions::default(),
                buffers: &[QuadVertex::layout(), DecodeInstance::layout()],
            },
            fragment: Some(FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                compilation_options: PipelineCompilationOptions::default(),
                targets: &[Some(ColorTargetState {
                    format: target_format,
                    blend: Some(blend),
                    write_mask: ColorWrites::ALL,
                })],
            }),
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }
}
