//! The GPU pipeline for textured quads, and custom shader support.
//!
//! [`BatchPipeline`] is the frozen configuration the batcher binds before
//! drawing: the built-in WGSL shader, the vertex layout, two bind group
//! layouts (camera uniform at group 0, texture + sampler at group 1), alpha
//! blending, triangle list, no culling, no depth. Quads are Z-less and drawn
//! in submission order, so a depth buffer would only break alpha blending.
//!
//! A [`Shader`] is the caller-supplied alternative: one or more ordered
//! render pipelines built from the caller's WGSL against the *same* layouts,
//! so the camera uniform and texture bindings work unchanged. Multi-pass
//! shaders get one indexed draw call per pass at every flush.
//!
//! [`ActiveShader`] is the per-`begin` choice between the two. It is set
//! once when a block starts and read-only until `end`.

use wgpu::util::DeviceExt;

use crate::vertex::{BatchVertex, CameraUniform};

/// GPU resources for the built-in textured-quad pipeline.
pub struct BatchPipeline {
    pub(crate) pipeline: wgpu::RenderPipeline,
    pub(crate) texture_bind_group_layout: wgpu::BindGroupLayout,
    pub(crate) camera_buffer: wgpu::Buffer,
    pub(crate) camera_bind_group: wgpu::BindGroup,
    pub(crate) sampler: wgpu::Sampler,
    camera_bind_group_layout: wgpu::BindGroupLayout,
    format: wgpu::TextureFormat,
}

impl BatchPipeline {
    /// Build the default pipeline targeting `format`.
    pub(crate) fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("kvad shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        // Bind group layout 0: camera uniform
        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("kvad camera bind group layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        // Bind group layout 1: texture + sampler
        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("kvad texture bind group layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let pipeline = build_pipeline(
            device,
            format,
            &camera_bind_group_layout,
            &texture_bind_group_layout,
            &shader,
            "vs_main",
            "fs_main",
            "kvad pipeline",
        );

        // Camera uniform buffer, identity until the first flush writes it.
        let camera_uniform = CameraUniform {
            view_projection: glam::Mat4::IDENTITY.to_cols_array_2d(),
        };
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("kvad camera uniform buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("kvad camera bind group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        // Shared sampler for all batch textures.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("kvad sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        log::info!("batch pipeline created ({format:?})");

        Self {
            pipeline,
            texture_bind_group_layout,
            camera_buffer,
            camera_bind_group,
            sampler,
            camera_bind_group_layout,
            format,
        }
    }
}

/// A custom shader: ordered render pipelines sharing the batcher's bind
/// group layouts. Cheap to clone (wgpu resources are reference-counted).
#[derive(Clone)]
pub struct Shader {
    pub(crate) passes: Vec<wgpu::RenderPipeline>,
}

impl Shader {
    /// Build a single-pass shader from WGSL with `vs_main`/`fs_main` entry
    /// points. The source must declare the same two bind groups as the
    /// built-in shader: `view_projection` uniform at group 0, texture and
    /// sampler at group 1.
    pub fn from_wgsl(device: &wgpu::Device, pipeline: &BatchPipeline, source: &str) -> Self {
        Self::from_wgsl_passes(device, pipeline, source, &[("vs_main", "fs_main")])
    }

    /// Build a multi-pass shader: one pipeline per `(vertex, fragment)` entry
    /// point pair, applied in order at every flush.
    pub fn from_wgsl_passes(
        device: &wgpu::Device,
        pipeline: &BatchPipeline,
        source: &str,
        entry_points: &[(&str, &str)],
    ) -> Self {
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("kvad custom shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let passes = entry_points
            .iter()
            .map(|(vs, fs)| {
                build_pipeline(
                    device,
                    pipeline.format,
                    &pipeline.camera_bind_group_layout,
                    &pipeline.texture_bind_group_layout,
                    &module,
                    vs,
                    fs,
                    "kvad custom pipeline",
                )
            })
            .collect();

        Self { passes }
    }
}

/// Which shader a `begin`/`end` block draws with. Resolved at `begin`,
/// read-only for the rest of the block.
pub(crate) enum ActiveShader {
    Default,
    Custom(Shader),
}

fn build_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    camera_layout: &wgpu::BindGroupLayout,
    texture_layout: &wgpu::BindGroupLayout,
    module: &wgpu::ShaderModule,
    vs_entry: &str,
    fs_entry: &str,
    label: &str,
) -> wgpu::RenderPipeline {
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[camera_layout, texture_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some(vs_entry),
            buffers: &[BatchVertex::LAYOUT],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some(fs_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None, // quads are double-sided
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
