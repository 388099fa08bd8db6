//! # Batcher — accumulate quads, flush on texture change
//!
//! The stateful core. Between [`Batcher::begin`] and [`Batcher::end`], every
//! [`draw`](Batcher::draw) appends one quad to the CPU store. A GPU flush
//! happens in exactly two places: when a draw's texture differs from the
//! active one (the pending batch is flushed *first*, then the active texture
//! switches, then the quad is appended — the only order that keeps every
//! flush single-textured), and unconditionally at `end`.
//!
//! ## Design Decisions
//!
//! **Flush on texture change, not on a size ceiling.** A draw call's cost is
//! dominated by state changes, not vertex count, so the store grows without
//! bound (doubling) and a batch only ends when it must. Callers that submit
//! texture-sorted draws get one draw call per texture; fully interleaved
//! submission degrades to one draw call per quad, which is the correct
//! worst case for order-preserving batching.
//!
//! **One submission per flush.** Every flush uploads at buffer offset 0.
//! wgpu defers `queue.write_buffer` until submission, so reusing offsets
//! within one command buffer would let a later flush's data clobber what an
//! earlier draw reads. Each flush therefore records and submits its own
//! encoder: uploads and draws interleave in submission order, and the
//! store's counts can safely reset to zero after every flush.
//!
//! **The batcher never clears.** Its render passes always `LoadOp::Load`;
//! clearing the target is the caller's pass ([`GpuContext::clear`]), done
//! once per frame rather than once per flush.
//!
//! [`GpuContext::clear`]: crate::GpuContext::clear

use glam::{Affine2, Mat4};

use crate::Color;
use crate::pipeline::{ActiveShader, BatchPipeline, Shader};
use crate::quad::build_quad;
use crate::store::GeometryStore;
use crate::texture::{TextureHandle, TextureStore};
use crate::vertex::{BatchVertex, CameraUniform};

/// Optional overrides for one `begin`/`end` block. Defaults: identity view,
/// Y-down orthographic projection over the viewport, the built-in shader.
#[derive(Default)]
pub struct BeginOptions {
    pub view: Option<Mat4>,
    pub projection: Option<Mat4>,
    pub shader: Option<Shader>,
}

impl BeginOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the view matrix.
    pub fn view(mut self, view: Mat4) -> Self {
        self.view = Some(view);
        self
    }

    /// Set the projection matrix.
    pub fn projection(mut self, projection: Mat4) -> Self {
        self.projection = Some(projection);
        self
    }

    /// Draw the block with a custom shader.
    pub fn shader(mut self, shader: Shader) -> Self {
        self.shader = Some(shader);
        self
    }
}

/// Per-draw parameters. Defaults: identity world transform (the quad sits at
/// its texture-space origin), full texture, white tint.
#[derive(Clone, Copy, Default)]
pub struct DrawParams {
    /// World transform applied to the quad corners.
    pub world: Affine2,
    /// Affine selecting a sub-region of the texture in UV space.
    pub source: Option<Affine2>,
    /// Tint multiplied with the texture sample.
    pub color: Color,
}

impl DrawParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the world transform.
    pub fn world(mut self, world: Affine2) -> Self {
        self.world = world;
        self
    }

    /// Select a texture sub-region. The affine is applied to the unit
    /// square; the transformed points become the UVs.
    pub fn source(mut self, source: Affine2) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the tint color.
    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// Counters for the current (or most recent) `begin`/`end` block. Reset by
/// [`Batcher::begin`]. `flushes` counts non-empty flushes; `draw_calls` is
/// `flushes` times the active shader's pass count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub flushes: u32,
    pub draw_calls: u32,
    pub quads: u32,
    pub vertices: u32,
    pub indices: u32,
}

/// Transform context for the current block, fixed at `begin`.
struct FrameState {
    target: wgpu::TextureView,
    view: Mat4,
    projection: Mat4,
    shader: ActiveShader,
}

/// The dynamic sprite batcher. One instance owns its geometry store, GPU
/// buffer mirrors, pipeline, and textures; all methods take `&mut self`, so
/// a single rendering thread is enforced by the borrow checker.
pub struct Batcher {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: BatchPipeline,
    textures: TextureStore,
    store: GeometryStore,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    /// Capacity grew since the last flush; GPU mirrors must be recreated.
    buffers_outdated: bool,
    active: Option<TextureHandle>,
    frame: Option<FrameState>,
    stats: BatchStats,
}

impl Batcher {
    /// Create a batcher rendering to targets of the given `format`.
    ///
    /// The device and queue handles are cheap reference-counted clones; the
    /// batcher keeps its own.
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, format: wgpu::TextureFormat) -> Self {
        let pipeline = BatchPipeline::new(device, format);
        let textures = TextureStore::new(
            device,
            queue,
            &pipeline.texture_bind_group_layout,
            &pipeline.sampler,
        );
        let store = GeometryStore::new();

        let vertex_buffer = create_vertex_buffer(device, store.vertex_capacity());
        let index_buffer = create_index_buffer(device, store.indices());

        Self {
            device: device.clone(),
            queue: queue.clone(),
            pipeline,
            textures,
            store,
            vertex_buffer,
            index_buffer,
            buffers_outdated: false,
            active: None,
            frame: None,
            stats: BatchStats::default(),
        }
    }

    /// Start a block rendering into `target`. `viewport` (width, height in
    /// pixels) sizes the default projection: `(0,0)` top-left, Y down, one
    /// unit per pixel.
    ///
    /// Already-flushed geometry is unaffected; the counts a prior `end`
    /// zeroed stay zeroed.
    pub fn begin(&mut self, target: &wgpu::TextureView, viewport: (u32, u32), options: BeginOptions) {
        let projection = options.projection.unwrap_or_else(|| {
            Mat4::orthographic_rh(0.0, viewport.0 as f32, viewport.1 as f32, 0.0, 0.0, 1.0)
        });
        let shader = match options.shader {
            Some(shader) => ActiveShader::Custom(shader),
            None => ActiveShader::Default,
        };
        self.frame = Some(FrameState {
            target: target.clone(),
            view: options.view.unwrap_or(Mat4::IDENTITY),
            projection,
            shader,
        });
        self.stats = BatchStats::default();
    }

    /// Append one quad. If `texture` differs from the active one, the
    /// pending batch is flushed first.
    ///
    /// # Panics
    ///
    /// Panics when called outside a `begin`/`end` block.
    pub fn draw(&mut self, texture: TextureHandle, params: DrawParams) {
        assert!(
            self.frame.is_some(),
            "Batcher::draw called outside a begin/end block"
        );

        if self.active != Some(texture) {
            self.flush();
            self.active = Some(texture);
        }

        if self.store.ensure_capacity(self.store.quad_count() + 1) {
            self.buffers_outdated = true;
        }

        let size = self.textures.get(texture).size();
        let (positions, uvs) = build_quad(size, params.world, params.source);
        let color = params.color.to_array();
        let corners: [BatchVertex; 4] = std::array::from_fn(|i| BatchVertex {
            position: [positions[i].x, positions[i].y, 0.0],
            uv: uvs[i].to_array(),
            color,
        });
        self.store.write_quad(corners);

        self.stats.quads += 1;
        self.stats.vertices += 4;
        self.stats.indices += 6;
    }

    /// Flush whatever is pending and leave the block.
    ///
    /// # Panics
    ///
    /// Panics when called outside a `begin`/`end` block.
    pub fn end(&mut self) {
        assert!(
            self.frame.is_some(),
            "Batcher::end called without a matching begin"
        );
        self.flush();
        self.frame = None;
    }

    /// Upload pending geometry and issue the draw calls for the current
    /// batch. No-op when nothing is pending.
    fn flush(&mut self) {
        if self.store.quad_count() == 0 {
            return;
        }
        let frame = self
            .frame
            .as_ref()
            .expect("pending geometry outside a begin/end block");

        if self.buffers_outdated {
            // Capacity grew: recreate the GPU mirrors at the new size and
            // generate topology for the newly added index range only.
            self.store.fill_indices();
            self.vertex_buffer = create_vertex_buffer(&self.device, self.store.vertex_capacity());
            self.index_buffer = create_index_buffer(&self.device, self.store.indices());
            self.buffers_outdated = false;
        }

        self.queue.write_buffer(
            &self.vertex_buffer,
            0,
            bytemuck::cast_slice(self.store.written_vertices()),
        );

        let camera = CameraUniform {
            view_projection: (frame.projection * frame.view).to_cols_array_2d(),
        };
        self.queue
            .write_buffer(&self.pipeline.camera_buffer, 0, bytemuck::cast_slice(&[camera]));

        let texture = self
            .active
            .expect("pending geometry without an active texture");
        let entry = self.textures.get(texture);

        let passes: &[wgpu::RenderPipeline] = match &frame.shader {
            ActiveShader::Default => std::slice::from_ref(&self.pipeline.pipeline),
            ActiveShader::Custom(shader) => &shader.passes,
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("kvad flush encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("kvad batch pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.set_bind_group(0, &self.pipeline.camera_bind_group, &[]);
            pass.set_bind_group(1, &entry.bind_group, &[]);

            for pipeline in passes {
                pass.set_pipeline(pipeline);
                pass.draw_indexed(0..self.store.index_count() as u32, 0, 0..1);
                self.stats.draw_calls += 1;
            }
        }
        self.queue.submit(std::iter::once(encoder.finish()));

        self.stats.flushes += 1;
        self.store.reset();
    }

    /// Upload RGBA8 pixel data as a new texture.
    pub fn create_texture(
        &mut self,
        label: &str,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> TextureHandle {
        self.textures
            .add(&self.device, &self.queue, label, width, height, data)
    }

    /// Load an image file from disk. Cached by path.
    pub fn load_texture(&mut self, path: &str) -> Result<TextureHandle, image::ImageError> {
        self.textures.load(&self.device, &self.queue, path)
    }

    /// The built-in 1×1 white texture: draw it tinted for solid quads.
    pub fn white(&self) -> TextureHandle {
        self.textures.white()
    }

    pub fn textures(&self) -> &TextureStore {
        &self.textures
    }

    /// The built-in pipeline, needed to build a custom [`Shader`] against
    /// the batcher's bind group layouts.
    pub fn pipeline(&self) -> &BatchPipeline {
        &self.pipeline
    }

    /// Counters for the current (or most recently ended) block.
    pub fn stats(&self) -> BatchStats {
        self.stats
    }

    /// Quads accumulated since the last flush.
    pub fn pending_quads(&self) -> usize {
        self.store.quad_count()
    }
}

fn create_vertex_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("kvad vertex buffer"),
        size: (capacity * std::mem::size_of::<BatchVertex>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_index_buffer(device: &wgpu::Device, indices: &[u32]) -> wgpu::Buffer {
    use wgpu::util::DeviceExt;
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("kvad index buffer"),
        contents: bytemuck::cast_slice(indices),
        usage: wgpu::BufferUsages::INDEX,
    })
}
