//! # Kvad — Dynamic 2D Sprite Batching
//!
//! A sprite batcher turns many small "draw this texture with this transform"
//! requests into as few GPU draw calls as possible. Each request becomes a
//! *quad* — four vertices, two triangles — appended to a growing CPU-side
//! vertex/index store. A draw call is only issued when it has to be: when the
//! texture (or shader) changes, or when the frame ends.
//!
//! ## Architecture
//!
//! Every `begin`/`end` block follows the same flow:
//!
//! ```text
//!  begin(target, options)          draw(texture, params)
//!         │                            │  │  │  ...
//!         ▼                            ▼  ▼  ▼
//!   ┌──────────────┐     ┌──────────────────────────────────┐
//!   │ resolve view │     │ texture changed? flush the batch  │
//!   │ + projection │     │ then append one quad:             │
//!   │ + shader     │     │   grow store if full (doubling)   │
//!   └──────┬───────┘     │   build corners + UVs             │
//!          │             │   write 4 vertices / 6 indices    │
//!          │             └───────────────┬──────────────────┘
//!          │                             │
//!          ▼                             ▼
//!   ┌───────────────────────────────────────────────┐
//!   │ flush (also forced by end)                     │
//!   │  • recreate GPU buffers if capacity grew       │
//!   │  • upload pending vertices + view_projection   │
//!   │  • one draw_indexed per shader pass            │
//!   │  • submit, reset counts, keep capacity         │
//!   └───────────────────────────────────────────────┘
//! ```
//!
//! Submission order is draw order — the batcher never sorts. Callers that
//! group draws by texture get maximal coalescing; interleaved textures cost
//! one draw call per run.
//!
//! ## Quick start
//!
//! ```no_run
//! use kvad::math::{Affine2, Vec2};
//!
//! # fn demo(gpu: &kvad::GpuContext) {
//! let mut batcher = kvad::Batcher::new(&gpu.device, &gpu.queue, gpu.surface_format());
//! let tex = batcher.create_texture("gray 2x2", 2, 2, &[128u8; 16]);
//!
//! let frame = gpu.acquire_frame().expect("surface lost");
//! gpu.clear(&frame, kvad::Color::BLACK);
//! batcher.begin(&frame.view, gpu.surface_size(), kvad::BeginOptions::default());
//! batcher.draw(
//!     tex,
//!     kvad::DrawParams::new().world(Affine2::from_translation(Vec2::new(10.0, 20.0))),
//! );
//! batcher.end();
//! frame.present();
//! # }
//! ```

pub mod batch;
pub mod gpu;
pub mod math;
pub mod pipeline;
pub mod texture;

pub(crate) mod quad;
pub(crate) mod store;
pub(crate) mod vertex;

pub use batch::{BatchStats, Batcher, BeginOptions, DrawParams};
pub use gpu::{Frame, GpuContext};
pub use pipeline::Shader;
pub use texture::TextureHandle;

/// An RGBA color with floating-point components in [0, 1].
///
/// Used as the per-quad tint: the fragment shader multiplies the texture
/// sample by this color, so `WHITE` draws the texture unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };
    pub const BLACK: Self = Self { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };
    pub const RED: Self = Self { r: 1.0, g: 0.0, b: 0.0, a: 1.0 };
    pub const GREEN: Self = Self { r: 0.0, g: 1.0, b: 0.0, a: 1.0 };
    pub const BLUE: Self = Self { r: 0.0, g: 0.0, b: 1.0, a: 1.0 };

    /// Create a color from RGB (alpha = 1).
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a color from RGBA.
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub(crate) fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub(crate) fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: self.a as f64,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}
