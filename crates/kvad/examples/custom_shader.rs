//! Custom shader demo — a two-pass effect drawn through the batcher.
//!
//! The first pass renders the quads desaturated; the second overlays a
//! scanline effect on top. Both passes run at every flush, in order.

use std::sync::Arc;
use std::time::Instant;

use kvad::math::{Affine2, Vec2};
use kvad::{Batcher, BeginOptions, Color, DrawParams, GpuContext, Shader, TextureHandle};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowId};

const EFFECT: &str = r#"
struct CameraUniform {
    view_projection: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> camera: CameraUniform;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) color: vec4<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = camera.view_projection * vec4<f32>(in.position, 1.0);
    out.uv = in.uv;
    out.color = in.color;
    return out;
}

@group(1) @binding(0)
var batch_texture: texture_2d<f32>;
@group(1) @binding(1)
var batch_sampler: sampler;

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let sample = textureSample(batch_texture, batch_sampler, in.uv) * in.color;
    let gray = dot(sample.rgb, vec3<f32>(0.299, 0.587, 0.114));
    return vec4<f32>(vec3<f32>(gray), sample.a);
}

@fragment
fn fs_scanlines(in: VertexOutput) -> @location(0) vec4<f32> {
    let sample = textureSample(batch_texture, batch_sampler, in.uv) * in.color;
    let line = select(0.0, 0.35, (u32(in.clip_position.y) % 4u) < 2u);
    return vec4<f32>(sample.rgb, sample.a * line);
}
"#;

fn main() {
    env_logger::init();

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    let mut app = App::default();
    event_loop.run_app(&mut app).expect("Event loop error");
}

#[derive(Default)]
struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    batcher: Option<Batcher>,
    effect: Option<Shader>,
    texture: Option<TextureHandle>,
    started: Option<Instant>,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("kvad — custom shader")
            .with_inner_size(winit::dpi::LogicalSize::new(800.0, 600.0));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .expect("Failed to create window"),
        );

        let gpu = GpuContext::new(window.clone());
        let mut batcher = Batcher::new(&gpu.device, &gpu.queue, gpu.surface_format());

        self.effect = Some(Shader::from_wgsl_passes(
            &gpu.device,
            batcher.pipeline(),
            EFFECT,
            &[("vs_main", "fs_main"), ("vs_main", "fs_scanlines")],
        ));
        self.texture = Some(batcher.create_texture("stripes", 64, 64, &stripes(64)));
        self.started = Some(Instant::now());

        self.gpu = Some(gpu);
        self.batcher = Some(batcher);
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(size) => {
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.resize(size.width, size.height);
                }
            }

            WindowEvent::RedrawRequested => {
                self.redraw();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }
}

impl App {
    fn redraw(&mut self) {
        let (Some(gpu), Some(batcher)) = (self.gpu.as_mut(), self.batcher.as_mut()) else {
            return;
        };
        let texture = self.texture.unwrap();
        let t = self.started.unwrap().elapsed().as_secs_f32();

        let frame = match gpu.acquire_frame() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (w, h) = gpu.surface_size();
                gpu.resize(w, h);
                return;
            }
            Err(e) => {
                log::warn!("Surface error: {e:?}");
                return;
            }
        };

        gpu.clear(&frame, Color::rgb(0.08, 0.08, 0.1));
        batcher.begin(
            &frame.view,
            gpu.surface_size(),
            BeginOptions::new().shader(self.effect.clone().unwrap()),
        );

        for i in 0..5 {
            let x = 80.0 + i as f32 * 130.0;
            let y = 250.0 + (t * 2.0 + i as f32).sin() * 100.0;
            batcher.draw(
                texture,
                DrawParams::new()
                    .world(Affine2::from_translation(Vec2::new(x, y)))
                    .color(Color::rgb(1.0, 0.9, 0.8)),
            );
        }

        batcher.end();
        frame.present();
    }
}

fn stripes(size: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for _x in 0..size {
            if (y / 8) % 2 == 0 {
                data.extend_from_slice(&[220, 60, 90, 255]);
            } else {
                data.extend_from_slice(&[60, 200, 170, 255]);
            }
        }
    }
    data
}
