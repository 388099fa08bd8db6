//! Batching demo — interleaved textures, tinted quads, and a sub-region,
//! with an FPS counter in the window title.

use std::sync::Arc;
use std::time::Instant;

use kvad::math::{self, Affine2, Vec2};
use kvad::{Batcher, BeginOptions, Color, DrawParams, GpuContext, TextureHandle};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowId};

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
    checker: Option<TextureHandle>,
    rings: Option<TextureHandle>,
    started: Option<Instant>,
    fps: FpsCounter,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("kvad — batching")
            .with_inner_size(winit::dpi::LogicalSize::new(1280.0, 720.0));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .expect("Failed to create window"),
        );

        let gpu = GpuContext::new(window.clone());
        let mut batcher = Batcher::new(&gpu.device, &gpu.queue, gpu.surface_format());

        self.checker = Some(batcher.create_texture("checker", 64, 64, &checkerboard(64)));
        self.rings = Some(batcher.create_texture("rings", 64, 64, &rings(64)));
        self.started = Some(Instant::now());

        self.gpu = Some(gpu);
        self.batcher = Some(batcher);
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Window close requested, exiting.");
                event_loop.exit();
            }

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
        let (checker, rings) = (self.checker.unwrap(), self.rings.unwrap());
        let t = self.started.unwrap().elapsed().as_secs_f32();

        let frame = match gpu.acquire_frame() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (w, h) = gpu.surface_size();
                gpu.resize(w, h);
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory!");
                std::process::exit(1);
            }
            Err(e) => {
                log::warn!("Surface error: {e:?}");
                return;
            }
        };

        gpu.clear(&frame, Color::rgb(0.1, 0.1, 0.15));
        batcher.begin(&frame.view, gpu.surface_size(), BeginOptions::default());

        // A grid alternating the two textures. Submission order is batch
        // order, so this worst-case interleaving costs one draw call per
        // cell; sorting the same grid by texture would cost two.
        for row in 0..6 {
            for col in 0..10 {
                let tex = if (row + col) % 2 == 0 { checker } else { rings };
                let world = Affine2::from_translation(Vec2::new(
                    40.0 + col as f32 * 80.0,
                    40.0 + row as f32 * 80.0,
                ));
                batcher.draw(tex, DrawParams::new().world(world));
            }
        }

        // A spinning checker quad: scale 64px to 128px, place it, rotate
        // about its own center.
        let center = Vec2::new(1000.0, 200.0);
        let world = math::rotation_about(t, center + Vec2::splat(64.0))
            * Affine2::from_translation(center)
            * Affine2::from_scale(Vec2::splat(2.0));
        batcher.draw(checker, DrawParams::new().world(world));

        // The top-left quadrant of the rings texture, drawn double size.
        batcher.draw(
            rings,
            DrawParams::new()
                .source(Affine2::from_scale(Vec2::new(0.5, 0.5)))
                .world(
                    Affine2::from_translation(Vec2::new(950.0, 420.0))
                        * Affine2::from_scale(Vec2::splat(2.0)),
                ),
        );

        // Solid tinted quads out of the white texture.
        let white = batcher.white();
        for (i, color) in [Color::RED, Color::GREEN, Color::BLUE].into_iter().enumerate() {
            let world = Affine2::from_translation(Vec2::new(950.0 + i as f32 * 80.0, 600.0))
                * Affine2::from_scale(Vec2::splat(48.0));
            batcher.draw(white, DrawParams::new().world(world).color(color));
        }

        batcher.end();
        frame.present();

        if let Some(fps) = self.fps.tick() {
            let stats = batcher.stats();
            if let Some(window) = &self.window {
                window.set_title(&format!(
                    "kvad — batching | {fps} fps | {} quads in {} draw calls",
                    stats.quads, stats.draw_calls
                ));
            }
        }
    }
}

/// Counts redraws and reports the total once per second.
#[derive(Default)]
struct FpsCounter {
    frames: u32,
    last_report: Option<Instant>,
}

impl FpsCounter {
    fn tick(&mut self) -> Option<u32> {
        self.frames += 1;
        let last = self.last_report.get_or_insert_with(Instant::now);
        if last.elapsed().as_secs_f32() >= 1.0 {
            let fps = self.frames;
            self.frames = 0;
            self.last_report = Some(Instant::now());
            return Some(fps);
        }
        None
    }
}

fn checkerboard(size: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let on = ((x / 8) + (y / 8)) % 2 == 0;
            let v = if on { 230 } else { 60 };
            data.extend_from_slice(&[v, v, v, 255]);
        }
    }
    data
}

fn rings(size: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity((size * size * 4) as usize);
    let center = size as f32 / 2.0;
    for y in 0..size {
        for x in 0..size {
            let d = ((x as f32 - center).powi(2) + (y as f32 - center).powi(2)).sqrt();
            let on = (d / 6.0) as u32 % 2 == 0;
            if on {
                data.extend_from_slice(&[240, 140, 40, 255]);
            } else {
                data.extend_from_slice(&[40, 90, 180, 255]);
            }
        }
    }
    data
}
