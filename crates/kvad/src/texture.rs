//! GPU textures behind copyable handles.
//!
//! Callers never hold a `wgpu::Texture` directly. Creating or loading a
//! texture returns a [`TextureHandle`] — a `Copy` index into the
//! [`TextureStore`], which owns the GPU resources and the per-texture bind
//! group. Handle equality is what the batcher compares to decide when a
//! flush is mandatory, and a handle cannot be null: "no active texture" is a
//! state of the batcher, not of any handle.
//!
//! Index 0 is always a 1×1 white texture. Drawing it tinted produces a solid
//! colored quad through the same texture × tint shader path as everything
//! else — no separate untextured code path.
//!
//! Loads are cached by path: loading the same file twice returns the same
//! handle without a second GPU upload.

use std::collections::HashMap;

use wgpu::util::DeviceExt;

/// Handle to a texture in the [`TextureStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub(crate) usize);

/// A loaded GPU texture: its bind group and pixel dimensions.
pub(crate) struct TextureEntry {
    pub bind_group: wgpu::BindGroup,
    pub width: u32,
    pub height: u32,
}

impl TextureEntry {
    pub fn size(&self) -> glam::Vec2 {
        glam::Vec2::new(self.width as f32, self.height as f32)
    }
}

/// Owns every loaded texture and the layout/sampler used to bind them.
pub struct TextureStore {
    entries: Vec<TextureEntry>,
    path_cache: HashMap<String, TextureHandle>,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl TextureStore {
    /// Create a store with the 1×1 white default at index 0.
    pub(crate) fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
    ) -> Self {
        let mut store = Self {
            entries: Vec::new(),
            path_cache: HashMap::new(),
            layout: layout.clone(),
            sampler: sampler.clone(),
        };
        store.add(device, queue, "white 1x1", 1, 1, &[255, 255, 255, 255]);
        store
    }

    /// The default 1×1 white texture.
    pub fn white(&self) -> TextureHandle {
        TextureHandle(0)
    }

    /// Upload RGBA8 pixel data as a new texture.
    pub(crate) fn add(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> TextureHandle {
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let handle = TextureHandle(self.entries.len());
        self.entries.push(TextureEntry {
            bind_group,
            width,
            height,
        });
        handle
    }

    /// Load an image file from disk and upload it. Cached by path.
    pub(crate) fn load(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &str,
    ) -> Result<TextureHandle, image::ImageError> {
        if let Some(&handle) = self.path_cache.get(path) {
            return Ok(handle);
        }

        let img = image::open(path)?.to_rgba8();
        let (width, height) = img.dimensions();
        let handle = self.add(device, queue, path, width, height, &img.into_raw());
        self.path_cache.insert(path.to_owned(), handle);
        log::info!("loaded texture '{path}' ({width}x{height})");
        Ok(handle)
    }

    pub(crate) fn get(&self, handle: TextureHandle) -> &TextureEntry {
        &self.entries[handle.0]
    }

    /// Pixel dimensions of a texture.
    pub fn size(&self, handle: TextureHandle) -> (u32, u32) {
        let entry = self.get(handle);
        (entry.width, entry.height)
    }
}
