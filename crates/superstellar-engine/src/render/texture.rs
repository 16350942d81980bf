use std::sync::atomic::{AtomicU64, Ordering};

use crate::coords::Vec2;

static NEXT_TEXTURE_ID: AtomicU64 = AtomicU64::new(1);

/// A sampled RGBA texture uploaded to the GPU.
///
/// Pixels are straight-alpha sRGB (as decoded from image files); shaders
/// premultiply after sampling. The `id` is unique per process and is used by
/// renderers to cache bind groups.
pub struct GpuTexture {
    id: u64,
    width: u32,
    height: u32,
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl GpuTexture {
    /// Uploads tightly packed RGBA8 `pixels` (`width * height * 4` bytes).
    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(width > 0 && height > 0, "texture '{label}' has zero size");
        anyhow::ensure!(
            pixels.len() == (width as usize) * (height as usize) * 4,
            "texture '{label}': expected {} bytes of RGBA8, got {}",
            (width as usize) * (height as usize) * 4,
            pixels.len()
        );

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Self {
            id: NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed),
            width,
            height,
            _texture: texture,
            view,
        })
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Size in texels (one texel is drawn as one logical pixel).
    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    #[inline]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}
