use super::RenderCtx;

/// Offscreen color target matching the surface size and format.
///
/// Holds the base layer of the scene so a filter can read it as input while
/// writing the surface as output. Recreated when the surface is resized.
#[derive(Default)]
pub struct OffscreenTarget {
    current: Option<Allocation>,
}

struct Allocation {
    key: ([u32; 2], wgpu::TextureFormat),
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl OffscreenTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view sized to `ctx.physical_size`, recreating the texture if needed.
    pub fn ensure(&mut self, ctx: &RenderCtx<'_>) -> &wgpu::TextureView {
        let size = [ctx.physical_size[0].max(1), ctx.physical_size[1].max(1)];
        let key = (size, ctx.surface_format);

        if self.current.as_ref().is_some_and(|a| a.key != key) {
            self.current = None;
        }

        let allocation = self
            .current
            .get_or_insert_with(|| Allocation::create(ctx.device, key));
        &allocation.view
    }
}

impl Allocation {
    fn create(device: &wgpu::Device, key: ([u32; 2], wgpu::TextureFormat)) -> Self {
        let ([width, height], format) = key;
        log::debug!("offscreen target -> {width}x{height}");

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("superstellar offscreen target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            key,
            _texture: texture,
            view,
        }
    }
}
