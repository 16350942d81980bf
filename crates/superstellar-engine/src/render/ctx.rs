use crate::coords::SurfaceSize;
use crate::paint::Color;

use super::common::begin_pass;

/// Renderer-facing context (device/queue + surface format + sizes).
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
    pub surface: SurfaceSize, // logical px
    pub scale_factor: f32,
    pub physical_size: [u32; 2],
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        surface: SurfaceSize,
        scale_factor: f32,
        physical_size: [u32; 2],
    ) -> Self {
        Self {
            device,
            queue,
            surface_format,
            surface,
            scale_factor,
            physical_size,
        }
    }
}

/// Target for drawing (encoder + color view).
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(encoder: &'a mut wgpu::CommandEncoder, color_view: &'a wgpu::TextureView) -> Self {
        Self { encoder, color_view }
    }

    /// Records a pass that only clears the color attachment.
    pub fn clear(&mut self, color: Color) {
        let _pass = begin_pass(
            self.encoder,
            self.color_view,
            "superstellar clear",
            wgpu::LoadOp::Clear(color.to_wgpu()),
        );
    }

    /// Same encoder, different color attachment.
    #[inline]
    pub fn retarget<'b>(&'b mut self, color_view: &'b wgpu::TextureView) -> RenderTarget<'b> {
        RenderTarget {
            encoder: &mut *self.encoder,
            color_view,
        }
    }
}
