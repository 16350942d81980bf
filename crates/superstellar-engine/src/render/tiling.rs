use bytemuck::{Pod, Zeroable};

use crate::coords::Vec2;
use crate::paint::Color;
use crate::render::{GpuTexture, RenderCtx, RenderTarget};

use super::common::{
    begin_pass, linear_sampler, texture_layout_entries, triangle_list_primitive,
    uniform_binding_size, uniform_layout_entry,
};

/// Placement of a repeating texture layer.
///
/// The layer covers `(0, 0)..size` in logical pixels; the texture pattern is
/// shifted by `tile_offset` and wraps in both directions.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct TilingLayer {
    pub size: Vec2,
    pub tile_offset: Vec2,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct TilingUniform {
    viewport: [f32; 2],
    layer_size: [f32; 2],
    tile_offset: [f32; 2],
    texture_size: [f32; 2],
}

/// Full-bleed repeating background.
///
/// This is the base layer of a frame, so its pass clears the target first.
#[derive(Default)]
pub struct TilingRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,

    ubo: Option<wgpu::Buffer>,
    sampler: Option<wgpu::Sampler>,
    /// Bind group plus the id of the texture it was built for.
    bind_group: Option<(u64, wgpu::BindGroup)>,
}

impl TilingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        layer: TilingLayer,
        texture: &GpuTexture,
        clear: Color,
    ) {
        self.ensure_pipeline(ctx);
        self.ensure_bindings(ctx, texture);

        let uniform = TilingUniform {
            viewport: ctx.surface.to_uniform(),
            layer_size: layer.size.to_array(),
            tile_offset: layer.tile_offset.to_array(),
            texture_size: texture.size().to_array(),
        };

        let Some(ubo) = self.ubo.as_ref() else { return };
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&uniform));

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some((_, bind_group)) = self.bind_group.as_ref() else { return };

        let mut rpass = begin_pass(
            target.encoder,
            target.color_view,
            "superstellar tiling pass",
            wgpu::LoadOp::Clear(clear.to_wgpu()),
        );
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        // Two triangles generated from vertex_index; no vertex buffers.
        rpass.draw(0..6, 0..1);
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("superstellar tiling shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/tiling.wgsl").into()),
        });

        let [texture_entry, sampler_entry] = texture_layout_entries(1);
        let bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("superstellar tiling bgl"),
            entries: &[
                uniform_layout_entry(
                    0,
                    wgpu::ShaderStages::VERTEX,
                    uniform_binding_size::<TilingUniform>(),
                ),
                texture_entry,
                sampler_entry,
            ],
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("superstellar tiling pipeline layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("superstellar tiling pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: triangle_list_primitive(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bgl);
        self.bind_group = None;
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>, texture: &GpuTexture) {
        if self.ubo.is_none() {
            self.ubo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("superstellar tiling ubo"),
                size: std::mem::size_of::<TilingUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
        }
        if self.sampler.is_none() {
            self.sampler = Some(linear_sampler(
                ctx.device,
                "superstellar tiling sampler",
                wgpu::AddressMode::Repeat,
            ));
        }

        if self.bind_group.as_ref().is_some_and(|(id, _)| *id == texture.id()) {
            return;
        }
        let (Some(bgl), Some(ubo), Some(sampler)) = (
            self.bind_group_layout.as_ref(),
            self.ubo.as_ref(),
            self.sampler.as_ref(),
        ) else {
            return;
        };

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("superstellar tiling bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(texture.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });
        self.bind_group = Some((texture.id(), bind_group));
    }
}
