use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};

use crate::coords::Vec2;
use crate::render::{GpuTexture, RenderCtx, RenderTarget};

use super::common::{
    begin_pass, ensure_instance_capacity, linear_sampler, premul_alpha_blend,
    texture_layout_entries, triangle_list_primitive, uniform_binding_size, uniform_layout_entry,
    QuadBuffers, QuadVertex, ViewportUniform,
};

/// One textured quad, positioned by its center in logical pixels.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    pub center: [f32; 2],
    pub size: [f32; 2],
    pub uv_min: [f32; 2],
    pub uv_max: [f32; 2],
    /// Clockwise rotation on screen, radians.
    pub rotation: f32,
    pub alpha: f32,
}

impl SpriteInstance {
    /// Full-texture sprite at `center`.
    pub fn new(center: Vec2, size: Vec2, rotation: f32) -> Self {
        Self {
            center: center.to_array(),
            size: size.to_array(),
            uv_min: [0.0, 0.0],
            uv_max: [1.0, 1.0],
            rotation,
            alpha: 1.0,
        }
    }

    /// Restricts sampling to a sub-rectangle of the texture (sprite-sheet frame).
    pub fn with_uv(mut self, uv_min: [f32; 2], uv_max: [f32; 2]) -> Self {
        self.uv_min = uv_min;
        self.uv_max = uv_max;
        self
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha.clamp(0.0, 1.0);
        self
    }

    const ATTRS: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
        1 => Float32x2, // center
        2 => Float32x2, // size
        3 => Float32x2, // uv_min
        4 => Float32x2, // uv_max
        5 => Float32,   // rotation
        6 => Float32    // alpha
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

/// Instances sharing one texture, drawn in order.
pub struct SpriteBatch<'a> {
    pub texture: &'a GpuTexture,
    pub instances: &'a [SpriteInstance],
}

/// Textured, rotated quads (ships, flames, projectiles).
///
/// All batches of a frame are uploaded into one instance buffer and drawn in a
/// single pass, one instanced draw per batch.
#[derive(Default)]
pub struct SpriteRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,

    viewport_bgl: Option<wgpu::BindGroupLayout>,
    texture_bgl: Option<wgpu::BindGroupLayout>,
    viewport_bind_group: Option<wgpu::BindGroup>,
    viewport_ubo: Option<wgpu::Buffer>,
    sampler: Option<wgpu::Sampler>,

    /// Texture id → bind group.
    texture_bind_groups: HashMap<u64, wgpu::BindGroup>,

    quad: Option<QuadBuffers>,
    instance_vbo: Option<wgpu::Buffer>,
    instance_capacity: usize,
}

impl SpriteRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws every batch on top of the current contents of `target`.
    ///
    /// Call at most once per frame.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        batches: &[SpriteBatch<'_>],
    ) {
        let total: usize = batches.iter().map(|b| b.instances.len()).sum();
        if total == 0 {
            return;
        }

        self.ensure_pipeline(ctx);
        self.ensure_bindings(ctx);
        if self.quad.is_none() {
            self.quad = Some(QuadBuffers::new(ctx.device, "superstellar sprite"));
        }
        for batch in batches {
            self.ensure_texture_bind_group(ctx, batch.texture);
        }

        let mut raw: Vec<SpriteInstance> = Vec::with_capacity(total);
        for batch in batches {
            raw.extend_from_slice(batch.instances);
        }

        if let Some(ubo) = self.viewport_ubo.as_ref() {
            ctx.queue
                .write_buffer(ubo, 0, bytemuck::bytes_of(&ViewportUniform::new(ctx.surface)));
        }
        ensure_instance_capacity::<SpriteInstance>(
            ctx.device,
            "superstellar sprite instance vbo",
            &mut self.instance_vbo,
            &mut self.instance_capacity,
            raw.len(),
        );

        let Some(instance_vbo) = self.instance_vbo.as_ref() else { return };
        ctx.queue.write_buffer(instance_vbo, 0, bytemuck::cast_slice(&raw));

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(viewport_bind_group) = self.viewport_bind_group.as_ref() else { return };
        let Some(quad) = self.quad.as_ref() else { return };

        let mut rpass = begin_pass(
            target.encoder,
            target.color_view,
            "superstellar sprite pass",
            wgpu::LoadOp::Load,
        );

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, viewport_bind_group, &[]);
        rpass.set_vertex_buffer(0, quad.vbo.slice(..));
        rpass.set_vertex_buffer(1, instance_vbo.slice(..));
        rpass.set_index_buffer(quad.ibo.slice(..), wgpu::IndexFormat::Uint16);

        let mut first = 0u32;
        for batch in batches {
            let count = batch.instances.len() as u32;
            if count == 0 {
                continue;
            }
            if let Some(bg) = self.texture_bind_groups.get(&batch.texture.id()) {
                rpass.set_bind_group(1, bg, &[]);
                rpass.draw_indexed(0..6, 0, first..first + count);
            }
            first += count;
        }
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("superstellar sprite shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/sprite.wgsl").into()),
        });

        let viewport_bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("superstellar sprite viewport bgl"),
            entries: &[uniform_layout_entry(
                0,
                wgpu::ShaderStages::VERTEX,
                uniform_binding_size::<ViewportUniform>(),
            )],
        });

        let texture_bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("superstellar sprite texture bgl"),
            entries: &texture_layout_entries(0),
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("superstellar sprite pipeline layout"),
            bind_group_layouts: &[&viewport_bgl, &texture_bgl],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("superstellar sprite pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::layout(), SpriteInstance::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(premul_alpha_blend()),
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
        self.viewport_bgl = Some(viewport_bgl);
        self.texture_bgl = Some(texture_bgl);

        // Layouts changed: every bind group must be rebuilt.
        self.viewport_bind_group = None;
        self.viewport_ubo = None;
        self.texture_bind_groups.clear();
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.sampler.is_none() {
            self.sampler = Some(linear_sampler(
                ctx.device,
                "superstellar sprite sampler",
                wgpu::AddressMode::ClampToEdge,
            ));
        }

        if self.viewport_bind_group.is_some() && self.viewport_ubo.is_some() {
            return;
        }
        let Some(bgl) = self.viewport_bgl.as_ref() else { return };

        let viewport_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("superstellar sprite viewport ubo"),
            size: std::mem::size_of::<ViewportUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("superstellar sprite viewport bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport_ubo.as_entire_binding(),
            }],
        });

        self.viewport_ubo = Some(viewport_ubo);
        self.viewport_bind_group = Some(bind_group);
    }

    fn ensure_texture_bind_group(&mut self, ctx: &RenderCtx<'_>, texture: &GpuTexture) {
        if self.texture_bind_groups.contains_key(&texture.id()) {
            return;
        }
        let (Some(bgl), Some(sampler)) = (self.texture_bgl.as_ref(), self.sampler.as_ref()) else {
            return;
        };

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("superstellar sprite texture bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(texture.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });
        self.texture_bind_groups.insert(texture.id(), bind_group);
    }
}
