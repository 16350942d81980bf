//! Full-screen filters (post-process passes).
//!
//! A filter is data, not a type hierarchy: a [`FilterShader`] names a WGSL
//! fragment program, and callers hand a [`FilterManager`] the shader, the
//! filter area, the raw uniform bytes and an input/output pair. The manager
//! owns everything GPU-side.
//!
//! Fragment programs are appended to a shared vertex stage and must declare:
//!
//! ```wgsl
//! @group(0) @binding(0) var<uniform> u: YourUniforms;
//! @group(0) @binding(1) var input_texture: texture_2d<f32>;
//! @group(0) @binding(2) var input_sampler: sampler;
//! @fragment fn fs_main(in: FilterVertexOut) -> @location(0) vec4<f32>
//! ```
//!
//! `in.uv` spans `0..1` across the filter area; multiply it by the
//! normalized screen-space matrix to get `0..1` across the whole surface.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};

use crate::coords::{Rect, SurfaceSize, Vec2};
use crate::render::RenderCtx;

use super::common::{begin_pass, linear_sampler, texture_layout_entries, triangle_list_primitive};

const FILTER_VERTEX_WGSL: &str = include_str!("shaders/filter_vertex.wgsl");

/// A filter fragment program.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FilterShader {
    /// Unique name; also the pipeline cache key.
    pub label: &'static str,
    pub fragment: &'static str,
}

/// 3×3 affine matrix in WGSL `mat3x3<f32>` uniform layout (three padded columns).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ScreenMatrix {
    pub columns: [[f32; 4]; 3],
}

impl ScreenMatrix {
    pub const IDENTITY: ScreenMatrix = ScreenMatrix {
        columns: [[1.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0]],
    };

    /// Scale then translate.
    pub fn from_scale_translation(scale: Vec2, translation: Vec2) -> Self {
        Self {
            columns: [
                [scale.x, 0.0, 0.0, 0.0],
                [0.0, scale.y, 0.0, 0.0],
                [translation.x, translation.y, 1.0, 0.0],
            ],
        }
    }

    /// Applies the matrix to a point (`w = 1`).
    pub fn transform_point(&self, p: Vec2) -> Vec2 {
        let [c0, c1, c2] = self.columns;
        Vec2::new(
            c0[0] * p.x + c1[0] * p.y + c2[0],
            c0[1] * p.x + c1[1] * p.y + c2[1],
        )
    }
}

impl Default for ScreenMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Maps filter-local coordinates (`0..1` across `area`) to normalized screen
/// coordinates (`0..1` across `surface`).
pub fn normalized_screen_space_matrix(area: Rect, surface: SurfaceSize) -> ScreenMatrix {
    let [w, h] = surface.to_uniform();
    ScreenMatrix::from_scale_translation(
        Vec2::new(area.size.x / w, area.size.y / h),
        Vec2::new(area.origin.x / w, area.origin.y / h),
    )
}

/// Engine-side filter application.
///
/// `Target` is whatever the manager reads from and renders into; the GPU
/// implementation uses texture views.
pub trait FilterManager {
    type Target: ?Sized;

    /// Current surface size in logical pixels.
    fn surface_size(&self) -> SurfaceSize;

    /// Matrix from filter-local to normalized screen space for `area`.
    fn normalized_screen_space_matrix(&self, area: Rect) -> ScreenMatrix {
        normalized_screen_space_matrix(area, self.surface_size())
    }

    /// Runs `shader` over `area`, sampling `input` and writing `output`.
    fn apply_filter(
        &mut self,
        shader: &FilterShader,
        area: Rect,
        uniforms: &[u8],
        input: &Self::Target,
        output: &Self::Target,
    );
}

/// GPU resources for filters, kept across frames.
#[derive(Default)]
pub struct FilterCache {
    format: Option<wgpu::TextureFormat>,
    sampler: Option<wgpu::Sampler>,
    pipelines: HashMap<&'static str, FilterPipeline>,
}

struct FilterPipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    ubo: wgpu::Buffer,
    ubo_size: u64,
}

impl FilterCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn prepare(&mut self, ctx: &RenderCtx<'_>, shader: &FilterShader, uniform_len: u64) {
        if self.format != Some(ctx.surface_format) {
            self.pipelines.clear();
            self.format = Some(ctx.surface_format);
        }
        if self.sampler.is_none() {
            self.sampler = Some(linear_sampler(
                ctx.device,
                "superstellar filter sampler",
                wgpu::AddressMode::ClampToEdge,
            ));
        }

        // Uniform blocks are 16-byte aligned in WGSL.
        let ubo_size = uniform_len.max(16).next_multiple_of(16);
        if self
            .pipelines
            .get(shader.label)
            .is_some_and(|p| p.ubo_size == ubo_size)
        {
            return;
        }

        log::debug!("building filter pipeline '{}'", shader.label);
        let pipeline = FilterPipeline::new(ctx, shader, ubo_size);
        self.pipelines.insert(shader.label, pipeline);
    }
}

impl FilterPipeline {
    fn new(ctx: &RenderCtx<'_>, shader: &FilterShader, ubo_size: u64) -> Self {
        let source = format!("{FILTER_VERTEX_WGSL}\n{}", shader.fragment);
        let module = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(shader.label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let [texture_entry, sampler_entry] = texture_layout_entries(1);
        let bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("superstellar filter bgl"),
                    entries: &[
                        wgpu::BindGroupLayoutEntry {
                            binding: 0,
                            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                            ty: wgpu::BindingType::Buffer {
                                ty: wgpu::BufferBindingType::Uniform,
                                has_dynamic_offset: false,
                                min_binding_size: std::num::NonZeroU64::new(ubo_size),
                            },
                            count: None,
                        },
                        texture_entry,
                        sampler_entry,
                    ],
                });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("superstellar filter pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(shader.label),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
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

        let ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("superstellar filter ubo"),
            size: ubo_size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            pipeline,
            bind_group_layout,
            ubo,
            ubo_size,
        }
    }
}

/// [`FilterManager`] recording into the current frame's encoder.
pub struct GpuFilterManager<'a> {
    ctx: &'a RenderCtx<'a>,
    encoder: &'a mut wgpu::CommandEncoder,
    cache: &'a mut FilterCache,
}

impl<'a> GpuFilterManager<'a> {
    pub fn new(
        ctx: &'a RenderCtx<'a>,
        encoder: &'a mut wgpu::CommandEncoder,
        cache: &'a mut FilterCache,
    ) -> Self {
        Self { ctx, encoder, cache }
    }
}

impl FilterManager for GpuFilterManager<'_> {
    type Target = wgpu::TextureView;

    fn surface_size(&self) -> SurfaceSize {
        self.ctx.surface
    }

    fn apply_filter(
        &mut self,
        shader: &FilterShader,
        area: Rect,
        uniforms: &[u8],
        input: &wgpu::TextureView,
        output: &wgpu::TextureView,
    ) {
        if area.is_empty() {
            return;
        }

        self.cache.prepare(self.ctx, shader, uniforms.len() as u64);
        let Some(filter) = self.cache.pipelines.get(shader.label) else { return };
        let Some(sampler) = self.cache.sampler.as_ref() else { return };

        // The buffer is padded to 16 bytes; the tail keeps whatever was last written.
        self.ctx.queue.write_buffer(&filter.ubo, 0, uniforms);

        let bind_group = self.ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("superstellar filter bind group"),
            layout: &filter.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: filter.ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(input),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        let scale = self.ctx.scale_factor;
        let [pw, ph] = self.ctx.physical_size;
        let x = (area.origin.x * scale).clamp(0.0, pw as f32);
        let y = (area.origin.y * scale).clamp(0.0, ph as f32);
        let w = (area.size.x * scale).min(pw as f32 - x);
        let h = (area.size.y * scale).min(ph as f32 - y);
        if w <= 0.0 || h <= 0.0 {
            return;
        }

        let mut rpass = begin_pass(self.encoder, output, shader.label, wgpu::LoadOp::Load);
        rpass.set_pipeline(&filter.pipeline);
        rpass.set_bind_group(0, &bind_group, &[]);
        rpass.set_viewport(x, y, w, h, 0.0, 1.0);
        rpass.draw(0..3, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6
    }

    #[test]
    fn full_surface_area_is_identity_mapping() {
        let surface = SurfaceSize::new(1024.0, 768.0);
        let m = normalized_screen_space_matrix(Rect::from_surface(surface), surface);
        assert_eq!(m, ScreenMatrix::IDENTITY);
    }

    #[test]
    fn partial_area_scales_and_offsets() {
        let surface = SurfaceSize::new(800.0, 600.0);
        let area = Rect::new(200.0, 150.0, 400.0, 300.0);
        let m = normalized_screen_space_matrix(area, surface);

        assert!(approx(m.transform_point(Vec2::zero()), Vec2::new(0.25, 0.25)));
        assert!(approx(m.transform_point(Vec2::new(1.0, 1.0)), Vec2::new(0.75, 0.75)));
    }

    #[test]
    fn zero_surface_does_not_produce_nan() {
        let m = normalized_screen_space_matrix(Rect::new(0.0, 0.0, 10.0, 10.0), SurfaceSize::default());
        assert!(m.columns.iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn matrix_matches_wgsl_mat3_layout() {
        assert_eq!(std::mem::size_of::<ScreenMatrix>(), 48);
    }
}
