//! Annulus fog: a full-screen filter darkening everything outside a ring
//! around the world origin, evaluated relative to the tracked ship's cell.

use bytemuck::{Pod, Zeroable};

use superstellar_engine::coords::{Rect, SurfaceSize, Vec2};
use superstellar_engine::render::{FilterManager, FilterShader, ScreenMatrix};

/// World units per fog cell.
pub const CELL_SIZE: f32 = 100.0;

/// Inner and outer fog radius, in cells.
pub const WORLD_SIZE: [f32; 2] = [1000.0, 1400.0];

pub static ANNULUS_FOG: FilterShader = FilterShader {
    label: "annulus fog",
    fragment: include_str!("shaders/annulus_fog.wgsl"),
};

/// Uniform block of `annulus_fog.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct FogUniforms {
    pub world_coordinates: [f32; 2],
    pub world_size: [f32; 2],
    pub dimensions: [f32; 4],
    pub magic_matrix: ScreenMatrix,
}

/// The fog filter's state between frames.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FogEffect {
    uniforms: FogUniforms,
    filter_area: Rect,
}

impl FogEffect {
    pub fn new(surface: SurfaceSize) -> Self {
        Self {
            uniforms: FogUniforms {
                world_coordinates: [0.0, 0.0],
                world_size: WORLD_SIZE,
                dimensions: [surface.width, surface.height, 0.0, 0.0],
                magic_matrix: ScreenMatrix::IDENTITY,
            },
            filter_area: Rect::from_surface(surface),
        }
    }

    pub fn resize(&mut self, surface: SurfaceSize) {
        self.filter_area = Rect::from_surface(surface);
        self.uniforms.dimensions[0] = surface.width;
        self.uniforms.dimensions[1] = surface.height;
    }

    /// Moves the fog anchor to the cell containing `position`.
    ///
    /// With nothing tracked the anchor stays where it was.
    pub fn track(&mut self, position: Option<Vec2>) {
        if let Some(position) = position {
            self.uniforms.world_coordinates = world_cell(position);
        }
    }

    pub fn uniforms(&self) -> &FogUniforms {
        &self.uniforms
    }

    pub fn world_coordinates(&self) -> [f32; 2] {
        self.uniforms.world_coordinates
    }

    pub fn dimensions(&self) -> [f32; 4] {
        self.uniforms.dimensions
    }

    pub fn filter_area(&self) -> Rect {
        self.filter_area
    }
}

/// `floor(position / CELL_SIZE)` per axis.
pub fn world_cell(position: Vec2) -> [f32; 2] {
    [(position.x / CELL_SIZE).floor(), (position.y / CELL_SIZE).floor()]
}

/// Runs the fog pass: `input` holds the scene drawn so far, `output` receives it fogged.
pub fn apply<M>(fog: &mut FogEffect, manager: &mut M, input: &M::Target, output: &M::Target)
where
    M: FilterManager + ?Sized,
{
    fog.uniforms.magic_matrix = manager.normalized_screen_space_matrix(fog.filter_area);
    manager.apply_filter(
        &ANNULUS_FOG,
        fog.filter_area,
        bytemuck::bytes_of(&fog.uniforms),
        input,
        output,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use superstellar_engine::render::normalized_screen_space_matrix;

    #[derive(Default)]
    struct RecordingManager {
        surface: SurfaceSize,
        calls: Vec<(&'static str, Rect, Vec<u8>, u32, u32)>,
    }

    impl FilterManager for RecordingManager {
        type Target = u32;

        fn surface_size(&self) -> SurfaceSize {
            self.surface
        }

        fn apply_filter(&mut self, shader: &FilterShader, area: Rect, uniforms: &[u8], input: &u32, output: &u32) {
            self.calls.push((shader.label, area, uniforms.to_vec(), *input, *output));
        }
    }

    #[test]
    fn world_cell_floors_toward_negative_infinity() {
        assert_eq!(world_cell(Vec2::new(250.0, -50.0)), [2.0, -1.0]);
        assert_eq!(world_cell(Vec2::new(0.0, 99.9)), [0.0, 0.0]);
        assert_eq!(world_cell(Vec2::new(-100.0, 100.0)), [-1.0, 1.0]);
    }

    #[test]
    fn untracked_frame_keeps_last_anchor() {
        let mut fog = FogEffect::new(SurfaceSize::new(800.0, 600.0));
        assert_eq!(fog.world_coordinates(), [0.0, 0.0]);
        fog.track(Some(Vec2::new(250.0, -50.0)));
        fog.track(None);
        assert_eq!(fog.world_coordinates(), [2.0, -1.0]);
    }

    #[test]
    fn resize_updates_area_and_dimensions() {
        let mut fog = FogEffect::new(SurfaceSize::new(800.0, 600.0));
        fog.resize(SurfaceSize::new(1024.0, 768.0));
        assert_eq!(fog.dimensions(), [1024.0, 768.0, 0.0, 0.0]);
        assert_eq!(fog.filter_area(), Rect::new(0.0, 0.0, 1024.0, 768.0));
        assert_eq!(fog.uniforms().world_size, WORLD_SIZE);
    }

    #[test]
    fn apply_stores_matrix_and_forwards_uniforms() {
        let surface = SurfaceSize::new(1024.0, 768.0);
        let mut fog = FogEffect::new(surface);
        fog.track(Some(Vec2::new(250.0, -50.0)));

        let mut manager = RecordingManager { surface, ..Default::default() };
        apply(&mut fog, &mut manager, &1, &2);

        let expected = normalized_screen_space_matrix(fog.filter_area(), surface);
        assert_eq!(fog.uniforms().magic_matrix, expected);

        assert_eq!(manager.calls.len(), 1);
        let (label, area, bytes, input, output) = &manager.calls[0];
        assert_eq!(*label, ANNULUS_FOG.label);
        assert_eq!(*area, fog.filter_area());
        assert_eq!(bytes.as_slice(), bytemuck::bytes_of(fog.uniforms()));
        assert_eq!((*input, *output), (1, 2));
    }

    #[test]
    fn uniform_block_matches_wgsl_size() {
        // vec2 + vec2 + vec4 + mat3x3 (three 16-byte columns).
        assert_eq!(std::mem::size_of::<FogUniforms>(), 80);
    }
}
