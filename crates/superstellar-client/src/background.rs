use superstellar_engine::coords::{SurfaceSize, Vec2};
use superstellar_engine::render::TilingLayer;

use crate::viewport::{translate_to_viewport, Viewport};

/// Full-bleed repeating star field that scrolls with the camera.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Background {
    layer: TilingLayer,
}

impl Background {
    pub fn new(surface: SurfaceSize) -> Self {
        Self {
            layer: TilingLayer {
                size: Vec2::new(surface.width, surface.height),
                tile_offset: Vec2::zero(),
            },
        }
    }

    /// The layer always covers the whole surface, whatever the viewport.
    pub fn resize(&mut self, surface: SurfaceSize) {
        self.layer.size = Vec2::new(surface.width, surface.height);
    }

    /// Anchors the tile pattern to the world origin.
    pub fn update(&mut self, viewport: &Viewport) {
        self.layer.tile_offset = translate_to_viewport(Vec2::zero(), viewport);
    }

    pub fn layer(&self) -> &TilingLayer {
        &self.layer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_offset_is_world_origin_on_screen() {
        let surface = SurfaceSize::new(800.0, 600.0);
        let mut bg = Background::new(surface);
        bg.update(&Viewport::new(Vec2::new(1234.0, -56.0), surface));
        assert_eq!(bg.layer().tile_offset, Vec2::new(-1234.0, 56.0));
    }

    #[test]
    fn resize_only_touches_layer_size() {
        let mut bg = Background::new(SurfaceSize::new(800.0, 600.0));
        bg.update(&Viewport::new(Vec2::new(10.0, 20.0), SurfaceSize::new(800.0, 600.0)));
        bg.resize(SurfaceSize::new(1024.0, 768.0));
        assert_eq!(bg.layer().size, Vec2::new(1024.0, 768.0));
        assert_eq!(bg.layer().tile_offset, Vec2::new(-10.0, -20.0));
    }
}
