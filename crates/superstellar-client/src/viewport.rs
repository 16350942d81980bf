//! Camera: which part of the world is on screen.

use superstellar_engine::coords::{Rect, SurfaceSize, Vec2};

/// World-space rectangle currently visible on the surface.
///
/// The camera only pans: `width`/`height` always equal the surface size, so
/// one world unit maps to one logical pixel.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub origin: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(origin: Vec2, surface: SurfaceSize) -> Self {
        Self {
            origin,
            width: surface.width,
            height: surface.height,
        }
    }

    /// Viewport used while nothing is tracked: the surface anchored at the world origin.
    pub fn untracked(surface: SurfaceSize) -> Self {
        Self::new(Vec2::zero(), surface)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// The visible region in world coordinates.
    pub fn world_rect(&self) -> Rect {
        Rect::from_origin_size(self.origin, self.size())
    }
}

/// An entity the camera can follow.
pub trait TrackedEntity {
    /// World position.
    fn position(&self) -> Vec2;

    /// Viewport with this entity as the camera subject.
    fn viewport(&self, surface: SurfaceSize) -> Viewport {
        Viewport::new(self.position() - Vec2::new(surface.width, surface.height) / 2.0, surface)
    }
}

/// Per-frame hook for anything that derives screen state from the viewport.
pub trait ViewportUpdate {
    fn update(&mut self, viewport: &Viewport);
}

pub fn compute_viewport<E>(tracked: Option<&E>, surface: SurfaceSize) -> Viewport
where
    E: TrackedEntity + ?Sized,
{
    match tracked {
        Some(entity) => entity.viewport(surface),
        None => Viewport::untracked(surface),
    }
}

/// World point to surface point (logical px) for the given viewport.
#[inline]
pub fn translate_to_viewport(world: Vec2, viewport: &Viewport) -> Vec2 {
    world - viewport.origin
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe(Vec2);

    impl TrackedEntity for Probe {
        fn position(&self) -> Vec2 {
            self.0
        }
    }

    const SURFACE: SurfaceSize = SurfaceSize::new(800.0, 600.0);

    #[test]
    fn untracked_viewport_covers_surface_at_origin() {
        let vp = compute_viewport::<Probe>(None, SURFACE);
        assert_eq!(vp, Viewport { origin: Vec2::zero(), width: 800.0, height: 600.0 });
    }

    #[test]
    fn tracked_viewport_size_does_not_depend_on_position() {
        for pos in [Vec2::zero(), Vec2::new(12_345.0, -999.5), Vec2::new(-1.0e6, 3.0)] {
            let vp = compute_viewport(Some(&Probe(pos)), SURFACE);
            assert_eq!((vp.width, vp.height), (800.0, 600.0));
        }
    }

    #[test]
    fn tracked_entity_sits_at_screen_center() {
        let probe = Probe(Vec2::new(1000.0, 2000.0));
        let vp = compute_viewport(Some(&probe), SURFACE);
        assert_eq!(vp.origin, Vec2::new(600.0, 1700.0));
        assert_eq!(translate_to_viewport(probe.position(), &vp), Vec2::new(400.0, 300.0));
    }

    #[test]
    fn world_origin_translates_to_negated_viewport_origin() {
        let vp = Viewport::new(Vec2::new(350.0, -120.0), SURFACE);
        assert_eq!(translate_to_viewport(Vec2::zero(), &vp), Vec2::new(-350.0, 120.0));
    }

    #[test]
    fn trait_objects_can_be_tracked() {
        let probe = Probe(Vec2::new(400.0, 300.0));
        let dyn_probe: &dyn TrackedEntity = &probe;
        let vp = compute_viewport(Some(dyn_probe), SURFACE);
        assert_eq!(vp.origin, Vec2::zero());
    }
}
