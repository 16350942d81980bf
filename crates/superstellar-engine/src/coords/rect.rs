use super::{SurfaceSize, Vec2};

/// Axis-aligned rectangle (top-left origin).
///
/// Used for filter areas (logical px) and for on-screen culling of sprites.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub const fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Rectangle covering the whole surface.
    #[inline]
    pub const fn from_surface(surface: SurfaceSize) -> Self {
        Self::new(0.0, 0.0, surface.width, surface.height)
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        Vec2::new(self.origin.x + self.size.x, self.origin.y + self.size.y)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// Grows the rectangle by `margin` on every side.
    #[inline]
    pub fn inflate(self, margin: f32) -> Self {
        Rect::new(
            self.origin.x - margin,
            self.origin.y - margin,
            self.size.x + margin * 2.0,
            self.size.y + margin * 2.0,
        )
    }

    /// Half-open containment: [min, max).
    #[inline]
    pub fn contains(self, p: Vec2) -> bool {
        let max = self.max();
        p.x >= self.origin.x && p.y >= self.origin.y && p.x < max.x && p.y < max.y
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: f32, y: f32, w: f32, h: f32) -> Rect { Rect::new(x, y, w, h) }

    #[test]
    fn from_surface_starts_at_origin() {
        let rect = Rect::from_surface(SurfaceSize::new(1024.0, 768.0));
        assert_eq!(rect, r(0.0, 0.0, 1024.0, 768.0));
    }

    #[test]
    fn inflate_grows_every_side() {
        assert_eq!(r(10.0, 10.0, 5.0, 5.0).inflate(2.0), r(8.0, 8.0, 9.0, 9.0));
    }

    #[test]
    fn contains_is_half_open() {
        let screen = r(0.0, 0.0, 10.0, 10.0);
        assert!(screen.contains(Vec2::new(0.0, 0.0)));
        assert!(!screen.contains(Vec2::new(10.0, 10.0)));
        assert!(!screen.contains(Vec2::new(-1.0, 5.0)));
    }

    #[test]
    fn empty_when_any_axis_collapses() {
        assert!(r(0.0, 0.0, 0.0, 5.0).is_empty());
        assert!(!r(0.0, 0.0, 1.0, 1.0).is_empty());
    }
}
