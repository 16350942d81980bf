//! Ships and projectiles as the renderer sees them.
//!
//! World state (position, velocity, facing, hit points) is written by the
//! message layer; screen placement is derived once per frame from the viewport.

use superstellar_engine::coords::Vec2;

use crate::assets::FrameGrid;
use crate::viewport::{translate_to_viewport, TrackedEntity, Viewport, ViewportUpdate};

pub type ClientId = u32;

/// Entities further than this outside the viewport are not drawn.
pub const CULL_MARGIN: f32 = 128.0;

const FLAME_FPS: f32 = 12.0;
const PROJECTILE_FPS: f32 = 16.0;
/// Projectiles fade out over their last moments.
const PROJECTILE_FADE: f32 = 0.2;

/// Screen position computed by the last viewport update.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ScreenPlacement {
    pub position: Vec2,
    pub visible: bool,
}

impl ScreenPlacement {
    fn compute(world: Vec2, viewport: &Viewport) -> Self {
        Self {
            position: translate_to_viewport(world, viewport),
            visible: viewport.world_rect().inflate(CULL_MARGIN).contains(world),
        }
    }
}

fn animation_frame(time: f32, fps: f32, grid: FrameGrid) -> u32 {
    let frames = grid.frame_count().max(1);
    ((time.max(0.0) * fps) as u32) % frames
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spaceship {
    pub id: ClientId,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Radians, `0` = +X, clockwise on screen.
    pub facing: f32,
    pub thrust: bool,
    pub hp: u32,
    pub max_hp: u32,
    pub energy: u32,
    pub max_energy: u32,
    screen: ScreenPlacement,
    clock: f32,
}

impl Spaceship {
    pub const DEFAULT_MAX_HP: u32 = 200;
    pub const DEFAULT_MAX_ENERGY: u32 = 500;

    pub fn new(id: ClientId, position: Vec2) -> Self {
        Self {
            id,
            position,
            velocity: Vec2::zero(),
            facing: 0.0,
            thrust: false,
            hp: Self::DEFAULT_MAX_HP,
            max_hp: Self::DEFAULT_MAX_HP,
            energy: Self::DEFAULT_MAX_ENERGY,
            max_energy: Self::DEFAULT_MAX_ENERGY,
            screen: ScreenPlacement::default(),
            clock: 0.0,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_facing(mut self, facing: f32) -> Self {
        self.facing = facing;
        self
    }

    pub fn with_thrust(mut self, thrust: bool) -> Self {
        self.thrust = thrust;
        self
    }

    pub fn screen(&self) -> ScreenPlacement {
        self.screen
    }

    pub fn hp_ratio(&self) -> f32 {
        ratio(self.hp, self.max_hp)
    }

    pub fn energy_ratio(&self) -> f32 {
        ratio(self.energy, self.max_energy)
    }

    /// Integrates position over `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        self.position += self.velocity * dt;
    }

    /// Advances sprite animation only.
    pub fn animate(&mut self, dt: f32) {
        self.clock += dt;
    }

    pub fn flame_frame(&self, grid: FrameGrid) -> u32 {
        animation_frame(self.clock, FLAME_FPS, grid)
    }
}

fn ratio(value: u32, max: u32) -> f32 {
    if max == 0 {
        0.0
    } else {
        (value as f32 / max as f32).clamp(0.0, 1.0)
    }
}

impl TrackedEntity for Spaceship {
    fn position(&self) -> Vec2 {
        self.position
    }
}

impl ViewportUpdate for Spaceship {
    fn update(&mut self, viewport: &Viewport) {
        self.screen = ScreenPlacement::compute(self.position, viewport);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub id: u32,
    pub owner: Option<ClientId>,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Seconds the projectile lives for.
    pub ttl: f32,
    age: f32,
    clock: f32,
    screen: ScreenPlacement,
}

impl Projectile {
    pub fn new(id: u32, position: Vec2, velocity: Vec2, ttl: f32) -> Self {
        Self {
            id,
            owner: None,
            position,
            velocity,
            ttl,
            age: 0.0,
            clock: 0.0,
            screen: ScreenPlacement::default(),
        }
    }

    pub fn with_owner(mut self, owner: ClientId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn screen(&self) -> ScreenPlacement {
        self.screen
    }

    /// Heading derived from velocity.
    pub fn facing(&self) -> f32 {
        self.velocity.y.atan2(self.velocity.x)
    }

    pub fn is_expired(&self) -> bool {
        self.age >= self.ttl
    }

    /// Integrates position and lifetime over `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        self.position += self.velocity * dt;
        self.age += dt;
    }

    /// Advances sprite animation only.
    pub fn animate(&mut self, dt: f32) {
        self.clock += dt;
    }

    pub fn frame(&self, grid: FrameGrid) -> u32 {
        animation_frame(self.clock, PROJECTILE_FPS, grid)
    }

    /// `1.0` for most of the lifetime, ramping to `0.0` at expiry.
    pub fn opacity(&self) -> f32 {
        ((self.ttl - self.age) / PROJECTILE_FADE).clamp(0.0, 1.0)
    }
}

impl ViewportUpdate for Projectile {
    fn update(&mut self, viewport: &Viewport) {
        self.screen = ScreenPlacement::compute(self.position, viewport);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use superstellar_engine::coords::SurfaceSize;

    const SURFACE: SurfaceSize = SurfaceSize::new(800.0, 600.0);

    #[test]
    fn ship_camera_is_centered_on_ship() {
        let ship = Spaceship::new(1, Vec2::new(250.0, -50.0));
        let vp = ship.viewport(SURFACE);
        assert_eq!(vp.origin, Vec2::new(-150.0, -350.0));
        assert_eq!(vp.size(), Vec2::new(800.0, 600.0));
    }

    #[test]
    fn update_places_ship_on_screen() {
        let mut ship = Spaceship::new(1, Vec2::new(500.0, 400.0));
        ship.update(&Viewport::new(Vec2::new(100.0, 100.0), SURFACE));
        assert_eq!(ship.screen(), ScreenPlacement { position: Vec2::new(400.0, 300.0), visible: true });
    }

    #[test]
    fn far_away_entities_are_culled() {
        let vp = Viewport::untracked(SURFACE);
        let mut near = Projectile::new(1, Vec2::new(-CULL_MARGIN / 2.0, 10.0), Vec2::zero(), 1.0);
        let mut far = Projectile::new(2, Vec2::new(5000.0, 10.0), Vec2::zero(), 1.0);
        near.update(&vp);
        far.update(&vp);
        assert!(near.screen().visible);
        assert!(!far.screen().visible);
        assert_eq!(far.screen().position, Vec2::new(5000.0, 10.0));
    }

    #[test]
    fn ratios_are_clamped_and_safe() {
        let mut ship = Spaceship::new(1, Vec2::zero());
        ship.hp = 50;
        ship.max_hp = 200;
        assert_eq!(ship.hp_ratio(), 0.25);
        ship.energy = 900;
        assert_eq!(ship.energy_ratio(), 1.0);
        ship.max_energy = 0;
        assert_eq!(ship.energy_ratio(), 0.0);
    }

    #[test]
    fn projectile_expires_after_ttl() {
        let mut p = Projectile::new(7, Vec2::zero(), Vec2::new(100.0, 0.0), 0.5);
        p.advance(0.25);
        assert!(!p.is_expired());
        assert_eq!(p.position, Vec2::new(25.0, 0.0));
        p.advance(0.25);
        assert!(p.is_expired());
    }

    #[test]
    fn animation_cycles_through_sheet() {
        let grid = FrameGrid::new(4, 1);
        let mut ship = Spaceship::new(1, Vec2::zero());
        assert_eq!(ship.flame_frame(grid), 0);
        ship.animate(1.0 / FLAME_FPS * 5.5);
        assert_eq!(ship.flame_frame(grid), 1);
    }

    #[test]
    fn projectile_animates_without_moving() {
        let grid = FrameGrid::new(4, 1);
        let mut p = Projectile::new(3, Vec2::new(10.0, 20.0), Vec2::new(50.0, 0.0), 1.0);
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..60 {
            p.animate(1.0 / 60.0);
            seen.insert(p.frame(grid));
        }
        assert_eq!(seen.len(), 4);
        assert_eq!(p.position, Vec2::new(10.0, 20.0));
        assert!(!p.is_expired());
    }

    #[test]
    fn projectile_fades_near_expiry() {
        let mut p = Projectile::new(4, Vec2::zero(), Vec2::zero(), 1.0);
        assert_eq!(p.opacity(), 1.0);
        p.advance(0.9);
        assert!((p.opacity() - 0.5).abs() < 1e-4);
        p.advance(0.2);
        assert_eq!(p.opacity(), 0.0);
    }
}
