use superstellar_engine::coords::SurfaceSize;

use crate::background::Background;
use crate::fog::FogEffect;
use crate::hud::Hud;
use crate::state::GameState;
use crate::viewport::{compute_viewport, TrackedEntity, Viewport, ViewportUpdate};

/// Everything the frame driver and the resize handler share.
///
/// Owned by the application and only touched from the event-loop thread.
#[derive(Debug, Clone)]
pub struct SceneContext {
    surface: SurfaceSize,
    background: Background,
    fog: FogEffect,
    hud: Hud,
}

impl SceneContext {
    /// Builds the scene layers in draw order: background, fog, HUD.
    pub fn new(surface: SurfaceSize) -> Self {
        let mut hud = Hud::new();
        hud.set_position(surface.width - Hud::RIGHT_OFFSET);

        Self {
            surface,
            background: Background::new(surface),
            fog: FogEffect::new(surface),
            hud,
        }
    }

    pub fn surface(&self) -> SurfaceSize {
        self.surface
    }

    /// Propagates a new surface size to every layer.
    pub fn resize(&mut self, surface: SurfaceSize) {
        self.surface = surface;
        self.background.resize(surface);
        self.fog.resize(surface);
        self.hud.set_position(surface.width - Hud::RIGHT_OFFSET);
    }

    /// Frame update: camera, background, entities, HUD, fog anchor.
    pub fn update(&mut self, state: &mut GameState) -> Viewport {
        let tracked = state.tracked_spaceship();
        let viewport = compute_viewport(tracked, self.surface);
        let tracked_position = tracked.map(TrackedEntity::position);

        self.background.update(&viewport);

        for ship in state.spaceships_mut() {
            ship.update(&viewport);
        }
        for projectile in state.projectiles_mut() {
            projectile.update(&viewport);
        }

        self.hud.update(state.tracked_spaceship());
        self.fog.track(tracked_position);

        viewport
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn fog(&self) -> &FogEffect {
        &self.fog
    }

    pub fn fog_mut(&mut self) -> &mut FogEffect {
        &mut self.fog
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Projectile, Spaceship};
    use superstellar_engine::coords::Vec2;

    #[test]
    fn resize_propagates_to_every_layer() {
        let mut scene = SceneContext::new(SurfaceSize::new(800.0, 600.0));
        assert_eq!(scene.hud().position(), 800.0 - Hud::RIGHT_OFFSET);

        scene.resize(SurfaceSize::new(1024.0, 768.0));

        assert_eq!(scene.surface(), SurfaceSize::new(1024.0, 768.0));
        assert_eq!(scene.background().layer().size, Vec2::new(1024.0, 768.0));
        assert_eq!(scene.fog().dimensions(), [1024.0, 768.0, 0.0, 0.0]);
        assert_eq!(scene.fog().filter_area().size, Vec2::new(1024.0, 768.0));
        assert_eq!(scene.hud().position(), 1024.0 - Hud::RIGHT_OFFSET);
    }

    #[test]
    fn update_follows_tracked_ship() {
        let mut scene = SceneContext::new(SurfaceSize::new(800.0, 600.0));
        let mut state = GameState::new();
        state.upsert_spaceship(Spaceship::new(7, Vec2::new(250.0, -50.0)));
        state.upsert_spaceship(Spaceship::new(8, Vec2::new(450.0, -50.0)));
        state.add_projectile(Projectile::new(1, Vec2::new(250.0, 50.0), Vec2::zero(), 1.0));
        state.set_client_id(7);

        let viewport = scene.update(&mut state);

        assert_eq!(viewport.origin, Vec2::new(-150.0, -350.0));
        assert_eq!(scene.background().layer().tile_offset, Vec2::new(150.0, 350.0));
        assert_eq!(scene.fog().world_coordinates(), [2.0, -1.0]);
        assert!(scene.hud().hp().is_some());

        let other = state.spaceship(8).expect("ship 8");
        assert_eq!(other.screen().position, Vec2::new(600.0, 300.0));
        assert_eq!(state.projectiles()[0].screen().position, Vec2::new(400.0, 400.0));
    }

    #[test]
    fn update_without_tracked_ship_uses_default_viewport() {
        let mut scene = SceneContext::new(SurfaceSize::new(800.0, 600.0));
        let mut state = GameState::new();
        state.upsert_spaceship(Spaceship::new(3, Vec2::new(100.0, 100.0)));

        let viewport = scene.update(&mut state);

        assert_eq!(viewport, Viewport::untracked(SurfaceSize::new(800.0, 600.0)));
        assert_eq!(scene.background().layer().tile_offset, Vec2::zero());
        assert_eq!(scene.fog().world_coordinates(), [0.0, 0.0]);
        assert!(scene.hud().hp().is_none());
        assert_eq!(state.spaceship(3).expect("ship").screen().position, Vec2::new(100.0, 100.0));
    }
}
