//! GPU side of the client: textures and the per-frame draw sequence.

use anyhow::{Context, Result};

use superstellar_engine::coords::Vec2;
use superstellar_engine::paint::Color;
use superstellar_engine::render::{
    FilterCache, GpuFilterManager, GpuTexture, OffscreenTarget, RectFill, RectRenderer, RenderCtx,
    RenderTarget, SpriteBatch, SpriteInstance, SpriteRenderer, TilingLayer, TilingRenderer,
};

use crate::assets::{AssetId, AssetSet, FrameGrid};
use crate::fog;
use crate::hud;
use crate::scene::SceneContext;
use crate::state::GameState;

const SPACE: Color = Color::BLACK;

/// A texture plus the frame layout it was loaded with.
pub struct SheetTexture {
    pub texture: GpuTexture,
    pub grid: FrameGrid,
}

impl SheetTexture {
    fn upload(device: &wgpu::Device, queue: &wgpu::Queue, assets: &AssetSet, id: AssetId) -> Result<Self> {
        let asset = assets.get(id)?;
        let texture = GpuTexture::from_rgba8(
            device,
            queue,
            id.file_name(),
            asset.image.width,
            asset.image.height,
            &asset.image.pixels,
        )
        .with_context(|| format!("failed to upload {}", id.file_name()))?;

        Ok(Self { texture, grid: asset.grid })
    }

    /// Size of one frame in logical pixels.
    pub fn frame_size(&self) -> Vec2 {
        let size = self.texture.size();
        Vec2::new(
            size.x / self.grid.columns.max(1) as f32,
            size.y / self.grid.rows.max(1) as f32,
        )
    }

    fn sprite_layout(&self) -> SpriteLayout {
        SpriteLayout {
            frame_size: self.frame_size(),
            grid: self.grid,
        }
    }
}

pub struct GameTextures {
    pub ship: SheetTexture,
    pub background: SheetTexture,
    pub flame: SheetTexture,
    pub projectile: SheetTexture,
}

impl GameTextures {
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, assets: &AssetSet) -> Result<Self> {
        Ok(Self {
            ship: SheetTexture::upload(device, queue, assets, AssetId::Ship)?,
            background: SheetTexture::upload(device, queue, assets, AssetId::Background)?,
            flame: SheetTexture::upload(device, queue, assets, AssetId::Flame)?,
            projectile: SheetTexture::upload(device, queue, assets, AssetId::Projectile)?,
        })
    }

    fn layouts(&self) -> SpriteLayouts {
        SpriteLayouts {
            ship: self.ship.sprite_layout(),
            flame: self.flame.sprite_layout(),
            projectile: self.projectile.sprite_layout(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SpriteLayout {
    pub frame_size: Vec2,
    pub grid: FrameGrid,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SpriteLayouts {
    pub ship: SpriteLayout,
    pub flame: SpriteLayout,
    pub projectile: SpriteLayout,
}

/// Sprite instances of one frame, one list per texture.
#[derive(Debug, Default, PartialEq)]
pub struct SpriteLists {
    pub flames: Vec<SpriteInstance>,
    pub ships: Vec<SpriteInstance>,
    pub projectiles: Vec<SpriteInstance>,
}

/// Builds sprites from the screen placements computed by the last scene update.
///
/// Textures point along +X; a thrusting ship gets a flame trailing behind it.
pub fn build_sprites(state: &GameState, layouts: &SpriteLayouts) -> SpriteLists {
    let mut lists = SpriteLists::default();

    for ship in state.spaceships() {
        let screen = ship.screen();
        if !screen.visible {
            continue;
        }

        lists
            .ships
            .push(SpriteInstance::new(screen.position, layouts.ship.frame_size, ship.facing));

        if ship.thrust {
            let distance = (layouts.ship.frame_size.x + layouts.flame.frame_size.x) / 2.0;
            let center = screen.position - Vec2::from_angle(ship.facing) * distance;
            let (uv_min, uv_max) = layouts.flame.grid.uv_rect(ship.flame_frame(layouts.flame.grid));
            lists.flames.push(
                SpriteInstance::new(center, layouts.flame.frame_size, ship.facing).with_uv(uv_min, uv_max),
            );
        }
    }

    for projectile in state.projectiles() {
        let screen = projectile.screen();
        if !screen.visible || projectile.is_expired() {
            continue;
        }

        let grid = layouts.projectile.grid;
        let (uv_min, uv_max) = grid.uv_rect(projectile.frame(grid));
        lists.projectiles.push(
            SpriteInstance::new(screen.position, layouts.projectile.frame_size, projectile.facing())
                .with_uv(uv_min, uv_max)
                .with_alpha(projectile.opacity()),
        );
    }

    lists
}

/// One pass of a running frame.
#[derive(Debug, PartialEq)]
pub enum ScenePass {
    /// Tiling layer into the offscreen target.
    Background(TilingLayer),
    /// Fog filter from the offscreen target into the surface.
    Fog,
    Sprites(SpriteLists),
    Hud(Vec<RectFill>),
}

/// Passes of one running frame in draw order. The fog pass is always present.
pub fn plan_frame(scene: &SceneContext, state: &GameState, layouts: &SpriteLayouts) -> Vec<ScenePass> {
    vec![
        ScenePass::Background(*scene.background().layer()),
        ScenePass::Fog,
        ScenePass::Sprites(build_sprites(state, layouts)),
        ScenePass::Hud(scene.hud().fills()),
    ]
}

/// Renderers and textures for the running game.
pub struct SceneRenderer {
    textures: GameTextures,
    tiling: TilingRenderer,
    sprites: SpriteRenderer,
    rects: RectRenderer,
    filters: FilterCache,
    offscreen: OffscreenTarget,
}

impl SceneRenderer {
    pub fn new(textures: GameTextures) -> Self {
        Self {
            textures,
            tiling: TilingRenderer::new(),
            sprites: SpriteRenderer::new(),
            rects: RectRenderer::new(),
            filters: FilterCache::new(),
            offscreen: OffscreenTarget::new(),
        }
    }

    /// Executes [`plan_frame`].
    ///
    /// The background is drawn offscreen so the fog filter can read it while
    /// writing the surface.
    pub fn draw(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        scene: &mut SceneContext,
        state: &GameState,
    ) {
        let Self {
            textures,
            tiling,
            sprites,
            rects,
            filters,
            offscreen,
        } = self;

        let plan = plan_frame(scene, state, &textures.layouts());
        let base = offscreen.ensure(ctx);

        for pass in &plan {
            match pass {
                ScenePass::Background(layer) => {
                    let mut base_target = target.retarget(base);
                    tiling.render(ctx, &mut base_target, *layer, &textures.background.texture, SPACE);
                }
                ScenePass::Fog => {
                    let mut manager = GpuFilterManager::new(ctx, &mut *target.encoder, filters);
                    fog::apply(scene.fog_mut(), &mut manager, base, target.color_view);
                }
                ScenePass::Sprites(lists) => {
                    let batches = [
                        SpriteBatch {
                            texture: &textures.flame.texture,
                            instances: &lists.flames,
                        },
                        SpriteBatch {
                            texture: &textures.ship.texture,
                            instances: &lists.ships,
                        },
                        SpriteBatch {
                            texture: &textures.projectile.texture,
                            instances: &lists.projectiles,
                        },
                    ];
                    sprites.render(ctx, target, &batches);
                }
                ScenePass::Hud(fills) => rects.render(ctx, target, fills),
            }
        }
    }
}

/// Draws the loading screen.
pub fn draw_loading(rects: &mut RectRenderer, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, progress: u8) {
    target.clear(SPACE);
    rects.render(ctx, target, &hud::loading_fills(progress, ctx.surface));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Projectile, Spaceship};
    use crate::viewport::{Viewport, ViewportUpdate};
    use superstellar_engine::coords::SurfaceSize;

    fn layouts() -> SpriteLayouts {
        SpriteLayouts {
            ship: SpriteLayout { frame_size: Vec2::new(40.0, 40.0), grid: FrameGrid::SINGLE },
            flame: SpriteLayout { frame_size: Vec2::new(20.0, 16.0), grid: FrameGrid::new(4, 1) },
            projectile: SpriteLayout { frame_size: Vec2::new(8.0, 8.0), grid: FrameGrid::new(4, 1) },
        }
    }

    fn update_all(state: &mut GameState, viewport: &Viewport) {
        for ship in state.spaceships_mut() {
            ship.update(viewport);
        }
        for p in state.projectiles_mut() {
            p.update(viewport);
        }
    }

    #[test]
    fn empty_state_builds_no_sprites() {
        assert_eq!(build_sprites(&GameState::new(), &layouts()), SpriteLists::default());
    }

    #[test]
    fn thrusting_ship_gets_a_trailing_flame() {
        let mut state = GameState::new();
        state.upsert_spaceship(Spaceship::new(1, Vec2::new(100.0, 100.0)).with_thrust(true));
        state.upsert_spaceship(Spaceship::new(2, Vec2::new(300.0, 100.0)));
        update_all(&mut state, &Viewport::untracked(SurfaceSize::new(800.0, 600.0)));

        let lists = build_sprites(&state, &layouts());
        assert_eq!(lists.ships.len(), 2);
        assert_eq!(lists.flames.len(), 1);
        // Facing +X: flame sits 30px to the left of the ship center.
        assert_eq!(lists.flames[0].center, [70.0, 100.0]);
        assert_eq!(lists.flames[0].uv_max, [0.25, 1.0]);
    }

    #[test]
    fn culled_and_expired_entities_are_skipped() {
        let mut state = GameState::new();
        state.upsert_spaceship(Spaceship::new(1, Vec2::new(10_000.0, 0.0)));
        state.add_projectile(Projectile::new(1, Vec2::new(50.0, 50.0), Vec2::new(0.0, 10.0), 0.0));
        state.add_projectile(Projectile::new(2, Vec2::new(60.0, 50.0), Vec2::new(0.0, 10.0), 1.0));
        update_all(&mut state, &Viewport::untracked(SurfaceSize::new(800.0, 600.0)));

        let lists = build_sprites(&state, &layouts());
        assert!(lists.ships.is_empty());
        assert_eq!(lists.projectiles.len(), 1);
        assert_eq!(lists.projectiles[0].center, [60.0, 50.0]);
    }

    #[test]
    fn empty_game_still_draws_background_and_fog() {
        let mut scene = SceneContext::new(SurfaceSize::new(800.0, 600.0));
        let mut state = GameState::new();
        scene.update(&mut state);

        let plan = plan_frame(&scene, &state, &layouts());
        assert_eq!(
            plan,
            vec![
                ScenePass::Background(*scene.background().layer()),
                ScenePass::Fog,
                ScenePass::Sprites(SpriteLists::default()),
                ScenePass::Hud(scene.hud().fills()),
            ]
        );
    }

    #[test]
    fn fog_sits_between_background_and_sprites() {
        let mut scene = SceneContext::new(SurfaceSize::new(800.0, 600.0));
        let mut state = GameState::new();
        state.set_client_id(1);
        state.upsert_spaceship(Spaceship::new(1, Vec2::new(250.0, -50.0)).with_thrust(true));
        scene.update(&mut state);

        let plan = plan_frame(&scene, &state, &layouts());
        assert!(matches!(plan[0], ScenePass::Background(_)));
        assert_eq!(plan[1], ScenePass::Fog);
        match &plan[2] {
            ScenePass::Sprites(lists) => {
                assert_eq!(lists.ships.len(), 1);
                assert_eq!(lists.flames.len(), 1);
            }
            other => panic!("expected sprites, got {other:?}"),
        }
        assert!(matches!(plan[3], ScenePass::Hud(_)));
    }

    #[test]
    fn projectile_sheet_animates_from_frame_clock_alone() {
        let mut scene = SceneContext::new(SurfaceSize::new(800.0, 600.0));
        let mut state = GameState::new();
        state.add_projectile(Projectile::new(1, Vec2::new(100.0, 100.0), Vec2::new(0.0, 0.0), 10.0));

        let mut frames = std::collections::BTreeSet::new();
        for _ in 0..60 {
            for p in state.projectiles_mut() {
                p.animate(1.0 / 60.0);
            }
            scene.update(&mut state);
            let lists = build_sprites(&state, &layouts());
            frames.insert((lists.projectiles[0].uv_min[0] * 4.0).round() as u32);
        }
        assert_eq!(frames.len(), 4);
    }

    #[test]
    fn expiring_projectile_fades() {
        let mut state = GameState::new();
        let mut p = Projectile::new(1, Vec2::new(100.0, 100.0), Vec2::zero(), 1.0);
        p.advance(0.9);
        state.add_projectile(p);
        update_all(&mut state, &Viewport::untracked(SurfaceSize::new(800.0, 600.0)));

        let lists = build_sprites(&state, &layouts());
        assert!(lists.projectiles[0].alpha < 1.0);
        assert!(lists.projectiles[0].alpha > 0.0);
    }
}
