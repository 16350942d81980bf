use anyhow::{Context, Result};

use superstellar_engine::core::{App, AppControl, FrameCtx};
use superstellar_engine::coords::SurfaceSize;
use superstellar_engine::device::FrameError;
use superstellar_engine::render::RectRenderer;

use crate::assets::{AssetLoader, AssetSet, LoadStatus};
use crate::config::ClientArgs;
use crate::demo::Demo;
use crate::frame::{FrameDriver, FrameHost};
use crate::render::{draw_loading, GameTextures, SceneRenderer};
use crate::scene::SceneContext;
use crate::state::GameState;

/// The game client as seen by the engine runtime.
pub struct GameApp {
    scene: SceneContext,
    state: GameState,
    driver: FrameDriver,
    loader: Option<AssetLoader>,
    renderer: Option<SceneRenderer>,
    loading_rects: RectRenderer,
    demo: Option<Demo>,
}

impl GameApp {
    /// Starts decoding assets in the background; the window opens meanwhile.
    pub fn new(args: &ClientArgs) -> Result<Self> {
        let loader = AssetLoader::spawn(args.manifest()).context("failed to start asset loading")?;

        Ok(Self {
            scene: SceneContext::new(args.initial_surface()),
            state: GameState::new(),
            driver: FrameDriver::new(),
            loader: Some(loader),
            renderer: None,
            loading_rects: RectRenderer::new(),
            demo: args.demo.then(Demo::new),
        })
    }

    /// Game state for the message layer.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    fn loading_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let Some(loader) = self.loader.as_mut() else {
            log::error!("no asset loader while idle");
            return AppControl::Exit;
        };

        match loader.poll() {
            LoadStatus::Loading(progress) => {
                let rects = &mut self.loading_rects;
                if let Err(err) = ctx.render(|rctx, target| draw_loading(rects, rctx, target, progress)) {
                    log::debug!("loading frame not rendered: {err}");
                }
                ctx.request_redraw();
                AppControl::Continue
            }
            LoadStatus::Ready(assets) => {
                self.loader = None;
                match self.setup(ctx, &assets) {
                    Ok(()) => {
                        ctx.request_redraw();
                        AppControl::Continue
                    }
                    Err(err) => {
                        log::error!("{err:#}");
                        AppControl::Exit
                    }
                }
            }
            LoadStatus::Failed(err) => {
                log::error!("{:#}", anyhow::Error::from(err).context("asset loading failed"));
                AppControl::Exit
            }
        }
    }

    /// Uploads textures, builds the scene at the current size and starts the driver.
    fn setup(&mut self, ctx: &mut FrameCtx<'_, '_>, assets: &AssetSet) -> Result<()> {
        let textures = GameTextures::upload(ctx.gpu.device(), ctx.gpu.queue(), assets)?;
        self.renderer = Some(SceneRenderer::new(textures));
        self.scene = SceneContext::new(ctx.window.logical_size());

        if let Some(demo) = self.demo.as_mut() {
            demo.seed(&mut self.state);
        }

        self.driver.start();
        Ok(())
    }
}

impl App for GameApp {
    fn on_resize(&mut self, size: SurfaceSize) {
        self.scene.resize(size);
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if !self.driver.is_running() {
            return self.loading_frame(ctx);
        }

        let dt = ctx.time.dt;
        if let Some(demo) = self.demo.as_mut() {
            demo.step(&mut self.state, dt);
        }
        for ship in self.state.spaceships_mut() {
            ship.animate(dt);
        }
        for projectile in self.state.projectiles_mut() {
            projectile.animate(dt);
        }

        let Some(renderer) = self.renderer.as_mut() else {
            log::error!("frame driver running without a renderer");
            return AppControl::Exit;
        };

        let mut host = GpuHost { frame: ctx, renderer };
        self.driver.tick(&mut self.scene, &mut self.state, &mut host);

        AppControl::Continue
    }
}

/// [`FrameHost`] backed by the current window frame.
struct GpuHost<'f, 'a, 'w> {
    frame: &'f mut FrameCtx<'a, 'w>,
    renderer: &'f mut SceneRenderer,
}

impl FrameHost for GpuHost<'_, '_, '_> {
    fn render(&mut self, scene: &mut SceneContext, state: &GameState) -> Result<(), FrameError> {
        let renderer = &mut *self.renderer;
        self.frame
            .render(|rctx, target| renderer.draw(rctx, target, scene, state))
    }

    fn request_frame(&mut self) {
        self.frame.request_redraw();
    }
}
