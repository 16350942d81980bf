//! The per-frame driver.
//!
//! Rendering and rescheduling go through [`FrameHost`] so the driver can run
//! against the GPU in the app and against a recorder in tests.

use superstellar_engine::device::FrameError;

use crate::scene::SceneContext;
use crate::state::GameState;
use crate::viewport::Viewport;

/// Engine side of a frame.
pub trait FrameHost {
    /// Draws the scene once.
    fn render(&mut self, scene: &mut SceneContext, state: &GameState) -> Result<(), FrameError>;

    /// Asks for another tick on the next display refresh.
    fn request_frame(&mut self);
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum DriverState {
    /// Assets are still loading.
    #[default]
    Idle,
    Running,
}

/// Result of one [`FrameDriver::tick`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TickOutcome {
    Idle,
    Rendered(Viewport),
    RenderFailed(Viewport, FrameError),
}

#[derive(Debug, Default)]
pub struct FrameDriver {
    state: DriverState,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == DriverState::Running
    }

    /// Idle → Running. Happens once; later calls are ignored.
    pub fn start(&mut self) {
        if self.state == DriverState::Idle {
            log::info!("frame driver running");
            self.state = DriverState::Running;
        }
    }

    /// One frame: update the scene, render it once, reschedule once.
    ///
    /// Render failures are logged and do not stop the loop.
    pub fn tick<H>(&mut self, scene: &mut SceneContext, state: &mut GameState, host: &mut H) -> TickOutcome
    where
        H: FrameHost + ?Sized,
    {
        if self.state == DriverState::Idle {
            return TickOutcome::Idle;
        }

        let viewport = scene.update(state);
        let result = host.render(scene, state);
        host.request_frame();

        match result {
            Ok(()) => TickOutcome::Rendered(viewport),
            Err(err) => {
                log::warn!("frame not rendered: {err}");
                TickOutcome::RenderFailed(viewport, err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Spaceship;
    use superstellar_engine::coords::{SurfaceSize, Vec2};
    use superstellar_engine::device::SurfaceErrorAction;

    #[derive(Default)]
    struct RecordingHost {
        renders: usize,
        reschedules: usize,
        fail_with: Option<FrameError>,
        fog_anchor_at_render: Vec<[f32; 2]>,
    }

    impl FrameHost for RecordingHost {
        fn render(&mut self, scene: &mut SceneContext, _state: &GameState) -> Result<(), FrameError> {
            self.renders += 1;
            self.fog_anchor_at_render.push(scene.fog().world_coordinates());
            match self.fail_with {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }

        fn request_frame(&mut self) {
            self.reschedules += 1;
        }
    }

    fn scene() -> SceneContext {
        SceneContext::new(SurfaceSize::new(800.0, 600.0))
    }

    #[test]
    fn idle_tick_does_nothing() {
        let mut driver = FrameDriver::new();
        let mut host = RecordingHost::default();
        let outcome = driver.tick(&mut scene(), &mut GameState::new(), &mut host);
        assert_eq!(outcome, TickOutcome::Idle);
        assert_eq!((host.renders, host.reschedules), (0, 0));
    }

    #[test]
    fn running_tick_renders_and_reschedules_once_without_entities() {
        let mut driver = FrameDriver::new();
        driver.start();
        let mut host = RecordingHost::default();
        let mut scene = scene();
        let mut state = GameState::new();

        for _ in 0..3 {
            let outcome = driver.tick(&mut scene, &mut state, &mut host);
            assert!(matches!(outcome, TickOutcome::Rendered(_)));
        }
        assert_eq!((host.renders, host.reschedules), (3, 3));
    }

    #[test]
    fn running_tick_with_tracked_ship_updates_before_render() {
        let mut driver = FrameDriver::new();
        driver.start();
        let mut host = RecordingHost::default();
        let mut scene = scene();
        let mut state = GameState::new();
        state.upsert_spaceship(Spaceship::new(1, Vec2::new(250.0, -50.0)));
        state.set_client_id(1);

        let outcome = driver.tick(&mut scene, &mut state, &mut host);

        assert_eq!((host.renders, host.reschedules), (1, 1));
        assert_eq!(host.fog_anchor_at_render, vec![[2.0, -1.0]]);
        match outcome {
            TickOutcome::Rendered(vp) => assert_eq!(vp.origin, Vec2::new(-150.0, -350.0)),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn failed_render_still_reschedules() {
        let mut driver = FrameDriver::new();
        driver.start();
        let mut host = RecordingHost {
            fail_with: Some(FrameError::Skipped(SurfaceErrorAction::SkipFrame)),
            ..Default::default()
        };

        let outcome = driver.tick(&mut scene(), &mut GameState::new(), &mut host);

        assert!(matches!(outcome, TickOutcome::RenderFailed(_, _)));
        assert_eq!((host.renders, host.reschedules), (1, 1));
    }

    #[test]
    fn start_is_one_way() {
        let mut driver = FrameDriver::new();
        assert_eq!(driver.state(), DriverState::Idle);
        driver.start();
        driver.start();
        assert!(driver.is_running());
    }
}
