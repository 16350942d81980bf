use winit::window::{Window, WindowId};

use crate::coords::SurfaceSize;
use crate::device::{FrameError, Gpu, SurfaceErrorAction};
use crate::render::{RenderCtx, RenderTarget};
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

/// Per-window handles and immutable window metadata.
pub struct WindowCtx<'a> {
    pub id:     WindowId,
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    /// Returns the window size in logical pixels.
    pub fn logical_size(&self) -> SurfaceSize {
        logical_size(self.window)
    }

    #[inline]
    pub fn scale_factor(&self) -> f32 {
        self.window.scale_factor() as f32
    }
}

pub(crate) fn logical_size(window: &Window) -> SurfaceSize {
    let phys = window.inner_size();
    let logi: winit::dpi::LogicalSize<f64> = phys.to_logical(window.scale_factor());
    SurfaceSize::new(logi.width as f32, logi.height as f32)
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window:  WindowCtx<'a>,
    pub gpu:     &'a mut Gpu<'w>,
    pub time:    FrameTime,
    pub runtime: &'a mut RuntimeCtx,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Schedules another `on_frame` call for the next display refresh.
    #[inline]
    pub fn request_redraw(&self) {
        self.window.window.request_redraw();
    }

    /// Acquires the surface texture, calls `draw` with a ready [`RenderCtx`] and
    /// [`RenderTarget`], then presents the frame.
    ///
    /// `draw` owns the whole frame, including clearing. When the surface cannot
    /// provide a texture nothing is drawn and the error is returned; a fatal
    /// surface error additionally asks the runtime to exit.
    pub fn render<F>(&mut self, draw: F) -> Result<(), FrameError>
    where
        F: FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>),
    {
        let surface = self.window.logical_size();
        let scale_factor = self.window.scale_factor();

        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                let action = self.gpu.handle_surface_error(err);
                if action == SurfaceErrorAction::Fatal {
                    self.runtime.exit();
                }
                return Err(action.into());
            }
        };

        let physical = self.gpu.size();
        let rctx = RenderCtx::new(
            self.gpu.device(),
            self.gpu.queue(),
            self.gpu.surface_format(),
            surface,
            scale_factor,
            [physical.width, physical.height],
        );

        // RenderTarget borrows frame.encoder; dropped before submit() takes frame.
        {
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
            draw(&rctx, &mut target);
        }

        self.window.window.pre_present_notify();
        self.gpu.submit(frame);

        Ok(())
    }
}
