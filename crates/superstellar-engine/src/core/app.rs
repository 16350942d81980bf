use crate::coords::SurfaceSize;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
pub trait App {
    /// Called after the window surface has been reconfigured to a new size.
    ///
    /// `size` is in logical pixels. The runtime requests a redraw afterwards.
    fn on_resize(&mut self, size: SurfaceSize) {
        let _ = size;
    }

    /// Called for every redraw the window system delivers.
    ///
    /// The runtime does not redraw continuously: an app that wants another
    /// frame calls [`FrameCtx::request_redraw`].
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
