use thiserror::Error;

/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); terminate gracefully.
    Fatal,
}

/// Why a frame was not presented.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum FrameError {
    /// The surface could not provide a texture this frame; the next frame may succeed.
    #[error("frame skipped: surface {0:?}")]
    Skipped(SurfaceErrorAction),

    /// The surface is unusable; the runtime has been asked to exit.
    #[error("surface lost irrecoverably")]
    Fatal,
}

impl From<SurfaceErrorAction> for FrameError {
    fn from(action: SurfaceErrorAction) -> Self {
        match action {
            SurfaceErrorAction::Fatal => FrameError::Fatal,
            other => FrameError::Skipped(other),
        }
    }
}

impl FrameError {
    #[inline]
    pub fn is_fatal(self) -> bool {
        self == FrameError::Fatal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_action_maps_to_fatal_error() {
        assert!(FrameError::from(SurfaceErrorAction::Fatal).is_fatal());
    }

    #[test]
    fn transient_actions_are_skips() {
        assert_eq!(
            FrameError::from(SurfaceErrorAction::Reconfigured),
            FrameError::Skipped(SurfaceErrorAction::Reconfigured)
        );
        assert!(!FrameError::from(SurfaceErrorAction::SkipFrame).is_fatal());
    }
}
