//! GPU device and window surface.
//!
//! [`Gpu`] owns the device and the configured surface; frames are acquired
//! with `begin_frame`, recorded by the renderers and presented by `submit`.
//! Acquisition failures are classified into [`SurfaceErrorAction`]s.

mod context;
mod error;
mod frame;
mod init;
mod surface;

pub use context::Gpu;
pub use error::{FrameError, SurfaceErrorAction};
pub use frame::GpuFrame;
pub use init::GpuInit;
