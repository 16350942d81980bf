//! Frame timing.
//!
//! One `FrameClock` per window; `tick()` once per redraw yields the `FrameTime`
//! handed to the app.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
