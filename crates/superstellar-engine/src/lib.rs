//! Superstellar engine crate.
//!
//! Platform and GPU runtime for the game client: window loop, surface and
//! device management, frame timing, logging, and the renderers the client
//! composes into a frame (tiling layers, sprites, rects, full-screen filters).

pub mod coords;
pub mod core;
pub mod device;
pub mod logging;
pub mod paint;
pub mod render;
pub mod time;
pub mod window;
