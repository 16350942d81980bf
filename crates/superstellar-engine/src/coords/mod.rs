//! Coordinate and geometry types shared across the engine and the client.
//!
//! Canonical CPU space for drawing:
//! - Logical pixels (DPI-aware)
//! - Origin top-left
//! - +X right, +Y down
//!
//! Game code works in world units with the same axis orientation, so a world
//! point becomes a screen point by subtracting the camera origin.

mod rect;
mod surface;
mod vec2;

pub use rect::Rect;
pub use surface::SurfaceSize;
pub use vec2::Vec2;
