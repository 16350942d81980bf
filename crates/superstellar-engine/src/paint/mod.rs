//! Colour model shared between the client and renderers.
//!
//! Colours are linear premultiplied RGBA; geometry types remain in `coords`.

mod color;

pub use color::Color;
