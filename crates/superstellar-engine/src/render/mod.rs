//! GPU rendering subsystem.
//!
//! Each renderer owns its GPU resources (pipelines, buffers, bind groups) and
//! creates them lazily on first use, rebuilding when the surface format changes.
//!
//! Convention:
//! - CPU geometry is in logical pixels (top-left origin, +Y down).
//! - Vertex shaders convert to NDC using a viewport uniform.
//! - Blending is premultiplied alpha.

mod common;
mod ctx;
mod filter;
mod rect;
mod sprite;
mod target;
mod texture;
mod tiling;

pub use ctx::{RenderCtx, RenderTarget};
pub use filter::{
    normalized_screen_space_matrix, FilterCache, FilterManager, FilterShader, GpuFilterManager,
    ScreenMatrix,
};
pub use rect::{RectFill, RectRenderer};
pub use sprite::{SpriteBatch, SpriteInstance, SpriteRenderer};
pub use target::OffscreenTarget;
pub use texture::GpuTexture;
pub use tiling::{TilingLayer, TilingRenderer};
