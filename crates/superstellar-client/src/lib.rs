//! Superstellar game client.
//!
//! Owns the camera (viewport), background scrolling, the annulus fog filter,
//! the HUD and the frame driver that ties them to the game state once per
//! display refresh. Networking lives elsewhere and only mutates [`state::GameState`].

pub mod app;
pub mod assets;
pub mod background;
pub mod config;
pub mod demo;
pub mod entity;
pub mod fog;
pub mod frame;
pub mod hud;
pub mod render;
pub mod scene;
pub mod state;
pub mod viewport;
