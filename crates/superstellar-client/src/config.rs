use std::path::PathBuf;

use clap::Parser;
use winit::dpi::LogicalSize;

use superstellar_engine::coords::SurfaceSize;
use superstellar_engine::device::GpuInit;
use superstellar_engine::logging::LoggingConfig;
use superstellar_engine::window::RuntimeConfig;

use crate::assets::AssetManifest;

/// Command-line options of the `superstellar` binary.
#[derive(Parser, Debug, Clone)]
#[command(name = "superstellar", about = "Superstellar space-combat client", version)]
pub struct ClientArgs {
    /// Directory holding the ship, background, flame and projectile textures
    #[arg(long, default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/assets"))]
    pub assets: PathBuf,

    /// Initial window width in logical pixels
    #[arg(long, default_value_t = 1280.0)]
    pub width: f64,

    /// Initial window height in logical pixels
    #[arg(long, default_value_t = 720.0)]
    pub height: f64,

    #[arg(long, default_value = "Superstellar")]
    pub title: String,

    /// Log filter in env_logger syntax; overrides RUST_LOG
    #[arg(long)]
    pub log: Option<String>,

    /// Seed a local fleet instead of waiting for the server
    #[arg(long)]
    pub demo: bool,

    /// Present without waiting for vertical blank
    #[arg(long)]
    pub no_vsync: bool,
}

impl ClientArgs {
    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            title: self.title.clone(),
            initial_size: LogicalSize::new(self.width.max(1.0), self.height.max(1.0)),
        }
    }

    /// Scene size before the window reports its own; matches the requested window size.
    pub fn initial_surface(&self) -> SurfaceSize {
        let size = self.runtime_config().initial_size;
        SurfaceSize::new(size.width as f32, size.height as f32)
    }

    pub fn gpu_init(&self) -> GpuInit {
        GpuInit::default().with_vsync(!self.no_vsync)
    }

    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            env_filter: self.log.clone(),
            ..LoggingConfig::default()
        }
    }

    pub fn manifest(&self) -> AssetManifest {
        AssetManifest::standard(&self.assets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse_without_arguments() {
        let args = ClientArgs::try_parse_from(["superstellar"]).expect("parse");
        assert_eq!(args.width, 1280.0);
        assert_eq!(args.height, 720.0);
        assert!(!args.demo);
        assert!(args.log.is_none());
        assert!(args.assets.ends_with("assets"));
    }

    #[test]
    fn flags_flow_into_engine_configs() {
        let args = ClientArgs::try_parse_from([
            "superstellar",
            "--width",
            "800",
            "--height",
            "600",
            "--title",
            "test",
            "--log",
            "debug",
            "--no-vsync",
            "--demo",
        ])
        .expect("parse");

        let runtime = args.runtime_config();
        assert_eq!(runtime.title, "test");
        assert_eq!(runtime.initial_size, LogicalSize::new(800.0, 600.0));
        assert_eq!(args.gpu_init().present_mode, wgpu::PresentMode::AutoNoVsync);
        assert_eq!(args.logging_config().env_filter.as_deref(), Some("debug"));
        assert!(args.demo);
    }

    #[test]
    fn initial_surface_uses_clamped_window_size() {
        let args = ClientArgs::try_parse_from(["superstellar", "--width", "0", "--height", "480"]).expect("parse");
        assert_eq!(args.initial_surface(), SurfaceSize::new(1.0, 480.0));
    }

    #[test]
    fn manifest_is_rooted_at_assets_dir() {
        let args = ClientArgs::try_parse_from(["superstellar", "--assets", "/tmp/x"]).expect("parse");
        assert!(args.manifest().entries().iter().all(|e| e.path.starts_with("/tmp/x")));
    }
}
