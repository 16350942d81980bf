use anyhow::Result;
use clap::Parser;

use superstellar_client::app::GameApp;
use superstellar_client::config::ClientArgs;
use superstellar_engine::logging::init_logging;
use superstellar_engine::window::Runtime;

fn main() -> Result<()> {
    let args = ClientArgs::parse();
    init_logging(args.logging_config());

    log::info!("starting superstellar client (assets: {})", args.assets.display());

    let app = GameApp::new(&args)?;
    Runtime::run(args.runtime_config(), args.gpu_init(), app)
}
