use zwo_asi::{
    camera::Asi,
    cli::{self, CliArgs},
    config::Config,
    logging,
    sdk::mock::MockSdk,
};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::io;
use std::sync::Arc;

fn main() -> Result<()> {
    // Parse command-line arguments
    let cli_args = CliArgs::parse();

    // Setup logging
    zwo_asi::initialize(cli_args.debug, cli_args.log_file.as_deref())?;

    // Load configuration
    let config = Config::load(&cli_args)?;
    logging::log_app_config(&config);

    let asi = if cli_args.simulate {
        info!("Using simulated camera");
        Asi::new(Arc::new(MockSdk::with_default_camera()))
    } else {
        Asi::load(config.library.path.as_deref()).context("Failed to load the ASI SDK")?
    };
    info!("{} camera(s) connected", asi.num_cameras());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    cli::run(&asi, &config, &cli_args.command, &mut out)?;

    info!("Done");
    Ok(())
}
