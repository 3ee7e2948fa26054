use anyhow::{Context, Result};
use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use log::{debug, info, LevelFilter};
use std::io;

pub fn level_filter(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the global logger. Console output goes to stderr so command
/// reports (and `--json` output) on stdout stay clean.
pub fn setup_logging(verbosity: u8, log_file: Option<&str>) -> Result<()> {
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);

    let mut base_config = fern::Dispatch::new().level(level_filter(verbosity));

    // File logs carry the date as well
    let file_config = fern::Dispatch::new().format(|out, message, record| {
        out.finish(format_args!(
            "{}[{}][{}] {}",
            Local::now().format("[%Y-%m-%d][%H:%M:%S%.3f]"),
            record.target(),
            record.level(),
            message
        ))
    });

    let console_config = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                Local::now().format("[%H:%M:%S]"),
                record.target(),
                colors.color(record.level()),
                message
            ))
        })
        .chain(io::stderr());

    base_config = base_config.chain(console_config);

    if let Some(log_file) = log_file {
        let file = fern::log_file(log_file)
            .with_context(|| format!("Failed to open log file {}", log_file))?;
        base_config = base_config.chain(file_config.chain(file));
    }

    base_config.apply().context("Logger already installed")?;

    info!("Logging system initialized");
    debug!("Debug logging enabled");

    Ok(())
}

pub fn log_app_start(version: &str) {
    info!("Starting ZWO ASI capture v{}", version);
}

pub fn log_app_config(config: &crate::config::Config) {
    let camera = &config.camera;
    info!("Application configured with:");
    info!("  Library:");
    match &config.library.path {
        Some(path) => info!("    Path: {}", path.display()),
        None => info!("    Path: (search)"),
    }
    info!("  Camera:");
    info!("    Selector: {}", camera.selector());
    if let Some(exposure) = camera.exposure_us {
        info!("    Exposure: {} us", exposure);
    }
    if let Some(gain) = camera.gain {
        info!("    Gain: {}", gain);
    }
    if let Some(bins) = camera.bins {
        info!("    Bins: {}", bins);
    }
    if let Some(image_type) = camera.image_type {
        info!("    Image type: {:?}", image_type);
    }
    if let (Some(width), Some(height)) = (camera.roi.width, camera.roi.height) {
        info!("    Resolution: {}x{}", width, height);
    }
    if let (Some(x), Some(y)) = (camera.roi.start_x, camera.roi.start_y) {
        info!("    Offset: ({}, {})", x, y);
    }
    if let Some(timeout) = camera.timeout_ms {
        info!("    Timeout: {} ms", timeout);
    }
    info!("  Output:");
    info!("    Save folder: {}", config.output.save_folder);
    info!("    Format: {}", config.output.format);
}
