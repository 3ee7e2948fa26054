//! Bindings and tools for ZWO ASI astronomy cameras.
//!
//! This library provides functionality for:
//! - Locating and loading the vendor `ASICamera2` SDK at run time
//! - Enumerating, opening and configuring cameras
//! - Still exposures and continuous video capture
//! - Saving frames as FITS, PNG or TIFF
//!
//! Every SDK call goes through the [`sdk::AsiSdk`] trait, so the whole crate
//! can be driven by [`sdk::mock::MockSdk`] when no camera is attached.

pub mod camera;
pub mod cli;
pub mod config;
pub mod error;
pub mod frame;
pub mod logging;
pub mod output;
pub mod sdk;
pub mod types;
pub mod video;

pub use camera::{Asi, Camera, CameraConfig, CameraSelector, CaptureOptions, RoiRequest};
pub use config::Config;
pub use error::{AsiError, ErrorCode, Result};
pub use frame::{Frame, FrameProcessor, Pixels};
pub use output::{save_frame, write_fits, OutputFormat};
pub use sdk::AsiSdk;
pub use types::{
    CameraInfo, CameraMode, ControlCaps, ControlType, ExposureStatus, GuideDirection, ImageType,
    Roi, RoiFormat,
};
pub use video::{VideoFrame, VideoOptions, VideoStream};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Set up logging and announce the application.
///
/// # Arguments
///
/// * `debug` - Whether to enable debug logging
/// * `log_file` - Optional path to a log file. If None, logs only go to the console.
pub fn initialize(debug: bool, log_file: Option<&str>) -> anyhow::Result<()> {
    logging::setup_logging(debug as u8, log_file)?;
    logging::log_app_start(VERSION);
    Ok(())
}
