use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::camera::CameraSelector;
use crate::output::OutputFormat;
use crate::types::ImageType;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Config file [default: config/default.toml]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// ASI SDK library file to load
    #[arg(long, global = true)]
    pub library: Option<PathBuf>,

    /// Camera index or model name
    #[arg(long, global = true)]
    pub camera: Option<String>,

    /// Exposure in microseconds
    #[arg(long, global = true)]
    pub exposure: Option<i64>,

    #[arg(long, global = true)]
    pub gain: Option<i64>,

    #[arg(long, global = true)]
    pub bins: Option<i32>,

    /// raw8, rgb24, raw16 or y8
    #[arg(long, global = true)]
    pub image_type: Option<ImageType>,

    /// Video frame timeout in milliseconds, -1 waits forever
    #[arg(long, global = true, allow_negative_numbers = true)]
    pub timeout: Option<i32>,

    #[arg(long, global = true)]
    pub save_folder: Option<String>,

    /// fits, png or tiff
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    /// Use a simulated camera instead of the SDK
    #[arg(long, global = true)]
    pub simulate: bool,

    #[arg(long, global = true)]
    pub debug: bool,

    #[arg(long, global = true)]
    pub log_file: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List connected cameras
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show camera properties
    Info {
        #[arg(long)]
        json: bool,
    },
    /// Show camera controls and their current values
    Controls {
        #[arg(long)]
        json: bool,
    },
    /// Take a single exposure and save it
    Capture {
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep the shutter closed (cameras with a mechanical shutter)
        #[arg(long)]
        dark: bool,
    },
    /// Record frames in video mode
    Video {
        #[arg(long, default_value_t = 10)]
        frames: u64,

        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

impl CliArgs {
    /// A number selects by index, anything else by model name.
    pub fn parse_camera(value: &str) -> CameraSelector {
        match value.trim().parse::<i32>() {
            Ok(index) => CameraSelector::Index(index),
            Err(_) => CameraSelector::Model(value.trim().to_string()),
        }
    }
}
