use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use log::{info, warn};
use serde::Serialize;

use super::args::Command;
use crate::camera::{Asi, Camera, CaptureOptions};
use crate::config::Config;
use crate::output::{output_path, save_frame};
use crate::types::{BayerPattern, CameraInfo, ControlCaps};
use crate::video::{save_video_metadata, FrameRecord, VideoOptions, VideoStream};

/// One control with its current setting.
#[derive(Debug, Clone, Serialize)]
pub struct ControlReport {
    #[serde(flatten)]
    pub caps: ControlCaps,
    pub value: i64,
    pub auto: bool,
}

#[derive(Debug, Serialize)]
struct InfoReport<'a> {
    #[serde(flatten)]
    info: &'a CameraInfo,
    bayer: Option<BayerPattern>,
    serial_number: Option<String>,
}

/// Run one subcommand, writing its report to `out`.
pub fn run(asi: &Asi, config: &Config, command: &Command, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::List { json } => list(asi, *json, out),
        Command::Info { json } => show_info(&open(asi, config)?, *json, out),
        Command::Controls { json } => controls(&open(asi, config)?, *json, out),
        Command::Capture { output, dark } => capture(asi, config, output.as_deref(), *dark, out),
        Command::Video { frames, output_dir } => {
            video(asi, config, *frames, output_dir.as_deref(), out)
        }
    }
}

/// Open the selected camera without changing any of its settings.
fn open(asi: &Asi, config: &Config) -> Result<Camera> {
    let selector = config.camera.selector();
    asi.open(selector.clone())
        .with_context(|| format!("Failed to open camera {}", selector))
}

/// Open the selected camera and apply the configured settings.
fn open_configured(asi: &Asi, config: &Config) -> Result<Camera> {
    let mut camera = open(asi, config)?;
    camera
        .configure(&config.camera)
        .context("Failed to configure camera")?;
    Ok(camera)
}

fn timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

fn list(asi: &Asi, json: bool, out: &mut dyn Write) -> Result<()> {
    let cameras: Vec<CameraInfo> = (0..asi.num_cameras())
        .map(|index| asi.camera_property(index))
        .collect::<crate::Result<_>>()?;

    if json {
        serde_json::to_writer_pretty(&mut *out, &cameras)?;
        writeln!(out)?;
        return Ok(());
    }

    if cameras.is_empty() {
        writeln!(out, "No cameras found")?;
    }
    for (index, camera) in cameras.iter().enumerate() {
        writeln!(out, "{}: {}", index, camera.name)?;
    }
    Ok(())
}

fn show_info(camera: &Camera, json: bool, out: &mut dyn Write) -> Result<()> {
    let info = camera.info();
    let serial_number = match camera.serial_number() {
        Ok(serial) => Some(serial),
        Err(e) => {
            warn!("Could not read serial number: {}", e);
            None
        }
    };

    if json {
        let report = InfoReport {
            info,
            bayer: info.bayer_pattern(),
            serial_number,
        };
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "Name:          {}", info.name)?;
    writeln!(out, "Camera ID:     {}", info.camera_id)?;
    if let Some(serial) = serial_number {
        writeln!(out, "Serial number: {}", serial)?;
    }
    writeln!(out, "Sensor:        {}x{}", info.max_width, info.max_height)?;
    writeln!(out, "Pixel size:    {} um", info.pixel_size)?;
    writeln!(out, "Bit depth:     {}", info.bit_depth)?;
    writeln!(out, "Color:         {}", info.is_color_cam)?;
    if let Some(bayer) = info.bayer_pattern() {
        writeln!(out, "Bayer pattern: {:?}", bayer)?;
    }
    writeln!(out, "Bins:          {:?}", info.supported_bins)?;
    writeln!(out, "Formats:       {:?}", info.video_formats())?;
    writeln!(out, "USB3 camera:   {}", info.is_usb3_camera)?;
    writeln!(out, "Cooler:        {}", info.is_cooler_cam)?;
    writeln!(out, "ST4 port:      {}", info.st4_port)?;
    writeln!(out, "Trigger:       {}", info.is_trigger_cam)?;
    Ok(())
}

fn controls(camera: &Camera, json: bool, out: &mut dyn Write) -> Result<()> {
    let mut reports = Vec::new();
    for caps in camera.controls()?.into_values() {
        let (value, auto) = camera.control_value(caps.control_type)?;
        reports.push(ControlReport { caps, value, auto });
    }

    if json {
        serde_json::to_writer_pretty(&mut *out, &reports)?;
        writeln!(out)?;
        return Ok(());
    }

    for report in &reports {
        writeln!(
            out,
            "{:<24} {:>12}{} [{}..{}] {}",
            report.caps.name,
            report.value,
            if report.auto { " (auto)" } else { "" },
            report.caps.min_value,
            report.caps.max_value,
            report.caps.description
        )?;
    }
    Ok(())
}

fn capture(
    asi: &Asi,
    config: &Config,
    output: Option<&Path>,
    dark: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let camera = open_configured(asi, config)?;
    let mut options = CaptureOptions::default();
    if dark {
        options = options.dark();
    }

    let frame = camera.capture(&options).context("Capture failed")?;
    let path = match output {
        Some(path) => path.to_path_buf(),
        None => output_path(
            Path::new(&config.output.save_folder),
            &format!("capture_{}", timestamp()),
            config.output.format,
        ),
    };
    save_frame(&frame, &path).with_context(|| format!("Failed to save {}", path.display()))?;

    let (min, max) = frame.min_max().unwrap_or((0, 0));
    writeln!(
        out,
        "Saved {}x{} frame to {} (mean {:.1}, min {}, max {})",
        frame.width,
        frame.height,
        path.display(),
        frame.mean(),
        min,
        max
    )?;
    Ok(())
}

fn video(
    asi: &Asi,
    config: &Config,
    frames: u64,
    output_dir: Option<&Path>,
    out: &mut dyn Write,
) -> Result<()> {
    let camera = open_configured(asi, config)?;
    let dir: PathBuf = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => Path::new(&config.output.save_folder).join(format!("video_{}", timestamp())),
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create output folder: {}", dir.display()))?;

    let options = VideoOptions {
        timeout_ms: config.camera.timeout_ms,
        max_frames: Some(frames),
        ..VideoOptions::default()
    };
    let stream = VideoStream::start(camera, options).context("Failed to start video")?;

    let mut records = Vec::new();
    while let Some(item) = stream.recv() {
        let name = format!(
            "frame_{:06}.{}",
            item.sequence,
            config.output.format.extension()
        );
        save_frame(&item.frame, &dir.join(&name))
            .with_context(|| format!("Failed to save {}", name))?;
        records.push(FrameRecord::new(&item, &name));
    }

    let end = stream.stop()?;
    let stats = end.stats;
    if let Some(e) = end.error {
        return Err(e).context("Video capture ended early");
    }

    save_video_metadata(&records, &dir.join("metadata.csv"))?;
    info!("Saved {} frames to {}", records.len(), dir.display());
    writeln!(
        out,
        "Saved {} of {} frames to {} ({} dropped, {} timeouts, {} dropped by SDK)",
        records.len(),
        stats.captured,
        dir.display(),
        stats.dropped,
        stats.timeouts,
        stats.sdk_dropped
    )?;
    Ok(())
}
