use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::camera::{CameraConfig, CameraSelector};
use crate::cli::CliArgs;
use crate::output::OutputFormat;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub library: LibraryConfig,
    pub camera: CameraConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// SDK binary to load instead of searching for one.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub save_folder: String,
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            save_folder: "output".to_string(),
            format: OutputFormat::Fits,
        }
    }
}

impl Config {
    /// Read the config file, apply command line overrides and validate.
    ///
    /// A missing default config file is not an error; an explicitly named one is.
    pub fn load(cli_args: &CliArgs) -> Result<Self> {
        let mut config = match cli_args.config.as_deref() {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => {
                warn!("No config file at {}, using defaults", DEFAULT_CONFIG_PATH);
                Self::default()
            }
        };

        config.override_with_cli_args(cli_args);

        config.validate()?;

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        info!("Loading configuration from {}", path.display());

        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn override_with_cli_args(&mut self, args: &CliArgs) {
        if let Some(path) = &args.library {
            self.library.path = Some(path.clone());
        }

        if let Some(camera) = &args.camera {
            match CliArgs::parse_camera(camera) {
                CameraSelector::Index(index) => {
                    self.camera.index = Some(index);
                    self.camera.model = None;
                }
                CameraSelector::Model(model) => self.camera.model = Some(model),
            }
        }
        if let Some(exposure) = args.exposure {
            self.camera.exposure_us = Some(exposure);
        }
        if let Some(gain) = args.gain {
            self.camera.gain = Some(gain);
        }
        if let Some(bins) = args.bins {
            self.camera.bins = Some(bins);
        }
        if let Some(image_type) = args.image_type {
            self.camera.image_type = Some(image_type);
        }
        if let Some(timeout) = args.timeout {
            self.camera.timeout_ms = Some(timeout);
        }

        if let Some(save_folder) = &args.save_folder {
            self.output.save_folder = save_folder.clone();
        }
        if let Some(format) = args.format {
            self.output.format = format;
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.camera
            .validate()
            .map_err(anyhow::Error::msg)
            .context("Invalid camera configuration")?;

        if let Some(path) = &self.library.path {
            if path.as_os_str().is_empty() {
                return Err(anyhow::anyhow!("Library path cannot be empty"));
            }
        }

        if self.output.save_folder.is_empty() {
            return Err(anyhow::anyhow!("Save folder cannot be empty"));
        }

        // Ensure save folder exists
        let save_folder = Path::new(&self.output.save_folder);
        if !save_folder.exists() {
            warn!("Save folder does not exist. Creating it.");
            fs::create_dir_all(save_folder).with_context(|| {
                format!("Failed to create save folder: {}", self.output.save_folder)
            })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::RoiRequest;
    use crate::types::ImageType;
    use clap::Parser;

    const SAMPLE: &str = r#"
[library]
path = "/opt/asi/libASICamera2.so"

[camera]
model = "ASI178MM"
exposure_us = 25000
gain = 150
bins = 2
image_type = "raw16"
timeout_ms = 550

[camera.roi]
width = 640
height = 480

[output]
save_folder = "captures"
format = "png"
"#;

    #[test]
    fn test_parse_full_file() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        assert_eq!(
            config.library.path.as_deref(),
            Some(Path::new("/opt/asi/libASICamera2.so"))
        );
        assert_eq!(config.camera.selector(), CameraSelector::Model("ASI178MM".into()));
        assert_eq!(config.camera.exposure_us, Some(25_000));
        assert_eq!(config.camera.image_type, Some(ImageType::Raw16));
        assert_eq!(
            config.camera.roi,
            RoiRequest {
                width: Some(640),
                height: Some(480),
                ..RoiRequest::default()
            }
        );
        assert_eq!(config.output.format, OutputFormat::Png);
    }

    #[test]
    fn test_empty_file_is_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.output.save_folder, "output");
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut config: Config = toml::from_str(SAMPLE).unwrap();
        let args = CliArgs::parse_from([
            "asi-capture",
            "--camera",
            "1",
            "--gain",
            "300",
            "--format",
            "tiff",
            "list",
        ]);
        config.override_with_cli_args(&args);

        assert_eq!(config.camera.selector(), CameraSelector::Index(1));
        assert_eq!(config.camera.gain, Some(300));
        assert_eq!(config.camera.exposure_us, Some(25_000));
        assert_eq!(config.output.format, OutputFormat::Tiff);
    }

    #[test]
    fn test_load_explicit_file_and_create_folder() {
        let dir = tempfile::tempdir().unwrap();
        let save_folder = dir.path().join("out");
        let config_path = dir.path().join("asi.toml");
        fs::write(
            &config_path,
            format!("[output]\nsave_folder = {:?}\n", save_folder.display().to_string()),
        )
        .unwrap();

        let args = CliArgs::parse_from([
            "asi-capture",
            "--config",
            config_path.to_str().unwrap(),
            "list",
        ]);
        let config = Config::load(&args).unwrap();
        assert_eq!(config.output.save_folder, save_folder.display().to_string());
        assert!(save_folder.is_dir());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let args = CliArgs::parse_from(["asi-capture", "--config", "/nonexistent/asi.toml", "list"]);
        assert!(Config::load(&args).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_camera_settings() {
        let mut config = Config::default();
        config.camera.exposure_us = Some(-5);
        assert!(config.validate().is_err());
    }
}
