//! Enumerations and value types mirrored from the ASI SDK header.

use serde::{Deserialize, Serialize};

use crate::error::{AsiError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    Raw8,
    Rgb24,
    Raw16,
    Y8,
}

impl ImageType {
    /// Terminator used by the SDK in format lists.
    pub const END: i32 = -1;

    pub fn from_raw(raw: i32) -> Result<Self> {
        match raw {
            0 => Ok(ImageType::Raw8),
            1 => Ok(ImageType::Rgb24),
            2 => Ok(ImageType::Raw16),
            3 => Ok(ImageType::Y8),
            other => Err(AsiError::UnsupportedImageType(other)),
        }
    }

    pub fn raw(self) -> i32 {
        match self {
            ImageType::Raw8 => 0,
            ImageType::Rgb24 => 1,
            ImageType::Raw16 => 2,
            ImageType::Y8 => 3,
        }
    }

    pub fn bytes_per_pixel(self) -> usize {
        match self {
            ImageType::Raw8 | ImageType::Y8 => 1,
            ImageType::Raw16 => 2,
            ImageType::Rgb24 => 3,
        }
    }
}

impl std::str::FromStr for ImageType {
    type Err = AsiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "raw8" => Ok(ImageType::Raw8),
            "rgb24" => Ok(ImageType::Rgb24),
            "raw16" => Ok(ImageType::Raw16),
            "y8" => Ok(ImageType::Y8),
            other => Err(AsiError::invalid_argument(format!(
                "unknown image type '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BayerPattern {
    Rg,
    Bg,
    Gr,
    Gb,
}

impl BayerPattern {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(BayerPattern::Rg),
            1 => Some(BayerPattern::Bg),
            2 => Some(BayerPattern::Gr),
            3 => Some(BayerPattern::Gb),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuideDirection {
    North,
    South,
    East,
    West,
}

impl GuideDirection {
    pub fn raw(self) -> i32 {
        match self {
            GuideDirection::North => 0,
            GuideDirection::South => 1,
            GuideDirection::East => 2,
            GuideDirection::West => 3,
        }
    }
}

/// Control identifier. Kept open-ended because cameras report control types
/// this crate may not know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControlType(pub i32);

impl ControlType {
    pub const GAIN: Self = Self(0);
    /// Microseconds.
    pub const EXPOSURE: Self = Self(1);
    pub const GAMMA: Self = Self(2);
    pub const WB_R: Self = Self(3);
    pub const WB_B: Self = Self(4);
    pub const OFFSET: Self = Self(5);
    pub const BRIGHTNESS: Self = Self::OFFSET;
    pub const BANDWIDTHOVERLOAD: Self = Self(6);
    pub const OVERCLOCK: Self = Self(7);
    /// Ten times the sensor temperature in degrees Celsius.
    pub const TEMPERATURE: Self = Self(8);
    pub const FLIP: Self = Self(9);
    pub const AUTO_MAX_GAIN: Self = Self(10);
    pub const AUTO_MAX_EXP: Self = Self(11);
    pub const AUTO_TARGET_BRIGHTNESS: Self = Self(12);
    pub const HARDWARE_BIN: Self = Self(13);
    pub const HIGH_SPEED_MODE: Self = Self(14);
    pub const COOLER_POWER_PERC: Self = Self(15);
    /// Degrees Celsius, not scaled.
    pub const TARGET_TEMP: Self = Self(16);
    pub const COOLER_ON: Self = Self(17);
    pub const MONO_BIN: Self = Self(18);
    pub const FAN_ON: Self = Self(19);
    pub const PATTERN_ADJUST: Self = Self(20);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraMode {
    Normal,
    TrigSoftEdge,
    TrigRiseEdge,
    TrigFallEdge,
    TrigSoftLevel,
    TrigHighLevel,
    TrigLowLevel,
}

impl CameraMode {
    pub const END: i32 = -1;

    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(CameraMode::Normal),
            1 => Some(CameraMode::TrigSoftEdge),
            2 => Some(CameraMode::TrigRiseEdge),
            3 => Some(CameraMode::TrigFallEdge),
            4 => Some(CameraMode::TrigSoftLevel),
            5 => Some(CameraMode::TrigHighLevel),
            6 => Some(CameraMode::TrigLowLevel),
            _ => None,
        }
    }

    pub fn raw(self) -> i32 {
        match self {
            CameraMode::Normal => 0,
            CameraMode::TrigSoftEdge => 1,
            CameraMode::TrigRiseEdge => 2,
            CameraMode::TrigFallEdge => 3,
            CameraMode::TrigSoftLevel => 4,
            CameraMode::TrigHighLevel => 5,
            CameraMode::TrigLowLevel => 6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrigOutputPin {
    A,
    B,
    None,
}

impl TrigOutputPin {
    pub fn raw(self) -> i32 {
        match self {
            TrigOutputPin::A => 0,
            TrigOutputPin::B => 1,
            TrigOutputPin::None => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExposureStatus {
    Idle,
    Working,
    Success,
    Failed,
}

impl ExposureStatus {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => ExposureStatus::Idle,
            1 => ExposureStatus::Working,
            2 => ExposureStatus::Success,
            _ => ExposureStatus::Failed,
        }
    }

    pub fn raw(self) -> i32 {
        match self {
            ExposureStatus::Idle => 0,
            ExposureStatus::Working => 1,
            ExposureStatus::Success => 2,
            ExposureStatus::Failed => 3,
        }
    }
}

/// Static description of a connected camera (`ASI_CAMERA_INFO`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraInfo {
    pub name: String,
    pub camera_id: i32,
    pub max_height: i64,
    pub max_width: i64,
    pub is_color_cam: bool,
    pub bayer_pattern: i32,
    pub supported_bins: Vec<i32>,
    /// Raw `ASI_IMG_TYPE` values, see [`CameraInfo::video_formats`].
    pub supported_video_format: Vec<i32>,
    /// Microns.
    pub pixel_size: f64,
    pub mechanical_shutter: bool,
    pub st4_port: bool,
    pub is_cooler_cam: bool,
    pub is_usb3_host: bool,
    pub is_usb3_camera: bool,
    pub elec_per_adu: f32,
    pub bit_depth: i32,
    pub is_trigger_cam: bool,
}

impl CameraInfo {
    pub fn video_formats(&self) -> Vec<ImageType> {
        self.supported_video_format
            .iter()
            .filter_map(|raw| ImageType::from_raw(*raw).ok())
            .collect()
    }

    pub fn supports_bins(&self, bins: i32) -> bool {
        self.supported_bins.contains(&bins)
    }

    /// Sensor colour filter layout, `None` on mono cameras.
    pub fn bayer_pattern(&self) -> Option<BayerPattern> {
        if !self.is_color_cam {
            return None;
        }
        BayerPattern::from_raw(self.bayer_pattern)
    }
}

/// Capabilities of one control (`ASI_CONTROL_CAPS`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlCaps {
    pub name: String,
    pub description: String,
    pub max_value: i64,
    pub min_value: i64,
    pub default_value: i64,
    pub is_auto_supported: bool,
    pub is_writable: bool,
    pub control_type: ControlType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoiFormat {
    pub width: i32,
    pub height: i32,
    pub bins: i32,
    pub image_type: ImageType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roi {
    pub start_x: i32,
    pub start_y: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GainOffset {
    pub offset_highest_dr: i32,
    pub offset_unity_gain: i32,
    pub gain_lowest_rn: i32,
    pub offset_lowest_rn: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerOutputConf {
    pub pin_high: bool,
    /// Microseconds.
    pub delay: i64,
    /// Microseconds.
    pub duration: i64,
}
