use serde::{Deserialize, Serialize};

use super::asi::CameraSelector;
use super::roi::RoiRequest;
use crate::types::ImageType;

/// Camera selection and acquisition settings. Unset values leave the camera
/// as the SDK initialised it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub index: Option<i32>,
    /// Model name, with or without the `ZWO ` prefix. Wins over `index`.
    pub model: Option<String>,
    pub exposure_us: Option<i64>,
    pub gain: Option<i64>,
    pub bins: Option<i32>,
    pub image_type: Option<ImageType>,
    pub roi: RoiRequest,
    /// Video frame timeout. `-1` waits forever.
    pub timeout_ms: Option<i32>,
    pub high_speed_mode: Option<bool>,
}

impl CameraConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index(mut self, index: i32) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_exposure(mut self, exposure_us: i64) -> Self {
        self.exposure_us = Some(exposure_us);
        self
    }

    pub fn with_gain(mut self, gain: i64) -> Self {
        self.gain = Some(gain);
        self
    }

    pub fn with_bins(mut self, bins: i32) -> Self {
        self.bins = Some(bins);
        self
    }

    pub fn with_image_type(mut self, image_type: ImageType) -> Self {
        self.image_type = Some(image_type);
        self
    }

    pub fn with_resolution(mut self, width: i32, height: i32) -> Self {
        self.roi.width = Some(width);
        self.roi.height = Some(height);
        self
    }

    pub fn with_offset(mut self, start_x: i32, start_y: i32) -> Self {
        self.roi.start_x = Some(start_x);
        self.roi.start_y = Some(start_y);
        self
    }

    pub fn with_timeout(mut self, timeout_ms: i32) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn selector(&self) -> CameraSelector {
        match (&self.model, self.index) {
            (Some(model), _) => CameraSelector::Model(model.clone()),
            (None, Some(index)) => CameraSelector::Index(index),
            (None, None) => CameraSelector::Index(0),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if matches!(self.index, Some(index) if index < 0) {
            return Err("Camera index must not be negative".to_string());
        }
        if matches!(self.model.as_deref(), Some(model) if model.trim().is_empty()) {
            return Err("Camera model must not be empty".to_string());
        }
        if matches!(self.exposure_us, Some(exposure) if exposure <= 0) {
            return Err("Exposure must be greater than 0".to_string());
        }
        if matches!(self.gain, Some(gain) if gain < 0) {
            return Err("Gain must not be negative".to_string());
        }
        if matches!(self.bins.or(self.roi.bins), Some(bins) if bins < 1) {
            return Err("Bins must be at least 1".to_string());
        }
        if matches!(self.roi.width, Some(width) if width <= 0)
            || matches!(self.roi.height, Some(height) if height <= 0)
        {
            return Err("Width and height must be greater than 0".to_string());
        }
        if matches!(self.timeout_ms, Some(timeout) if timeout < -1) {
            return Err("Timeout must be -1 or at least 0".to_string());
        }
        Ok(())
    }
}
