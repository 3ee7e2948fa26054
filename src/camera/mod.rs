//! Opening cameras and driving them through the SDK.

mod asi;
mod config;
mod control;
mod roi;

pub use asi::{Asi, CameraSelector};
pub use config::CameraConfig;
pub use control::{
    recommended_timeout_ms, Camera, CameraState, CaptureOptions, DEFAULT_AUTO_EXPOSURE,
    DEFAULT_AUTO_WB, WAIT_FOREVER,
};
pub use roi::{binned_size, resolve_roi, validate_roi_format, RoiRequest};
