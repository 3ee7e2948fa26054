//! The ASI SDK call surface.
//!
//! [`AsiSdk`] has one safe method per exported SDK function. [`AsiLibrary`]
//! forwards them into the vendor binary, [`mock::MockSdk`] simulates cameras
//! in memory for tests and dry runs.

pub mod ffi;
pub mod library;
pub mod locate;
pub mod mock;

use std::path::Path;
use std::sync::{Arc, OnceLock};

use log::debug;

use crate::error::Result;
use crate::types::{
    CameraInfo, CameraMode, ControlCaps, ControlType, ExposureStatus, GainOffset, GuideDirection,
    RoiFormat, TrigOutputPin, TriggerOutputConf,
};

pub use library::AsiLibrary;
pub use locate::{candidates, library_names, locate, LibrarySource, LIBRARY_ENV_VAR};

/// Camera ids below are the `CameraID` reported by [`AsiSdk::camera_property`].
pub trait AsiSdk: Send + Sync {
    fn num_connected_cameras(&self) -> i32;
    fn camera_property(&self, index: i32) -> Result<CameraInfo>;

    fn open_camera(&self, id: i32) -> Result<()>;
    fn init_camera(&self, id: i32) -> Result<()>;
    fn close_camera(&self, id: i32) -> Result<()>;

    fn num_controls(&self, id: i32) -> Result<i32>;
    fn control_caps(&self, id: i32, index: i32) -> Result<ControlCaps>;
    /// Returns `(value, auto)`.
    fn control_value(&self, id: i32, control: ControlType) -> Result<(i64, bool)>;
    fn set_control_value(&self, id: i32, control: ControlType, value: i64, auto: bool)
        -> Result<()>;

    fn roi_format(&self, id: i32) -> Result<RoiFormat>;
    fn set_roi_format(&self, id: i32, format: &RoiFormat) -> Result<()>;
    fn start_pos(&self, id: i32) -> Result<(i32, i32)>;
    fn set_start_pos(&self, id: i32, start_x: i32, start_y: i32) -> Result<()>;
    fn dropped_frames(&self, id: i32) -> Result<i32>;

    fn enable_dark_subtract(&self, id: i32, path: &Path) -> Result<()>;
    fn disable_dark_subtract(&self, id: i32) -> Result<()>;

    fn start_video_capture(&self, id: i32) -> Result<()>;
    fn stop_video_capture(&self, id: i32) -> Result<()>;
    /// `timeout_ms` of -1 waits forever.
    fn video_data(&self, id: i32, buffer: &mut [u8], timeout_ms: i32) -> Result<()>;

    fn pulse_guide_on(&self, id: i32, direction: GuideDirection) -> Result<()>;
    fn pulse_guide_off(&self, id: i32, direction: GuideDirection) -> Result<()>;

    fn start_exposure(&self, id: i32, is_dark: bool) -> Result<()>;
    fn stop_exposure(&self, id: i32) -> Result<()>;
    fn exposure_status(&self, id: i32) -> Result<ExposureStatus>;
    fn data_after_exposure(&self, id: i32, buffer: &mut [u8]) -> Result<()>;

    fn id(&self, id: i32) -> Result<String>;
    fn set_id(&self, id: i32, new_id: &str) -> Result<()>;
    fn gain_offset(&self, id: i32) -> Result<GainOffset>;
    fn serial_number(&self, id: i32) -> Result<String>;

    fn camera_support_mode(&self, id: i32) -> Result<Vec<CameraMode>>;
    fn camera_mode(&self, id: i32) -> Result<CameraMode>;
    fn set_camera_mode(&self, id: i32, mode: CameraMode) -> Result<()>;
    fn send_soft_trigger(&self, id: i32, start: bool) -> Result<()>;
    fn trigger_output_io_conf(&self, id: i32, pin: TrigOutputPin) -> Result<TriggerOutputConf>;
    fn set_trigger_output_io_conf(
        &self,
        id: i32,
        pin: TrigOutputPin,
        conf: &TriggerOutputConf,
    ) -> Result<()>;
}

static LOADED: OnceLock<Arc<AsiLibrary>> = OnceLock::new();

/// Load the vendor library once per process.
///
/// Later calls return the already loaded library and ignore `library_file`.
pub fn init(library_file: Option<&Path>) -> Result<Arc<AsiLibrary>> {
    if let Some(lib) = LOADED.get() {
        debug!("ASI SDK already loaded from {}", lib.path().display());
        return Ok(Arc::clone(lib));
    }

    let lib = Arc::new(AsiLibrary::load_from(&locate(library_file)?)?);
    // A concurrent caller may have won the race; keep whichever got stored.
    Ok(Arc::clone(LOADED.get_or_init(|| lib)))
}
