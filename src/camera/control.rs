use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{debug, error, info, warn};

use super::config::CameraConfig;
use super::roi::{resolve_roi, validate_roi_format, RoiRequest};
use crate::error::{AsiError, ErrorCode, Result};
use crate::frame::{buffer_size, Frame, FrameProcessor};
use crate::sdk::AsiSdk;
use crate::types::{
    CameraInfo, CameraMode, ControlCaps, ControlType, ExposureStatus, GainOffset, GuideDirection,
    ImageType, Roi, RoiFormat, TrigOutputPin, TriggerOutputConf,
};

/// Controls enabled by [`Camera::auto_exposure`] when none are named.
pub const DEFAULT_AUTO_EXPOSURE: [&str; 2] = ["Exposure", "Gain"];
/// Controls enabled by [`Camera::auto_wb`] when none are named.
pub const DEFAULT_AUTO_WB: [&str; 2] = ["WB_B", "WB_R"];

/// Wait forever for a video frame.
pub const WAIT_FOREVER: i32 = -1;

/// Video timeout for an exposure: twice the exposure plus 500 ms.
pub fn recommended_timeout_ms(exposure_us: i64) -> i32 {
    let ms = exposure_us.max(0) / 1000 * 2 + 500;
    ms.min(i64::from(i32::MAX)) as i32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraState {
    Open,
    /// Video capture mode is active.
    Video,
    Closed,
}

/// Timing for [`Camera::capture`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOptions {
    /// Sleep after starting the exposure, before the first status poll.
    pub initial_sleep: Duration,
    /// Sleep between status polls while the exposure is running.
    pub poll: Duration,
    pub is_dark: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            initial_sleep: Duration::from_millis(10),
            poll: Duration::from_millis(10),
            is_dark: false,
        }
    }
}

impl CaptureOptions {
    pub fn dark(mut self) -> Self {
        self.is_dark = true;
        self
    }
}

/// An open camera. Dropping it leaves video mode and closes the camera.
pub struct Camera {
    sdk: Arc<dyn AsiSdk>,
    info: CameraInfo,
    state: CameraState,
    default_timeout: i32,
}

impl fmt::Debug for Camera {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Camera")
            .field("name", &self.info.name)
            .field("id", &self.info.camera_id)
            .field("state", &self.state)
            .finish()
    }
}

impl Camera {
    /// Wrap a camera that has already been opened and initialised.
    pub(crate) fn new(sdk: Arc<dyn AsiSdk>, info: CameraInfo) -> Self {
        Self {
            sdk,
            info,
            state: CameraState::Open,
            default_timeout: WAIT_FOREVER,
        }
    }

    pub fn info(&self) -> &CameraInfo {
        &self.info
    }

    pub fn camera_id(&self) -> i32 {
        self.info.camera_id
    }

    pub fn state(&self) -> CameraState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == CameraState::Closed
    }

    /// Video timeout used when none is passed, in milliseconds. `-1` waits forever.
    pub fn default_timeout(&self) -> i32 {
        self.default_timeout
    }

    pub fn set_default_timeout(&mut self, timeout_ms: i32) {
        self.default_timeout = timeout_ms;
    }

    fn sdk(&self) -> Result<&dyn AsiSdk> {
        if self.is_closed() {
            return Err(AsiError::sdk(ErrorCode::CameraClosed));
        }
        Ok(self.sdk.as_ref())
    }

    /// Apply exposure, gain, ROI and speed settings.
    pub fn configure(&mut self, config: &CameraConfig) -> Result<()> {
        debug!("Configuring camera {}", self.info.name);

        let mut roi = config.roi;
        if roi.bins.is_none() {
            roi.bins = config.bins;
        }
        if roi.image_type.is_none() {
            roi.image_type = config.image_type;
        }
        self.set_roi(&roi)?;

        if let Some(exposure) = config.exposure_us {
            self.set_control_value(ControlType::EXPOSURE, exposure, false)?;
            debug!("Exposure set to {} µs", exposure);
        }
        if let Some(gain) = config.gain {
            self.set_control_value(ControlType::GAIN, gain, false)?;
            debug!("Gain set to {}", gain);
        }
        if let Some(high_speed) = config.high_speed_mode {
            self.set_control_value(ControlType::HIGH_SPEED_MODE, i64::from(high_speed), false)?;
        }
        if let Some(timeout) = config.timeout_ms {
            self.default_timeout = timeout;
        }

        info!("Camera configuration complete");
        Ok(())
    }

    pub fn serial_number(&self) -> Result<String> {
        self.sdk()?.serial_number(self.camera_id())
    }

    pub fn num_controls(&self) -> Result<i32> {
        self.sdk()?.num_controls(self.camera_id())
    }

    /// Capabilities of every control, keyed by control name.
    pub fn controls(&self) -> Result<BTreeMap<String, ControlCaps>> {
        let sdk = self.sdk()?;
        let mut controls = BTreeMap::new();
        for index in 0..sdk.num_controls(self.camera_id())? {
            let caps = sdk.control_caps(self.camera_id(), index)?;
            controls.insert(caps.name.clone(), caps);
        }
        Ok(controls)
    }

    pub fn control_value(&self, control: ControlType) -> Result<(i64, bool)> {
        self.sdk()?.control_value(self.camera_id(), control)
    }

    pub fn set_control_value(&self, control: ControlType, value: i64, auto: bool) -> Result<()> {
        self.sdk()?
            .set_control_value(self.camera_id(), control, value, auto)
    }

    /// Current value of every control, keyed by control name.
    pub fn control_values(&self) -> Result<BTreeMap<String, i64>> {
        self.controls()?
            .into_iter()
            .map(|(name, caps)| Ok((name, self.control_value(caps.control_type)?.0)))
            .collect()
    }

    /// Put the named controls in auto mode, starting from their defaults.
    ///
    /// `BandWidth` is skipped even though it supports auto. Returns the names
    /// that were switched.
    pub fn auto_exposure(&self, names: &[&str]) -> Result<Vec<String>> {
        let controls = self.controls()?;
        let mut enabled = Vec::new();
        for name in names {
            if *name == "BandWidth" {
                continue;
            }
            match controls.get(*name) {
                Some(caps) if caps.is_auto_supported => {
                    self.set_control_value(caps.control_type, caps.default_value, true)?;
                    enabled.push(name.to_string());
                }
                _ => debug!("{} has no auto mode on {}", name, self.info.name),
            }
        }
        Ok(enabled)
    }

    pub fn auto_wb(&self, names: &[&str]) -> Result<Vec<String>> {
        self.auto_exposure(names)
    }

    pub fn roi_format(&self) -> Result<RoiFormat> {
        self.sdk()?.roi_format(self.camera_id())
    }

    pub fn set_roi_format(&self, format: &RoiFormat) -> Result<()> {
        validate_roi_format(&self.info, format)?;
        self.sdk()?.set_roi_format(self.camera_id(), format)
    }

    pub fn roi_start_position(&self) -> Result<(i32, i32)> {
        self.sdk()?.start_pos(self.camera_id())
    }

    pub fn set_roi_start_position(&self, start_x: i32, start_y: i32) -> Result<()> {
        if start_x < 0 || start_y < 0 {
            return Err(AsiError::invalid_argument(format!(
                "ROI start position ({}, {}) is negative",
                start_x, start_y
            )));
        }
        self.sdk()?.set_start_pos(self.camera_id(), start_x, start_y)
    }

    pub fn roi(&self) -> Result<Roi> {
        let (start_x, start_y) = self.roi_start_position()?;
        let format = self.roi_format()?;
        Ok(Roi {
            start_x,
            start_y,
            width: format.width,
            height: format.height,
        })
    }

    /// Set the ROI, filling unset fields the way [`resolve_roi`] describes.
    pub fn set_roi(&self, request: &RoiRequest) -> Result<Roi> {
        let (format, (start_x, start_y)) = resolve_roi(&self.info, &self.roi_format()?, request)?;
        self.set_roi_format(&format)?;
        self.set_roi_start_position(start_x, start_y)?;
        debug!(
            "ROI set to {}x{}+{}+{} bin{} {:?}",
            format.width, format.height, start_x, start_y, format.bins, format.image_type
        );
        Ok(Roi {
            start_x,
            start_y,
            width: format.width,
            height: format.height,
        })
    }

    pub fn bins(&self) -> Result<i32> {
        Ok(self.roi_format()?.bins)
    }

    pub fn image_type(&self) -> Result<ImageType> {
        Ok(self.roi_format()?.image_type)
    }

    pub fn set_image_type(&self, image_type: ImageType) -> Result<()> {
        let format = RoiFormat {
            image_type,
            ..self.roi_format()?
        };
        self.set_roi_format(&format)
    }

    pub fn dropped_frames(&self) -> Result<i32> {
        self.sdk()?.dropped_frames(self.camera_id())
    }

    /// Subtract a dark frame (BMP file) inside the SDK.
    pub fn enable_dark_subtract(&self, path: impl AsRef<Path>) -> Result<()> {
        self.sdk()?
            .enable_dark_subtract(self.camera_id(), path.as_ref())
    }

    pub fn disable_dark_subtract(&self) -> Result<()> {
        self.sdk()?.disable_dark_subtract(self.camera_id())
    }

    pub fn start_exposure(&self, is_dark: bool) -> Result<()> {
        self.sdk()?.start_exposure(self.camera_id(), is_dark)
    }

    pub fn stop_exposure(&self) -> Result<()> {
        self.sdk()?.stop_exposure(self.camera_id())
    }

    pub fn exposure_status(&self) -> Result<ExposureStatus> {
        self.sdk()?.exposure_status(self.camera_id())
    }

    /// Raw pixel data of the finished exposure.
    pub fn data_after_exposure(&self) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; buffer_size(&self.roi_format()?)];
        self.data_after_exposure_into(&mut buffer)?;
        Ok(buffer)
    }

    /// Like [`Camera::data_after_exposure`], reusing `buffer`.
    pub fn data_after_exposure_into(&self, buffer: &mut [u8]) -> Result<()> {
        self.check_buffer(buffer)?;
        self.sdk()?.data_after_exposure(self.camera_id(), buffer)
    }

    /// Take a still image and wait for it.
    pub fn capture(&self, options: &CaptureOptions) -> Result<Frame> {
        let mut buffer = vec![0u8; buffer_size(&self.roi_format()?)];
        self.capture_into(options, &mut buffer)
    }

    /// Like [`Camera::capture`], reading the image through `buffer`.
    ///
    /// The buffer is checked against the ROI before the exposure starts.
    pub fn capture_into(&self, options: &CaptureOptions, buffer: &mut [u8]) -> Result<Frame> {
        let format = self.roi_format()?;
        self.check_buffer(buffer)?;

        self.start_exposure(options.is_dark)?;
        if !options.initial_sleep.is_zero() {
            thread::sleep(options.initial_sleep);
        }

        let mut status = self.exposure_status()?;
        while status == ExposureStatus::Working {
            if !options.poll.is_zero() {
                thread::sleep(options.poll);
            }
            status = self.exposure_status()?;
        }
        if status != ExposureStatus::Success {
            warn!("Exposure on {} ended with {:?}", self.info.name, status);
            return Err(AsiError::Capture(status));
        }

        self.sdk()?.data_after_exposure(self.camera_id(), buffer)?;
        FrameProcessor::decode(buffer, &format)
    }

    pub fn start_video_capture(&mut self) -> Result<()> {
        self.sdk()?.start_video_capture(self.camera_id())?;
        self.state = CameraState::Video;
        debug!("Video capture started on {}", self.info.name);
        Ok(())
    }

    pub fn stop_video_capture(&mut self) -> Result<()> {
        self.sdk()?.stop_video_capture(self.camera_id())?;
        self.state = CameraState::Open;
        debug!("Video capture stopped on {}", self.info.name);
        Ok(())
    }

    /// One raw video frame. `None` uses the default timeout.
    pub fn video_data(&self, timeout_ms: Option<i32>) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; buffer_size(&self.roi_format()?)];
        self.video_data_into(&mut buffer, timeout_ms)?;
        Ok(buffer)
    }

    /// Like [`Camera::video_data`], reusing `buffer`.
    pub fn video_data_into(&self, buffer: &mut [u8], timeout_ms: Option<i32>) -> Result<()> {
        if self.state != CameraState::Video {
            return Err(AsiError::VideoNotStarted);
        }
        self.check_buffer(buffer)?;
        let timeout = timeout_ms.unwrap_or(self.default_timeout);
        self.sdk()?.video_data(self.camera_id(), buffer, timeout)
    }

    /// Grab and decode one video frame.
    ///
    /// A sensible timeout is twice the exposure plus 500 ms.
    pub fn capture_video_frame(&self, timeout_ms: Option<i32>) -> Result<Frame> {
        let mut buffer = vec![0u8; buffer_size(&self.roi_format()?)];
        self.capture_video_frame_into(&mut buffer, timeout_ms)
    }

    /// Like [`Camera::capture_video_frame`], reading the frame through `buffer`.
    pub fn capture_video_frame_into(
        &self,
        buffer: &mut [u8],
        timeout_ms: Option<i32>,
    ) -> Result<Frame> {
        let format = self.roi_format()?;
        self.video_data_into(buffer, timeout_ms)?;
        FrameProcessor::decode(buffer, &format)
    }

    fn check_buffer(&self, buffer: &[u8]) -> Result<()> {
        let expected = buffer_size(&self.roi_format()?);
        if buffer.len() != expected {
            return Err(AsiError::BufferSize {
                expected,
                actual: buffer.len(),
            });
        }
        Ok(())
    }

    pub fn pulse_guide_on(&self, direction: GuideDirection) -> Result<()> {
        self.sdk()?.pulse_guide_on(self.camera_id(), direction)
    }

    pub fn pulse_guide_off(&self, direction: GuideDirection) -> Result<()> {
        self.sdk()?.pulse_guide_off(self.camera_id(), direction)
    }

    /// The user-settable id stored in camera flash.
    pub fn id(&self) -> Result<String> {
        self.sdk()?.id(self.camera_id())
    }

    pub fn set_id(&self, new_id: &str) -> Result<()> {
        if new_id.len() > 8 {
            return Err(AsiError::invalid_argument(format!(
                "camera id '{}' is longer than 8 bytes",
                new_id
            )));
        }
        self.sdk()?.set_id(self.camera_id(), new_id)
    }

    pub fn gain_offset(&self) -> Result<GainOffset> {
        self.sdk()?.gain_offset(self.camera_id())
    }

    pub fn camera_support_mode(&self) -> Result<Vec<CameraMode>> {
        self.sdk()?.camera_support_mode(self.camera_id())
    }

    pub fn camera_mode(&self) -> Result<CameraMode> {
        self.sdk()?.camera_mode(self.camera_id())
    }

    pub fn set_camera_mode(&self, mode: CameraMode) -> Result<()> {
        self.sdk()?.set_camera_mode(self.camera_id(), mode)
    }

    pub fn send_soft_trigger(&self, start: bool) -> Result<()> {
        self.sdk()?.send_soft_trigger(self.camera_id(), start)
    }

    pub fn trigger_output_io_conf(&self, pin: TrigOutputPin) -> Result<TriggerOutputConf> {
        self.sdk()?.trigger_output_io_conf(self.camera_id(), pin)
    }

    pub fn set_trigger_output_io_conf(
        &self,
        pin: TrigOutputPin,
        conf: &TriggerOutputConf,
    ) -> Result<()> {
        self.sdk()?
            .set_trigger_output_io_conf(self.camera_id(), pin, conf)
    }

    /// Close the camera. Calling this again is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.is_closed() {
            return Ok(());
        }
        if self.state == CameraState::Video {
            if let Err(e) = self.sdk.stop_video_capture(self.camera_id()) {
                warn!("Failed to stop video on {}: {}", self.info.name, e);
            }
        }
        let result = self.sdk.close_camera(self.camera_id());
        self.state = CameraState::Closed;
        info!("Closed camera {}", self.info.name);
        result
    }
}

impl Drop for Camera {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            error!("Failed to close camera on drop {:?}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Asi;
    use crate::frame::Pixels;
    use crate::sdk::mock::{MockCameraSpec, MockSdk};

    fn open(spec: MockCameraSpec) -> (Arc<MockSdk>, Camera) {
        let mock = Arc::new(MockSdk::new().with_camera(spec));
        let camera = Asi::new(mock.clone()).open(0).unwrap();
        (mock, camera)
    }

    fn small() -> MockCameraSpec {
        MockCameraSpec::mono("ZWO ASI290MM", 64, 48)
    }

    #[test]
    fn test_controls_by_name() {
        let (_, camera) = open(small());
        let controls = camera.controls().unwrap();
        assert_eq!(controls.len() as i32, camera.num_controls().unwrap());
        assert_eq!(controls["Gain"].control_type, ControlType::GAIN);
        assert_eq!(camera.control_values().unwrap()["Exposure"], 10_000);
    }

    #[test]
    fn test_auto_exposure_skips_bandwidth_and_unknown() {
        let (_, camera) = open(small());
        let enabled = camera
            .auto_exposure(&["Exposure", "BandWidth", "Gamma", "Nope"])
            .unwrap();
        assert_eq!(enabled, vec!["Exposure".to_string()]);
        assert_eq!(camera.control_value(ControlType::EXPOSURE).unwrap(), (10_000, true));
        assert!(!camera.control_value(ControlType::BANDWIDTHOVERLOAD).unwrap().1);
    }

    #[test]
    fn test_auto_wb_on_color_camera() {
        let (_, camera) = open(MockCameraSpec::color("ZWO ASI224MC", 64, 48));
        assert_eq!(
            camera.auto_wb(&DEFAULT_AUTO_WB).unwrap(),
            vec!["WB_B".to_string(), "WB_R".to_string()]
        );
    }

    #[test]
    fn test_set_roi_then_read_back() {
        let (_, camera) = open(MockCameraSpec::mono("ZWO ASI290MM", 1936, 1096));
        let roi = camera
            .set_roi(&RoiRequest::new().with_size(640, 480).with_image_type(ImageType::Raw16))
            .unwrap();
        assert_eq!(camera.roi().unwrap(), roi);
        assert_eq!(roi.start_x, (1936 - 640) / 2);
        assert_eq!(camera.image_type().unwrap(), ImageType::Raw16);
        assert_eq!(camera.bins().unwrap(), 1);
    }

    #[test]
    fn test_set_roi_rejects_far_start_without_touching_format() {
        let (_, camera) = open(MockCameraSpec::mono("ZWO ASI290MM", 1936, 1096));
        let before = camera.roi_format().unwrap();
        let err = camera
            .set_roi(&RoiRequest::new().with_size(64, 64).with_start(i32::MAX, 0))
            .unwrap_err();
        assert!(matches!(err, AsiError::InvalidArgument(_)));
        assert_eq!(camera.roi_format().unwrap(), before);
    }

    #[test]
    fn test_set_roi_format_validates_before_sdk() {
        let (_, camera) = open(small());
        let err = camera
            .set_roi_format(&RoiFormat {
                width: 12,
                height: 8,
                bins: 1,
                image_type: ImageType::Raw8,
            })
            .unwrap_err();
        assert!(matches!(err, AsiError::InvalidArgument(_)));
        assert!(camera.set_roi_start_position(-1, 0).is_err());
    }

    #[test]
    fn test_capture_still() {
        let (_, camera) = open(small().with_exposure_polls(3));
        let options = CaptureOptions {
            initial_sleep: Duration::ZERO,
            poll: Duration::ZERO,
            is_dark: false,
        };
        let frame = camera.capture(&options).unwrap();
        assert_eq!(frame.shape(), vec![48, 64]);
        assert!(matches!(frame.pixels, Pixels::U8(_)));
    }

    #[test]
    fn test_capture_into_reuses_buffer() {
        let (_, camera) = open(small().with_exposure_polls(0));
        let options = CaptureOptions {
            initial_sleep: Duration::ZERO,
            poll: Duration::ZERO,
            is_dark: false,
        };
        let mut buffer = vec![0u8; 64 * 48];
        let first = camera.capture_into(&options, &mut buffer).unwrap();
        assert_eq!(first.shape(), vec![48, 64]);
        let second = camera.capture_into(&options, &mut buffer).unwrap();
        assert_eq!(second.len(), first.len());

        let mut short = vec![0u8; 10];
        assert!(matches!(
            camera.capture_into(&options, &mut short),
            Err(AsiError::BufferSize {
                expected: 3072,
                actual: 10
            })
        ));
    }

    #[test]
    fn test_capture_video_frame_into_reuses_buffer() {
        let (_, mut camera) = open(small());
        let mut buffer = vec![0u8; 64 * 48];
        assert!(matches!(
            camera.capture_video_frame_into(&mut buffer, Some(100)),
            Err(AsiError::VideoNotStarted)
        ));
        camera.start_video_capture().unwrap();
        for _ in 0..3 {
            let frame = camera.capture_video_frame_into(&mut buffer, None).unwrap();
            assert_eq!(frame.shape(), vec![48, 64]);
        }
        camera.stop_video_capture().unwrap();
    }

    #[test]
    fn test_capture_failure_reports_status() {
        let (_, camera) = open(small().with_failing_exposures());
        let err = camera.capture(&CaptureOptions::default()).unwrap_err();
        assert!(matches!(err, AsiError::Capture(ExposureStatus::Failed)));
    }

    #[test]
    fn test_video_frame_requires_video_mode() {
        let (mock, mut camera) = open(small());
        assert!(matches!(
            camera.capture_video_frame(Some(100)),
            Err(AsiError::VideoNotStarted)
        ));
        camera.start_video_capture().unwrap();
        assert_eq!(camera.state(), CameraState::Video);
        assert!(mock.is_video_active(0));

        let frame = camera.capture_video_frame(None).unwrap();
        assert_eq!(frame.len(), 64 * 48);

        let mut wrong = vec![0u8; 3];
        assert!(matches!(
            camera.video_data_into(&mut wrong, None),
            Err(AsiError::BufferSize { .. })
        ));

        camera.stop_video_capture().unwrap();
        assert!(!mock.is_video_active(0));
    }

    #[test]
    fn test_close_is_idempotent_and_stops_video() {
        let (mock, mut camera) = open(small());
        camera.start_video_capture().unwrap();
        camera.close().unwrap();
        camera.close().unwrap();
        assert!(camera.is_closed());
        assert!(!mock.is_open(0));
        assert_eq!(
            camera.roi_format().unwrap_err().code(),
            Some(ErrorCode::CameraClosed)
        );
    }

    #[test]
    fn test_set_id_length() {
        let (_, camera) = open(small());
        camera.set_id("scope1").unwrap();
        assert_eq!(camera.id().unwrap(), "scope1");
        assert!(matches!(
            camera.set_id("much-too-long"),
            Err(AsiError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_serial_number_is_hex() {
        let (_, camera) = open(small());
        assert_eq!(camera.serial_number().unwrap(), "123456789abcdef0");
    }

    #[test]
    fn test_dark_subtract_path_forwarded() {
        let dir = tempfile::tempdir().unwrap();
        let dark = dir.path().join("dark.bmp");
        std::fs::write(&dark, b"BM").unwrap();

        let (mock, camera) = open(small());
        camera.enable_dark_subtract(&dark).unwrap();
        assert_eq!(mock.dark_subtract_path(0), Some(dark));
        camera.disable_dark_subtract().unwrap();
        assert_eq!(mock.dark_subtract_path(0), None);
    }

    #[test]
    fn test_trigger_modes() {
        let (mock, camera) = open(small().with_trigger_modes());
        assert!(camera
            .camera_support_mode()
            .unwrap()
            .contains(&CameraMode::TrigSoftEdge));
        camera.set_camera_mode(CameraMode::TrigSoftEdge).unwrap();
        assert_eq!(camera.camera_mode().unwrap(), CameraMode::TrigSoftEdge);
        camera.send_soft_trigger(true).unwrap();
        assert_eq!(mock.soft_triggers(0), vec![true]);

        let conf = TriggerOutputConf {
            pin_high: true,
            delay: 100,
            duration: 2000,
        };
        camera.set_trigger_output_io_conf(TrigOutputPin::A, &conf).unwrap();
        assert_eq!(camera.trigger_output_io_conf(TrigOutputPin::A).unwrap(), conf);
    }

    #[test]
    fn test_recommended_timeout() {
        assert_eq!(recommended_timeout_ms(10_000), 520);
        assert_eq!(recommended_timeout_ms(0), 500);
        assert_eq!(recommended_timeout_ms(i64::MAX), i32::MAX);
    }

    #[test]
    fn test_pulse_guide() {
        let (mock, camera) = open(small());
        camera.pulse_guide_on(GuideDirection::North).unwrap();
        assert_eq!(mock.guiding(0), vec![GuideDirection::North]);
        camera.pulse_guide_off(GuideDirection::North).unwrap();
        assert!(mock.guiding(0).is_empty());
    }
}
