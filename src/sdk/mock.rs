//! In-memory stand-in for the ASI SDK, for testing without hardware.
//!
//! Misuse is reported with the status codes the vendor library uses, so code
//! driven against [`MockSdk`] sees the same errors it would see on a camera.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::ffi::{serial_to_hex, ASI_ID};
use super::AsiSdk;
use crate::error::{AsiError, ErrorCode, Result};
use crate::types::{
    CameraInfo, CameraMode, ControlCaps, ControlType, ExposureStatus, GainOffset, GuideDirection,
    ImageType, RoiFormat, TrigOutputPin, TriggerOutputConf,
};

/// Description of one simulated camera.
#[derive(Debug, Clone)]
pub struct MockCameraSpec {
    pub info: CameraInfo,
    pub controls: Vec<ControlCaps>,
    pub serial: [u8; 8],
    /// Status polls that report `Working` before an exposure completes.
    pub exposure_polls: u32,
    /// Finish every exposure with `Failed`.
    pub fail_exposures: bool,
    /// `ASIInitCamera` fails with a general error.
    pub fail_init: bool,
    /// Number of video frames that time out before frames are delivered.
    pub video_timeouts: u32,
    pub supported_modes: Vec<CameraMode>,
}

#[allow(clippy::too_many_arguments)]
fn control(
    name: &str,
    description: &str,
    control_type: ControlType,
    min_value: i64,
    max_value: i64,
    default_value: i64,
    is_auto_supported: bool,
    is_writable: bool,
) -> ControlCaps {
    ControlCaps {
        name: name.to_string(),
        description: description.to_string(),
        max_value,
        min_value,
        default_value,
        is_auto_supported,
        is_writable,
        control_type,
    }
}

impl MockCameraSpec {
    pub fn mono(name: &str, max_width: i64, max_height: i64) -> Self {
        let info = CameraInfo {
            name: name.to_string(),
            camera_id: 0,
            max_height,
            max_width,
            is_color_cam: false,
            bayer_pattern: 0,
            supported_bins: vec![1, 2, 3, 4],
            supported_video_format: vec![
                ImageType::Raw8.raw(),
                ImageType::Raw16.raw(),
                ImageType::Y8.raw(),
            ],
            pixel_size: 2.9,
            mechanical_shutter: false,
            st4_port: true,
            is_cooler_cam: false,
            is_usb3_host: true,
            is_usb3_camera: true,
            elec_per_adu: 1.0,
            bit_depth: 12,
            is_trigger_cam: false,
        };

        Self {
            info,
            controls: vec![
                control("Gain", "Gain", ControlType::GAIN, 0, 600, 0, true, true),
                control(
                    "Exposure",
                    "Exposure Time(us)",
                    ControlType::EXPOSURE,
                    32,
                    2_000_000_000,
                    10_000,
                    true,
                    true,
                ),
                control("Gamma", "Gamma", ControlType::GAMMA, 1, 100, 50, false, true),
                control("Offset", "offset", ControlType::OFFSET, 0, 80, 1, false, true),
                control(
                    "BandWidth",
                    "The total data transfer rate percentage",
                    ControlType::BANDWIDTHOVERLOAD,
                    40,
                    100,
                    50,
                    true,
                    true,
                ),
                control("Flip", "Flip: 0->None 1->Horiz 2->Vert 3->Both", ControlType::FLIP, 0, 3, 0, false, true),
                control(
                    "HighSpeedMode",
                    "Is high speed mode:0->No 1->Yes",
                    ControlType::HIGH_SPEED_MODE,
                    0,
                    1,
                    0,
                    false,
                    true,
                ),
                control(
                    "Temperature",
                    "Sensor temperature(degrees Celsius)",
                    ControlType::TEMPERATURE,
                    -500,
                    1000,
                    20,
                    false,
                    false,
                ),
            ],
            serial: [0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0xde, 0xf0],
            exposure_polls: 1,
            fail_exposures: false,
            fail_init: false,
            video_timeouts: 0,
            supported_modes: vec![CameraMode::Normal],
        }
    }

    pub fn color(name: &str, max_width: i64, max_height: i64) -> Self {
        let mut spec = Self::mono(name, max_width, max_height);
        spec.info.is_color_cam = true;
        spec.info.supported_bins = vec![1, 2];
        spec.info.supported_video_format = vec![
            ImageType::Raw8.raw(),
            ImageType::Rgb24.raw(),
            ImageType::Raw16.raw(),
            ImageType::Y8.raw(),
        ];
        spec.controls.push(control("WB_R", "White balance: Red component", ControlType::WB_R, 1, 99, 52, true, true));
        spec.controls.push(control("WB_B", "White balance: Blue component", ControlType::WB_B, 1, 99, 95, true, true));
        spec
    }

    pub fn with_trigger_modes(mut self) -> Self {
        self.info.is_trigger_cam = true;
        self.supported_modes = vec![
            CameraMode::Normal,
            CameraMode::TrigSoftEdge,
            CameraMode::TrigRiseEdge,
            CameraMode::TrigFallEdge,
        ];
        self
    }

    pub fn with_exposure_polls(mut self, polls: u32) -> Self {
        self.exposure_polls = polls;
        self
    }

    pub fn with_failing_exposures(mut self) -> Self {
        self.fail_exposures = true;
        self
    }

    pub fn with_failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    pub fn with_video_timeouts(mut self, timeouts: u32) -> Self {
        self.video_timeouts = timeouts;
        self
    }
}

#[derive(Debug)]
enum Exposure {
    Idle,
    Working { polls_left: u32, is_dark: bool },
    Done { status: ExposureStatus, is_dark: bool },
}

#[derive(Debug)]
struct MockCamera {
    spec: MockCameraSpec,
    open: bool,
    initialized: bool,
    roi: RoiFormat,
    start: (i32, i32),
    values: HashMap<ControlType, (i64, bool)>,
    exposure: Exposure,
    video: bool,
    video_timeouts_left: u32,
    id: String,
    mode: CameraMode,
    dark_subtract: Option<PathBuf>,
    guiding: Vec<GuideDirection>,
    soft_triggers: Vec<bool>,
    trigger_outputs: HashMap<i32, TriggerOutputConf>,
    frames: u64,
}

impl MockCamera {
    fn new(spec: MockCameraSpec) -> Self {
        let values = spec
            .controls
            .iter()
            .map(|caps| (caps.control_type, (caps.default_value, false)))
            .collect();
        let roi = RoiFormat {
            width: (spec.info.max_width - spec.info.max_width % 8) as i32,
            height: (spec.info.max_height - spec.info.max_height % 2) as i32,
            bins: 1,
            image_type: ImageType::Raw8,
        };
        Self {
            video_timeouts_left: spec.video_timeouts,
            spec,
            open: false,
            initialized: false,
            roi,
            start: (0, 0),
            values,
            exposure: Exposure::Idle,
            video: false,
            id: String::new(),
            mode: CameraMode::Normal,
            dark_subtract: None,
            guiding: Vec::new(),
            soft_triggers: Vec::new(),
            trigger_outputs: HashMap::new(),
            frames: 0,
        }
    }

    fn frame_len(&self) -> usize {
        self.roi.width as usize * self.roi.height as usize * self.roi.image_type.bytes_per_pixel()
    }

    fn fill_frame(&mut self, buffer: &mut [u8], is_dark: bool) {
        self.frames += 1;
        let width = self.roi.width as usize;
        let bpp = self.roi.image_type.bytes_per_pixel();
        let mut rng = StdRng::seed_from_u64(self.frames);
        let offset = self.frames as usize;

        for (i, pixel) in buffer.chunks_exact_mut(bpp).enumerate() {
            let (x, y) = (i % width, i / width);
            let level = if is_dark {
                rng.gen_range(0..16usize)
            } else {
                (x + y + offset) % 256
            };
            match self.roi.image_type {
                ImageType::Raw16 => {
                    pixel.copy_from_slice(&((level as u16) << 8).to_ne_bytes());
                }
                _ => pixel.fill(level as u8),
            }
        }
    }
}

/// Simulated SDK holding any number of cameras.
#[derive(Debug, Default)]
pub struct MockSdk {
    cameras: Mutex<Vec<MockCamera>>,
}

impl MockSdk {
    pub fn new() -> Self {
        Self::default()
    }

    /// One mono camera, the setup used by `--simulate`.
    pub fn with_default_camera() -> Self {
        Self::new().with_camera(MockCameraSpec::mono("ZWO ASI290MM Mini", 1936, 1096))
    }

    pub fn with_camera(self, mut spec: MockCameraSpec) -> Self {
        {
            let mut cameras = self.lock();
            spec.info.camera_id = cameras.len() as i32;
            cameras.push(MockCamera::new(spec));
        }
        self
    }

    pub fn is_open(&self, id: i32) -> bool {
        self.lock()
            .get(id as usize)
            .map(|cam| cam.open)
            .unwrap_or(false)
    }

    pub fn is_video_active(&self, id: i32) -> bool {
        self.lock()
            .get(id as usize)
            .map(|cam| cam.video)
            .unwrap_or(false)
    }

    pub fn dark_subtract_path(&self, id: i32) -> Option<PathBuf> {
        self.lock()
            .get(id as usize)
            .and_then(|cam| cam.dark_subtract.clone())
    }

    pub fn guiding(&self, id: i32) -> Vec<GuideDirection> {
        self.lock()
            .get(id as usize)
            .map(|cam| cam.guiding.clone())
            .unwrap_or_default()
    }

    pub fn soft_triggers(&self, id: i32) -> Vec<bool> {
        self.lock()
            .get(id as usize)
            .map(|cam| cam.soft_triggers.clone())
            .unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<MockCamera>> {
        self.cameras.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `f` against an open camera.
    fn with_open<T>(&self, id: i32, f: impl FnOnce(&mut MockCamera) -> Result<T>) -> Result<T> {
        let mut cameras = self.lock();
        let cam = camera_mut(&mut cameras, id)?;
        if !cam.open {
            return Err(AsiError::Sdk(ErrorCode::CameraClosed));
        }
        f(cam)
    }
}

fn sdk_err<T>(code: ErrorCode) -> Result<T> {
    Err(AsiError::Sdk(code))
}

fn camera_mut(cameras: &mut [MockCamera], id: i32) -> Result<&mut MockCamera> {
    usize::try_from(id)
        .ok()
        .and_then(move |index| cameras.get_mut(index))
        .ok_or(AsiError::Sdk(ErrorCode::InvalidId))
}

impl AsiSdk for MockSdk {
    fn num_connected_cameras(&self) -> i32 {
        self.lock().len() as i32
    }

    fn camera_property(&self, index: i32) -> Result<CameraInfo> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.lock().get(i).map(|cam| cam.spec.info.clone()))
            .ok_or(AsiError::Sdk(ErrorCode::InvalidIndex))
    }

    fn open_camera(&self, id: i32) -> Result<()> {
        let mut cameras = self.lock();
        let cam = camera_mut(&mut cameras, id)?;
        cam.open = true;
        Ok(())
    }

    fn init_camera(&self, id: i32) -> Result<()> {
        self.with_open(id, |cam| {
            if cam.spec.fail_init {
                return sdk_err(ErrorCode::GeneralError);
            }
            cam.initialized = true;
            Ok(())
        })
    }

    fn close_camera(&self, id: i32) -> Result<()> {
        let mut cameras = self.lock();
        let cam = camera_mut(&mut cameras, id)?;
        cam.open = false;
        cam.initialized = false;
        cam.video = false;
        cam.exposure = Exposure::Idle;
        Ok(())
    }

    fn num_controls(&self, id: i32) -> Result<i32> {
        self.with_open(id, |cam| Ok(cam.spec.controls.len() as i32))
    }

    fn control_caps(&self, id: i32, index: i32) -> Result<ControlCaps> {
        self.with_open(id, |cam| {
            usize::try_from(index)
                .ok()
                .and_then(|i| cam.spec.controls.get(i).cloned())
                .ok_or(AsiError::Sdk(ErrorCode::InvalidControlType))
        })
    }

    fn control_value(&self, id: i32, control: ControlType) -> Result<(i64, bool)> {
        self.with_open(id, |cam| {
            cam.values
                .get(&control)
                .copied()
                .ok_or(AsiError::Sdk(ErrorCode::InvalidControlType))
        })
    }

    fn set_control_value(
        &self,
        id: i32,
        control: ControlType,
        value: i64,
        auto: bool,
    ) -> Result<()> {
        self.with_open(id, |cam| {
            let caps = match cam.spec.controls.iter().find(|c| c.control_type == control) {
                Some(caps) => caps.clone(),
                None => return sdk_err(ErrorCode::InvalidControlType),
            };
            if !caps.is_writable {
                return sdk_err(ErrorCode::GeneralError);
            }
            let auto = auto && caps.is_auto_supported;
            let value = value.clamp(caps.min_value, caps.max_value);
            cam.values.insert(control, (value, auto));
            Ok(())
        })
    }

    fn roi_format(&self, id: i32) -> Result<RoiFormat> {
        self.with_open(id, |cam| Ok(cam.roi))
    }

    fn set_roi_format(&self, id: i32, format: &RoiFormat) -> Result<()> {
        self.with_open(id, |cam| {
            if cam.video {
                return sdk_err(ErrorCode::VideoModeActive);
            }
            let info = &cam.spec.info;
            if !info.supports_bins(format.bins) {
                return sdk_err(ErrorCode::InvalidSize);
            }
            if !info.supported_video_format.contains(&format.image_type.raw()) {
                return sdk_err(ErrorCode::InvalidImageType);
            }
            let max_w = (info.max_width / i64::from(format.bins)) as i32;
            let max_h = (info.max_height / i64::from(format.bins)) as i32;
            if format.width < 8
                || format.width % 8 != 0
                || format.width > max_w
                || format.height < 2
                || format.height % 2 != 0
                || format.height > max_h
            {
                return sdk_err(ErrorCode::InvalidSize);
            }
            cam.roi = *format;
            cam.start = ((max_w - format.width) / 2, (max_h - format.height) / 2);
            Ok(())
        })
    }

    fn start_pos(&self, id: i32) -> Result<(i32, i32)> {
        self.with_open(id, |cam| Ok(cam.start))
    }

    fn set_start_pos(&self, id: i32, start_x: i32, start_y: i32) -> Result<()> {
        self.with_open(id, |cam| {
            let bins = i64::from(cam.roi.bins);
            let max_w = (cam.spec.info.max_width / bins) as i32;
            let max_h = (cam.spec.info.max_height / bins) as i32;
            if start_x < 0
                || start_y < 0
                || start_x + cam.roi.width > max_w
                || start_y + cam.roi.height > max_h
            {
                return sdk_err(ErrorCode::OutOfBoundary);
            }
            cam.start = (start_x, start_y);
            Ok(())
        })
    }

    fn dropped_frames(&self, id: i32) -> Result<i32> {
        self.with_open(id, |_| Ok(0))
    }

    fn enable_dark_subtract(&self, id: i32, path: &Path) -> Result<()> {
        self.with_open(id, |cam| {
            if !path.is_file() {
                return sdk_err(ErrorCode::InvalidPath);
            }
            cam.dark_subtract = Some(path.to_path_buf());
            Ok(())
        })
    }

    fn disable_dark_subtract(&self, id: i32) -> Result<()> {
        self.with_open(id, |cam| {
            cam.dark_subtract = None;
            Ok(())
        })
    }

    fn start_video_capture(&self, id: i32) -> Result<()> {
        self.with_open(id, |cam| {
            if matches!(cam.exposure, Exposure::Working { .. }) {
                return sdk_err(ErrorCode::ExposureInProgress);
            }
            cam.video = true;
            Ok(())
        })
    }

    fn stop_video_capture(&self, id: i32) -> Result<()> {
        self.with_open(id, |cam| {
            cam.video = false;
            Ok(())
        })
    }

    fn video_data(&self, id: i32, buffer: &mut [u8], _timeout_ms: i32) -> Result<()> {
        self.with_open(id, |cam| {
            if !cam.video {
                return sdk_err(ErrorCode::InvalidSequence);
            }
            if buffer.len() < cam.frame_len() {
                return sdk_err(ErrorCode::BufferTooSmall);
            }
            if cam.video_timeouts_left > 0 {
                cam.video_timeouts_left -= 1;
                return sdk_err(ErrorCode::Timeout);
            }
            let len = cam.frame_len();
            cam.fill_frame(&mut buffer[..len], false);
            Ok(())
        })
    }

    fn pulse_guide_on(&self, id: i32, direction: GuideDirection) -> Result<()> {
        self.with_open(id, |cam| {
            if !cam.spec.info.st4_port {
                return sdk_err(ErrorCode::GeneralError);
            }
            if !cam.guiding.contains(&direction) {
                cam.guiding.push(direction);
            }
            Ok(())
        })
    }

    fn pulse_guide_off(&self, id: i32, direction: GuideDirection) -> Result<()> {
        self.with_open(id, |cam| {
            cam.guiding.retain(|d| *d != direction);
            Ok(())
        })
    }

    fn start_exposure(&self, id: i32, is_dark: bool) -> Result<()> {
        self.with_open(id, |cam| {
            if cam.video {
                return sdk_err(ErrorCode::VideoModeActive);
            }
            if matches!(cam.exposure, Exposure::Working { .. }) {
                return sdk_err(ErrorCode::ExposureInProgress);
            }
            cam.exposure = Exposure::Working {
                polls_left: cam.spec.exposure_polls,
                is_dark,
            };
            Ok(())
        })
    }

    fn stop_exposure(&self, id: i32) -> Result<()> {
        self.with_open(id, |cam| {
            if let Exposure::Working { .. } = cam.exposure {
                cam.exposure = Exposure::Done {
                    status: ExposureStatus::Failed,
                    is_dark: false,
                };
            }
            Ok(())
        })
    }

    fn exposure_status(&self, id: i32) -> Result<ExposureStatus> {
        self.with_open(id, |cam| {
            let fail = cam.spec.fail_exposures;
            match cam.exposure {
                Exposure::Idle => Ok(ExposureStatus::Idle),
                Exposure::Done { status, .. } => Ok(status),
                Exposure::Working { polls_left, is_dark } => {
                    if polls_left > 0 {
                        cam.exposure = Exposure::Working {
                            polls_left: polls_left - 1,
                            is_dark,
                        };
                        Ok(ExposureStatus::Working)
                    } else {
                        let status = if fail {
                            ExposureStatus::Failed
                        } else {
                            ExposureStatus::Success
                        };
                        cam.exposure = Exposure::Done { status, is_dark };
                        Ok(status)
                    }
                }
            }
        })
    }

    fn data_after_exposure(&self, id: i32, buffer: &mut [u8]) -> Result<()> {
        self.with_open(id, |cam| {
            let is_dark = match cam.exposure {
                Exposure::Done {
                    status: ExposureStatus::Success,
                    is_dark,
                } => is_dark,
                _ => return sdk_err(ErrorCode::GeneralError),
            };
            if buffer.len() < cam.frame_len() {
                return sdk_err(ErrorCode::BufferTooSmall);
            }
            let len = cam.frame_len();
            cam.fill_frame(&mut buffer[..len], is_dark);
            cam.exposure = Exposure::Idle;
            Ok(())
        })
    }

    fn id(&self, id: i32) -> Result<String> {
        self.with_open(id, |cam| Ok(cam.id.clone()))
    }

    fn set_id(&self, id: i32, new_id: &str) -> Result<()> {
        self.with_open(id, |cam| {
            if new_id.len() > 8 {
                return sdk_err(ErrorCode::InvalidId);
            }
            cam.id = new_id.to_string();
            Ok(())
        })
    }

    fn gain_offset(&self, id: i32) -> Result<GainOffset> {
        self.with_open(id, |_| {
            Ok(GainOffset {
                offset_highest_dr: 10,
                offset_unity_gain: 30,
                gain_lowest_rn: 60,
                offset_lowest_rn: 50,
            })
        })
    }

    fn serial_number(&self, id: i32) -> Result<String> {
        self.with_open(id, |cam| {
            Ok(serial_to_hex(&ASI_ID {
                id: cam.spec.serial,
            }))
        })
    }

    fn camera_support_mode(&self, id: i32) -> Result<Vec<CameraMode>> {
        self.with_open(id, |cam| {
            if !cam.spec.info.is_trigger_cam {
                return sdk_err(ErrorCode::InvalidMode);
            }
            Ok(cam.spec.supported_modes.clone())
        })
    }

    fn camera_mode(&self, id: i32) -> Result<CameraMode> {
        self.with_open(id, |cam| Ok(cam.mode))
    }

    fn set_camera_mode(&self, id: i32, mode: CameraMode) -> Result<()> {
        self.with_open(id, |cam| {
            if !cam.spec.supported_modes.contains(&mode) {
                return sdk_err(ErrorCode::InvalidMode);
            }
            cam.mode = mode;
            Ok(())
        })
    }

    fn send_soft_trigger(&self, id: i32, start: bool) -> Result<()> {
        self.with_open(id, |cam| {
            if !cam.spec.info.is_trigger_cam {
                return sdk_err(ErrorCode::InvalidMode);
            }
            cam.soft_triggers.push(start);
            Ok(())
        })
    }

    fn trigger_output_io_conf(&self, id: i32, pin: TrigOutputPin) -> Result<TriggerOutputConf> {
        self.with_open(id, |cam| {
            if !cam.spec.info.is_trigger_cam {
                return sdk_err(ErrorCode::InvalidMode);
            }
            Ok(cam
                .trigger_outputs
                .get(&pin.raw())
                .copied()
                .unwrap_or(TriggerOutputConf {
                    pin_high: false,
                    delay: 0,
                    duration: 0,
                }))
        })
    }

    fn set_trigger_output_io_conf(
        &self,
        id: i32,
        pin: TrigOutputPin,
        conf: &TriggerOutputConf,
    ) -> Result<()> {
        self.with_open(id, |cam| {
            if !cam.spec.info.is_trigger_cam {
                return sdk_err(ErrorCode::InvalidMode);
            }
            cam.trigger_outputs.insert(pin.raw(), *conf);
            Ok(())
        })
    }
}
