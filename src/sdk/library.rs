use std::ffi::CString;
use std::os::raw::{c_int, c_long};
use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};
use log::{debug, info};

use super::ffi;
use super::locate::LibrarySource;
use super::AsiSdk;
use crate::error::{check, AsiError, Result};
use crate::types::{
    CameraInfo, CameraMode, ControlCaps, ControlType, ExposureStatus, GainOffset, GuideDirection,
    ImageType, RoiFormat, TrigOutputPin, TriggerOutputConf,
};

/// Call an SDK function pointer and check its status code.
macro_rules! asi_call {
    ($func:expr $(, $arg:expr)*) => {
        check(unsafe { ($func)($($arg),*) })
    };
}

macro_rules! sdk_functions {
    ($($field:ident: $symbol:ident),* $(,)?) => {
        struct Api {
            $($field: ffi::$symbol,)*
        }

        impl Api {
            /// # Safety
            /// `lib` must be the ASI SDK so the symbols have the declared signatures.
            unsafe fn resolve(lib: &Library) -> Result<Self> {
                Ok(Self {
                    $($field: {
                        let symbol: Symbol<ffi::$symbol> = lib
                            .get(concat!(stringify!($symbol), "\0").as_bytes())
                            .map_err(|source| AsiError::Symbol {
                                name: stringify!($symbol),
                                source,
                            })?;
                        *symbol
                    },)*
                })
            }
        }
    };
}

sdk_functions! {
    num_connected_cameras: ASIGetNumOfConnectedCameras,
    camera_property: ASIGetCameraProperty,
    open_camera: ASIOpenCamera,
    init_camera: ASIInitCamera,
    close_camera: ASICloseCamera,
    num_controls: ASIGetNumOfControls,
    control_caps: ASIGetControlCaps,
    control_value: ASIGetControlValue,
    set_control_value: ASISetControlValue,
    roi_format: ASIGetROIFormat,
    set_roi_format: ASISetROIFormat,
    start_pos: ASIGetStartPos,
    set_start_pos: ASISetStartPos,
    dropped_frames: ASIGetDroppedFrames,
    enable_dark_subtract: ASIEnableDarkSubtract,
    disable_dark_subtract: ASIDisableDarkSubtract,
    start_video_capture: ASIStartVideoCapture,
    stop_video_capture: ASIStopVideoCapture,
    video_data: ASIGetVideoData,
    pulse_guide_on: ASIPulseGuideOn,
    pulse_guide_off: ASIPulseGuideOff,
    start_exposure: ASIStartExposure,
    stop_exposure: ASIStopExposure,
    exposure_status: ASIGetExpStatus,
    data_after_exposure: ASIGetDataAfterExp,
    get_id: ASIGetID,
    set_id: ASISetID,
    gain_offset: ASIGetGainOffset,
    serial_number: ASIGetSerialNumber,
    camera_support_mode: ASIGetCameraSupportMode,
    camera_mode: ASIGetCameraMode,
    set_camera_mode: ASISetCameraMode,
    send_soft_trigger: ASISendSoftTrigger,
    trigger_output_io_conf: ASIGetTriggerOutputIOConf,
    set_trigger_output_io_conf: ASISetTriggerOutputIOConf,
}

/// The vendor `ASICamera2` library, loaded at run time.
pub struct AsiLibrary {
    api: Api,
    path: PathBuf,
    // Function pointers in `api` are only valid while this is loaded.
    _library: Library,
}

impl std::fmt::Debug for AsiLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsiLibrary").field("path", &self.path).finish()
    }
}

impl AsiLibrary {
    /// Load one specific file, keeping the loader error.
    pub fn load(path: &Path) -> Result<Self> {
        let library = open_library(path).map_err(|source| AsiError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded ASI SDK from {}", path.display());
        Self::from_library(library, path.to_path_buf())
    }

    /// Try each source in order and keep the first that loads.
    ///
    /// When none loads, `LibraryNotFound` lists every source with its loader error.
    pub fn load_from(sources: &[LibrarySource]) -> Result<Self> {
        let mut tried = Vec::new();

        for source in sources {
            let target: PathBuf = match source {
                LibrarySource::Path(path) => path.clone(),
                LibrarySource::System(name) => PathBuf::from(name),
            };

            match open_library(&target) {
                Ok(library) => {
                    info!("Loaded ASI SDK from {}", source);
                    return Self::from_library(library, target);
                }
                Err(err) => {
                    debug!("Could not load {}: {}", source, err);
                    tried.push(format!("{}: {}", source, err));
                }
            }
        }

        Err(AsiError::LibraryNotFound { tried })
    }

    fn from_library(library: Library, path: PathBuf) -> Result<Self> {
        let api = unsafe { Api::resolve(&library)? };
        Ok(Self {
            api,
            path,
            _library: library,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn open_library(target: &Path) -> std::result::Result<Library, libloading::Error> {
    // SAFETY: loading runs the library's initialisers; the ASI SDK has no
    // requirements beyond being loaded once.
    unsafe { Library::new(target) }
}

fn to_c_long(value: i64) -> Result<c_long> {
    c_long::try_from(value)
        .map_err(|_| AsiError::invalid_argument(format!("value {} out of range", value)))
}

fn buffer_len(buffer: &[u8]) -> Result<c_long> {
    c_long::try_from(buffer.len())
        .map_err(|_| AsiError::invalid_argument("frame buffer too large"))
}

impl AsiSdk for AsiLibrary {
    fn num_connected_cameras(&self) -> i32 {
        unsafe { (self.api.num_connected_cameras)() }
    }

    fn camera_property(&self, index: i32) -> Result<CameraInfo> {
        let mut raw = ffi::ASI_CAMERA_INFO::zeroed();
        asi_call!(self.api.camera_property, &mut raw, index)?;
        Ok(CameraInfo::from(&raw))
    }

    fn open_camera(&self, id: i32) -> Result<()> {
        asi_call!(self.api.open_camera, id)
    }

    fn init_camera(&self, id: i32) -> Result<()> {
        asi_call!(self.api.init_camera, id)
    }

    fn close_camera(&self, id: i32) -> Result<()> {
        asi_call!(self.api.close_camera, id)
    }

    fn num_controls(&self, id: i32) -> Result<i32> {
        let mut num: c_int = 0;
        asi_call!(self.api.num_controls, id, &mut num)?;
        Ok(num)
    }

    fn control_caps(&self, id: i32, index: i32) -> Result<ControlCaps> {
        let mut raw = ffi::ASI_CONTROL_CAPS::zeroed();
        asi_call!(self.api.control_caps, id, index, &mut raw)?;
        Ok(ControlCaps::from(&raw))
    }

    fn control_value(&self, id: i32, control: ControlType) -> Result<(i64, bool)> {
        let mut value: c_long = 0;
        let mut auto: c_int = 0;
        asi_call!(self.api.control_value, id, control.0, &mut value, &mut auto)?;
        Ok((i64::from(value), auto != 0))
    }

    fn set_control_value(
        &self,
        id: i32,
        control: ControlType,
        value: i64,
        auto: bool,
    ) -> Result<()> {
        asi_call!(
            self.api.set_control_value,
            id,
            control.0,
            to_c_long(value)?,
            c_int::from(auto)
        )
    }

    fn roi_format(&self, id: i32) -> Result<RoiFormat> {
        let (mut width, mut height, mut bins, mut image_type): (c_int, c_int, c_int, c_int) =
            (0, 0, 0, 0);
        asi_call!(
            self.api.roi_format,
            id,
            &mut width,
            &mut height,
            &mut bins,
            &mut image_type
        )?;
        Ok(RoiFormat {
            width,
            height,
            bins,
            image_type: ImageType::from_raw(image_type)?,
        })
    }

    fn set_roi_format(&self, id: i32, format: &RoiFormat) -> Result<()> {
        asi_call!(
            self.api.set_roi_format,
            id,
            format.width,
            format.height,
            format.bins,
            format.image_type.raw()
        )
    }

    fn start_pos(&self, id: i32) -> Result<(i32, i32)> {
        let (mut x, mut y): (c_int, c_int) = (0, 0);
        asi_call!(self.api.start_pos, id, &mut x, &mut y)?;
        Ok((x, y))
    }

    fn set_start_pos(&self, id: i32, start_x: i32, start_y: i32) -> Result<()> {
        asi_call!(self.api.set_start_pos, id, start_x, start_y)
    }

    fn dropped_frames(&self, id: i32) -> Result<i32> {
        let mut dropped: c_int = 0;
        asi_call!(self.api.dropped_frames, id, &mut dropped)?;
        Ok(dropped)
    }

    fn enable_dark_subtract(&self, id: i32, path: &Path) -> Result<()> {
        let path = CString::new(path.to_string_lossy().into_owned())
            .map_err(|_| AsiError::invalid_argument("dark frame path contains NUL"))?;
        let raw = path.into_raw();
        let result = asi_call!(self.api.enable_dark_subtract, id, raw);
        // SAFETY: `raw` came from `into_raw` above and the SDK does not keep it.
        drop(unsafe { CString::from_raw(raw) });
        result
    }

    fn disable_dark_subtract(&self, id: i32) -> Result<()> {
        asi_call!(self.api.disable_dark_subtract, id)
    }

    fn start_video_capture(&self, id: i32) -> Result<()> {
        asi_call!(self.api.start_video_capture, id)
    }

    fn stop_video_capture(&self, id: i32) -> Result<()> {
        asi_call!(self.api.stop_video_capture, id)
    }

    fn video_data(&self, id: i32, buffer: &mut [u8], timeout_ms: i32) -> Result<()> {
        let len = buffer_len(buffer)?;
        asi_call!(self.api.video_data, id, buffer.as_mut_ptr(), len, timeout_ms)
    }

    fn pulse_guide_on(&self, id: i32, direction: GuideDirection) -> Result<()> {
        asi_call!(self.api.pulse_guide_on, id, direction.raw())
    }

    fn pulse_guide_off(&self, id: i32, direction: GuideDirection) -> Result<()> {
        asi_call!(self.api.pulse_guide_off, id, direction.raw())
    }

    fn start_exposure(&self, id: i32, is_dark: bool) -> Result<()> {
        asi_call!(self.api.start_exposure, id, c_int::from(is_dark))
    }

    fn stop_exposure(&self, id: i32) -> Result<()> {
        asi_call!(self.api.stop_exposure, id)
    }

    fn exposure_status(&self, id: i32) -> Result<ExposureStatus> {
        let mut status: c_int = 0;
        asi_call!(self.api.exposure_status, id, &mut status)?;
        Ok(ExposureStatus::from_raw(status))
    }

    fn data_after_exposure(&self, id: i32, buffer: &mut [u8]) -> Result<()> {
        let len = buffer_len(buffer)?;
        asi_call!(self.api.data_after_exposure, id, buffer.as_mut_ptr(), len)
    }

    fn id(&self, id: i32) -> Result<String> {
        let mut raw = ffi::ASI_ID::default();
        asi_call!(self.api.get_id, id, &mut raw)?;
        Ok(ffi::id_to_string(&raw))
    }

    fn set_id(&self, id: i32, new_id: &str) -> Result<()> {
        let bytes = new_id.as_bytes();
        if bytes.len() > 8 {
            return Err(AsiError::invalid_argument("camera ID is limited to 8 bytes"));
        }
        let mut raw = ffi::ASI_ID::default();
        raw.id[..bytes.len()].copy_from_slice(bytes);
        asi_call!(self.api.set_id, id, raw)
    }

    fn gain_offset(&self, id: i32) -> Result<GainOffset> {
        let (mut highest_dr, mut unity_gain, mut gain_lowest_rn, mut offset_lowest_rn): (
            c_int,
            c_int,
            c_int,
            c_int,
        ) = (0, 0, 0, 0);
        asi_call!(
            self.api.gain_offset,
            id,
            &mut highest_dr,
            &mut unity_gain,
            &mut gain_lowest_rn,
            &mut offset_lowest_rn
        )?;
        Ok(GainOffset {
            offset_highest_dr: highest_dr,
            offset_unity_gain: unity_gain,
            gain_lowest_rn,
            offset_lowest_rn,
        })
    }

    fn serial_number(&self, id: i32) -> Result<String> {
        let mut raw = ffi::ASI_ID::default();
        asi_call!(self.api.serial_number, id, &mut raw)?;
        Ok(ffi::serial_to_hex(&raw))
    }

    fn camera_support_mode(&self, id: i32) -> Result<Vec<CameraMode>> {
        let mut raw = ffi::ASI_SUPPORTED_MODE::zeroed();
        asi_call!(self.api.camera_support_mode, id, &mut raw)?;
        Ok(raw
            .SupportedCameraMode
            .iter()
            .take_while(|mode| **mode != CameraMode::END)
            .filter_map(|mode| CameraMode::from_raw(*mode))
            .collect())
    }

    fn camera_mode(&self, id: i32) -> Result<CameraMode> {
        let mut mode: c_int = 0;
        asi_call!(self.api.camera_mode, id, &mut mode)?;
        CameraMode::from_raw(mode).ok_or_else(|| {
            AsiError::invalid_argument(format!("SDK reported unknown camera mode {}", mode))
        })
    }

    fn set_camera_mode(&self, id: i32, mode: CameraMode) -> Result<()> {
        asi_call!(self.api.set_camera_mode, id, mode.raw())
    }

    fn send_soft_trigger(&self, id: i32, start: bool) -> Result<()> {
        asi_call!(self.api.send_soft_trigger, id, c_int::from(start))
    }

    fn trigger_output_io_conf(&self, id: i32, pin: TrigOutputPin) -> Result<TriggerOutputConf> {
        let mut pin_high: c_int = 0;
        let (mut delay, mut duration): (c_long, c_long) = (0, 0);
        asi_call!(
            self.api.trigger_output_io_conf,
            id,
            pin.raw(),
            &mut pin_high,
            &mut delay,
            &mut duration
        )?;
        Ok(TriggerOutputConf {
            pin_high: pin_high != 0,
            delay: i64::from(delay),
            duration: i64::from(duration),
        })
    }

    fn set_trigger_output_io_conf(
        &self,
        id: i32,
        pin: TrigOutputPin,
        conf: &TriggerOutputConf,
    ) -> Result<()> {
        asi_call!(
            self.api.set_trigger_output_io_conf,
            id,
            pin.raw(),
            c_int::from(conf.pin_high),
            to_c_long(conf.delay)?,
            to_c_long(conf.duration)?
        )
    }
}
