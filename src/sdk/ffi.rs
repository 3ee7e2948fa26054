//! Raw declarations matching the `ASICamera2` C ABI.

#![allow(non_snake_case, non_camel_case_types)]

use std::os::raw::{c_char, c_double, c_float, c_int, c_long, c_uchar};

use crate::types::{CameraInfo, ControlCaps, ControlType, ImageType};

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ASI_CAMERA_INFO {
    pub Name: [c_char; 64],
    pub CameraID: c_int,
    pub MaxHeight: c_long,
    pub MaxWidth: c_long,
    pub IsColorCam: c_int,
    pub BayerPattern: c_int,
    pub SupportedBins: [c_int; 16],
    pub SupportedVideoFormat: [c_int; 8],
    pub PixelSize: c_double,
    pub MechanicalShutter: c_int,
    pub ST4Port: c_int,
    pub IsCoolerCam: c_int,
    pub IsUSB3Host: c_int,
    pub IsUSB3Camera: c_int,
    pub ElecPerADU: c_float,
    pub BitDepth: c_int,
    pub IsTriggerCam: c_int,
    pub Unused: [c_char; 16],
}

impl ASI_CAMERA_INFO {
    pub fn zeroed() -> Self {
        Self {
            Name: [0; 64],
            CameraID: 0,
            MaxHeight: 0,
            MaxWidth: 0,
            IsColorCam: 0,
            BayerPattern: 0,
            SupportedBins: [0; 16],
            SupportedVideoFormat: [0; 8],
            PixelSize: 0.0,
            MechanicalShutter: 0,
            ST4Port: 0,
            IsCoolerCam: 0,
            IsUSB3Host: 0,
            IsUSB3Camera: 0,
            ElecPerADU: 0.0,
            BitDepth: 0,
            IsTriggerCam: 0,
            Unused: [0; 16],
        }
    }
}

impl From<&ASI_CAMERA_INFO> for CameraInfo {
    fn from(raw: &ASI_CAMERA_INFO) -> Self {
        CameraInfo {
            name: c_chars_to_string(&raw.Name),
            camera_id: raw.CameraID,
            max_height: i64::from(raw.MaxHeight),
            max_width: i64::from(raw.MaxWidth),
            is_color_cam: raw.IsColorCam != 0,
            bayer_pattern: raw.BayerPattern,
            supported_bins: raw
                .SupportedBins
                .iter()
                .take_while(|bins| **bins != 0)
                .copied()
                .collect(),
            supported_video_format: raw
                .SupportedVideoFormat
                .iter()
                .take_while(|format| **format != ImageType::END)
                .copied()
                .collect(),
            pixel_size: raw.PixelSize,
            mechanical_shutter: raw.MechanicalShutter != 0,
            st4_port: raw.ST4Port != 0,
            is_cooler_cam: raw.IsCoolerCam != 0,
            is_usb3_host: raw.IsUSB3Host != 0,
            is_usb3_camera: raw.IsUSB3Camera != 0,
            elec_per_adu: raw.ElecPerADU,
            bit_depth: raw.BitDepth,
            is_trigger_cam: raw.IsTriggerCam != 0,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ASI_CONTROL_CAPS {
    pub Name: [c_char; 64],
    pub Description: [c_char; 128],
    pub MaxValue: c_long,
    pub MinValue: c_long,
    pub DefaultValue: c_long,
    pub IsAutoSupported: c_int,
    pub IsWritable: c_int,
    pub ControlType: c_int,
    pub Unused: [c_char; 32],
}

impl ASI_CONTROL_CAPS {
    pub fn zeroed() -> Self {
        Self {
            Name: [0; 64],
            Description: [0; 128],
            MaxValue: 0,
            MinValue: 0,
            DefaultValue: 0,
            IsAutoSupported: 0,
            IsWritable: 0,
            ControlType: 0,
            Unused: [0; 32],
        }
    }
}

impl From<&ASI_CONTROL_CAPS> for ControlCaps {
    fn from(raw: &ASI_CONTROL_CAPS) -> Self {
        ControlCaps {
            name: c_chars_to_string(&raw.Name),
            description: c_chars_to_string(&raw.Description),
            max_value: i64::from(raw.MaxValue),
            min_value: i64::from(raw.MinValue),
            default_value: i64::from(raw.DefaultValue),
            is_auto_supported: raw.IsAutoSupported != 0,
            is_writable: raw.IsWritable != 0,
            control_type: ControlType(raw.ControlType),
        }
    }
}

/// Also used as `ASI_SN`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct ASI_ID {
    pub id: [c_uchar; 8],
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ASI_SUPPORTED_MODE {
    pub SupportedCameraMode: [c_int; 16],
}

impl ASI_SUPPORTED_MODE {
    pub fn zeroed() -> Self {
        Self {
            SupportedCameraMode: [0; 16],
        }
    }
}

pub type ASIGetNumOfConnectedCameras = unsafe extern "C" fn() -> c_int;
pub type ASIGetCameraProperty = unsafe extern "C" fn(*mut ASI_CAMERA_INFO, c_int) -> c_int;
pub type ASIOpenCamera = unsafe extern "C" fn(c_int) -> c_int;
pub type ASIInitCamera = unsafe extern "C" fn(c_int) -> c_int;
pub type ASICloseCamera = unsafe extern "C" fn(c_int) -> c_int;
pub type ASIGetNumOfControls = unsafe extern "C" fn(c_int, *mut c_int) -> c_int;
pub type ASIGetControlCaps = unsafe extern "C" fn(c_int, c_int, *mut ASI_CONTROL_CAPS) -> c_int;
pub type ASIGetControlValue = unsafe extern "C" fn(c_int, c_int, *mut c_long, *mut c_int) -> c_int;
pub type ASISetControlValue = unsafe extern "C" fn(c_int, c_int, c_long, c_int) -> c_int;
pub type ASIGetROIFormat =
    unsafe extern "C" fn(c_int, *mut c_int, *mut c_int, *mut c_int, *mut c_int) -> c_int;
pub type ASISetROIFormat = unsafe extern "C" fn(c_int, c_int, c_int, c_int, c_int) -> c_int;
pub type ASIGetStartPos = unsafe extern "C" fn(c_int, *mut c_int, *mut c_int) -> c_int;
pub type ASISetStartPos = unsafe extern "C" fn(c_int, c_int, c_int) -> c_int;
pub type ASIGetDroppedFrames = unsafe extern "C" fn(c_int, *mut c_int) -> c_int;
pub type ASIEnableDarkSubtract = unsafe extern "C" fn(c_int, *mut c_char) -> c_int;
pub type ASIDisableDarkSubtract = unsafe extern "C" fn(c_int) -> c_int;
pub type ASIStartVideoCapture = unsafe extern "C" fn(c_int) -> c_int;
pub type ASIStopVideoCapture = unsafe extern "C" fn(c_int) -> c_int;
pub type ASIGetVideoData = unsafe extern "C" fn(c_int, *mut c_uchar, c_long, c_int) -> c_int;
pub type ASIPulseGuideOn = unsafe extern "C" fn(c_int, c_int) -> c_int;
pub type ASIPulseGuideOff = unsafe extern "C" fn(c_int, c_int) -> c_int;
pub type ASIStartExposure = unsafe extern "C" fn(c_int, c_int) -> c_int;
pub type ASIStopExposure = unsafe extern "C" fn(c_int) -> c_int;
pub type ASIGetExpStatus = unsafe extern "C" fn(c_int, *mut c_int) -> c_int;
pub type ASIGetDataAfterExp = unsafe extern "C" fn(c_int, *mut c_uchar, c_long) -> c_int;
pub type ASIGetID = unsafe extern "C" fn(c_int, *mut ASI_ID) -> c_int;
pub type ASISetID = unsafe extern "C" fn(c_int, ASI_ID) -> c_int;
pub type ASIGetGainOffset =
    unsafe extern "C" fn(c_int, *mut c_int, *mut c_int, *mut c_int, *mut c_int) -> c_int;
pub type ASIGetSerialNumber = unsafe extern "C" fn(c_int, *mut ASI_ID) -> c_int;
pub type ASIGetCameraSupportMode = unsafe extern "C" fn(c_int, *mut ASI_SUPPORTED_MODE) -> c_int;
pub type ASIGetCameraMode = unsafe extern "C" fn(c_int, *mut c_int) -> c_int;
pub type ASISetCameraMode = unsafe extern "C" fn(c_int, c_int) -> c_int;
pub type ASISendSoftTrigger = unsafe extern "C" fn(c_int, c_int) -> c_int;
pub type ASIGetTriggerOutputIOConf =
    unsafe extern "C" fn(c_int, c_int, *mut c_int, *mut c_long, *mut c_long) -> c_int;
pub type ASISetTriggerOutputIOConf = unsafe extern "C" fn(c_int, c_int, c_int, c_long, c_long) -> c_int;

/// Decode a fixed-size C string up to the first NUL.
pub fn c_chars_to_string(chars: &[c_char]) -> String {
    let bytes: Vec<u8> = chars
        .iter()
        .take_while(|c| **c != 0)
        .map(|c| *c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Serial numbers are rendered as 16 hex digits, most significant byte first.
pub fn serial_to_hex(sn: &ASI_ID) -> String {
    sn.id.iter().map(|b| format!("{:02x}", b)).collect()
}

/// ID strings are the bytes up to the first NUL.
pub fn id_to_string(id: &ASI_ID) -> String {
    let bytes: Vec<u8> = id.id.iter().take_while(|b| **b != 0).copied().collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_name<const N: usize>(dst: &mut [c_char; N], name: &str) {
        for (slot, byte) in dst.iter_mut().zip(name.bytes()) {
            *slot = byte as c_char;
        }
    }

    #[test]
    fn test_camera_info_conversion_stops_at_terminators() {
        let mut raw = ASI_CAMERA_INFO::zeroed();
        fill_name(&mut raw.Name, "ZWO ASI120MM");
        raw.MaxWidth = 1280;
        raw.MaxHeight = 960;
        raw.IsColorCam = 0;
        raw.SupportedBins[..2].copy_from_slice(&[1, 2]);
        raw.SupportedVideoFormat = [0, 3, 2, -1, 1, 1, 1, 1];
        raw.IsUSB3Camera = 1;
        raw.BitDepth = 12;

        let info = CameraInfo::from(&raw);
        assert_eq!(info.name, "ZWO ASI120MM");
        assert_eq!(info.max_width, 1280);
        assert_eq!(info.supported_bins, vec![1, 2]);
        assert_eq!(info.supported_video_format, vec![0, 3, 2]);
        assert!(!info.is_color_cam);
        assert!(info.is_usb3_camera);
        assert_eq!(info.bit_depth, 12);
    }

    #[test]
    fn test_control_caps_conversion() {
        let mut raw = ASI_CONTROL_CAPS::zeroed();
        fill_name(&mut raw.Name, "Exposure");
        fill_name(&mut raw.Description, "Exposure Time(us)");
        raw.MaxValue = 2_000_000_000;
        raw.MinValue = 32;
        raw.DefaultValue = 10_000;
        raw.IsAutoSupported = 1;
        raw.IsWritable = 1;
        raw.ControlType = 1;

        let caps = ControlCaps::from(&raw);
        assert_eq!(caps.name, "Exposure");
        assert_eq!(caps.description, "Exposure Time(us)");
        assert_eq!(caps.control_type, ControlType::EXPOSURE);
        assert!(caps.is_auto_supported);
        assert_eq!(caps.default_value, 10_000);
    }

    #[test]
    fn test_serial_is_big_endian_hex() {
        let sn = ASI_ID {
            id: [0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef],
        };
        assert_eq!(serial_to_hex(&sn), "0123456789abcdef");
    }

    #[test]
    fn test_id_stops_at_nul() {
        let id = ASI_ID {
            id: [b'g', b'u', b'i', b'd', b'e', 0, b'x', 0],
        };
        assert_eq!(id_to_string(&id), "guide");
    }
}
