use serde::{Deserialize, Serialize};

use crate::error::{AsiError, Result};
use crate::types::{CameraInfo, ImageType, RoiFormat};

/// Models that need `width * height` to be a multiple of 1024.
const KILOPIXEL_MODELS: [&str; 2] = ["ZWO ASI120MM", "ZWO ASI120MC"];

/// Sensor size after binning.
pub fn binned_size(info: &CameraInfo, bins: i32) -> (i32, i32) {
    let bins = i64::from(bins.max(1));
    ((info.max_width / bins) as i32, (info.max_height / bins) as i32)
}

/// Check a format against the SDK's ROI rules before sending it.
pub fn validate_roi_format(info: &CameraInfo, format: &RoiFormat) -> Result<()> {
    if format.bins < 1 {
        return Err(AsiError::invalid_argument("bins must be at least 1"));
    }
    let (max_w, max_h) = binned_size(info, format.bins);

    if format.width < 8 {
        return Err(AsiError::invalid_argument("ROI width too small"));
    } else if format.width > max_w {
        return Err(AsiError::invalid_argument(
            "ROI width larger than binned sensor width",
        ));
    } else if format.width % 8 != 0 {
        return Err(AsiError::invalid_argument("ROI width must be multiple of 8"));
    }

    if format.height < 2 {
        return Err(AsiError::invalid_argument("ROI height too small"));
    } else if format.height > max_h {
        return Err(AsiError::invalid_argument(
            "ROI height larger than binned sensor height",
        ));
    } else if format.height % 2 != 0 {
        return Err(AsiError::invalid_argument("ROI height must be multiple of 2"));
    }

    if KILOPIXEL_MODELS.contains(&info.name.as_str())
        && (i64::from(format.width) * i64::from(format.height)) % 1024 != 0
    {
        return Err(AsiError::invalid_argument(format!(
            "ROI width * height must be multiple of 1024 for {}",
            info.name
        )));
    }
    Ok(())
}

/// Partial ROI; unset fields are filled in by [`resolve_roi`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoiRequest {
    pub start_x: Option<i32>,
    pub start_y: Option<i32>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub bins: Option<i32>,
    pub image_type: Option<ImageType>,
}

impl RoiRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, width: i32, height: i32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_start(mut self, start_x: i32, start_y: i32) -> Self {
        self.start_x = Some(start_x);
        self.start_y = Some(start_y);
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
}

/// Fill in a [`RoiRequest`] from the sensor and the current format.
///
/// Returns the format to set and the start position to set after it.
pub fn resolve_roi(
    info: &CameraInfo,
    current: &RoiFormat,
    request: &RoiRequest,
) -> Result<(RoiFormat, (i32, i32))> {
    let bins = match request.bins {
        None => current.bins,
        Some(bins) if info.supports_bins(bins) => bins,
        Some(bins) => {
            return Err(AsiError::invalid_argument(format!(
                "Illegal value for bins: {}",
                bins
            )))
        }
    };
    let image_type = request.image_type.unwrap_or(current.image_type);
    let (max_w, max_h) = binned_size(info, bins);

    let width = request.width.unwrap_or(max_w - max_w % 8);
    let height = request.height.unwrap_or(max_h - max_h % 2);
    if width <= 0 || height <= 0 {
        return Err(AsiError::invalid_argument(format!(
            "ROI size must be positive: {}x{}",
            width, height
        )));
    }

    let start_x = request.start_x.unwrap_or((max_w - width) / 2);
    let start_y = request.start_y.unwrap_or((max_h - height) / 2);
    if start_x < 0 || start_y < 0 {
        return Err(AsiError::invalid_argument(format!(
            "ROI start position must not be negative: ({}, {})",
            start_x, start_y
        )));
    }
    if i64::from(start_x) + i64::from(width) > i64::from(max_w) {
        return Err(AsiError::invalid_argument(
            "ROI and start position larger than binned sensor width",
        ));
    }
    if i64::from(start_y) + i64::from(height) > i64::from(max_h) {
        return Err(AsiError::invalid_argument(
            "ROI and start position larger than binned sensor height",
        ));
    }

    Ok((
        RoiFormat {
            width,
            height,
            bins,
            image_type,
        },
        (start_x, start_y),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::mock::MockCameraSpec;

    fn info(name: &str, width: i64, height: i64) -> CameraInfo {
        MockCameraSpec::mono(name, width, height).info
    }

    fn fmt(width: i32, height: i32, bins: i32) -> RoiFormat {
        RoiFormat {
            width,
            height,
            bins,
            image_type: ImageType::Raw8,
        }
    }

    #[test]
    fn test_validate_size_rules() {
        let cam = info("ZWO ASI178MM", 3096, 2080);
        assert!(validate_roi_format(&cam, &fmt(3096, 2080, 1)).is_ok());
        assert!(validate_roi_format(&cam, &fmt(1544, 1040, 2)).is_ok());

        for bad in [
            fmt(0, 100, 1),
            fmt(3104, 100, 1),
            fmt(100, 100, 1),
            fmt(96, 0, 1),
            fmt(96, 2082, 1),
            fmt(96, 101, 1),
            fmt(1552, 100, 2),
        ] {
            assert!(
                matches!(validate_roi_format(&cam, &bad), Err(AsiError::InvalidArgument(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_validate_asi120_kilopixel_rule() {
        let cam = info("ZWO ASI120MM", 1280, 960);
        assert!(validate_roi_format(&cam, &fmt(640, 480, 1)).is_ok());
        // 8 * 2 = 16 pixels, valid everywhere except the ASI120.
        assert!(validate_roi_format(&cam, &fmt(8, 2, 1)).is_err());
        assert!(validate_roi_format(&info("ZWO ASI290MM", 1936, 1096), &fmt(8, 2, 1)).is_ok());
    }

    #[test]
    fn test_resolve_defaults_centre_and_round() {
        let cam = info("ZWO ASI290MM", 1938, 1097);
        let current = fmt(64, 64, 1);
        let (format, start) = resolve_roi(&cam, &current, &RoiRequest::new()).unwrap();
        assert_eq!(format, fmt(1936, 1096, 1));
        assert_eq!(start, (1, 0));

        let (format, start) =
            resolve_roi(&cam, &current, &RoiRequest::new().with_size(640, 480)).unwrap();
        assert_eq!(format, fmt(640, 480, 1));
        assert_eq!(start, ((1938 - 640) / 2, (1097 - 480) / 2));
    }

    #[test]
    fn test_resolve_uses_binned_sensor() {
        let cam = info("ZWO ASI290MM", 1936, 1096);
        let current = fmt(64, 64, 1);
        let (format, start) = resolve_roi(&cam, &current, &RoiRequest::new().with_bins(2)).unwrap();
        assert_eq!(format, fmt(968, 548, 2));
        assert_eq!(start, (0, 0));
    }

    #[test]
    fn test_resolve_keeps_current_bins_and_type() {
        let cam = info("ZWO ASI290MM", 1936, 1096);
        let current = RoiFormat {
            width: 64,
            height: 64,
            bins: 2,
            image_type: ImageType::Raw16,
        };
        let (format, _) = resolve_roi(&cam, &current, &RoiRequest::new()).unwrap();
        assert_eq!(format.bins, 2);
        assert_eq!(format.image_type, ImageType::Raw16);
    }

    #[test]
    fn test_resolve_rejects_bad_bins_and_overflow() {
        let cam = info("ZWO ASI290MM", 1936, 1096);
        let current = fmt(64, 64, 1);
        assert!(resolve_roi(&cam, &current, &RoiRequest::new().with_bins(5)).is_err());
        assert!(resolve_roi(
            &cam,
            &current,
            &RoiRequest::new().with_size(64, 64).with_start(1900, 0)
        )
        .is_err());
        assert!(resolve_roi(
            &cam,
            &current,
            &RoiRequest::new().with_size(64, 64).with_start(0, 1040)
        )
        .is_err());
    }

    #[test]
    fn test_resolve_rejects_extreme_and_negative_starts() {
        let cam = info("ZWO ASI290MM", 1936, 1096);
        let current = fmt(64, 64, 1);
        for request in [
            RoiRequest::new().with_size(64, 64).with_start(i32::MAX, 0),
            RoiRequest::new().with_size(64, 64).with_start(0, i32::MAX),
            RoiRequest::new().with_size(64, 64).with_start(-8, 0),
            RoiRequest::new().with_size(64, 64).with_start(0, -2),
            RoiRequest::new().with_size(i32::MIN, 64),
        ] {
            assert!(
                matches!(
                    resolve_roi(&cam, &current, &request),
                    Err(AsiError::InvalidArgument(_))
                ),
                "{:?} should be rejected",
                request
            );
        }
    }
}
