use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::ExposureStatus;

/// Status codes returned by the ASI SDK. Zero is success and never appears here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidIndex,
    InvalidId,
    InvalidControlType,
    CameraClosed,
    CameraRemoved,
    InvalidPath,
    InvalidFileFormat,
    InvalidSize,
    InvalidImageType,
    OutOfBoundary,
    Timeout,
    InvalidSequence,
    BufferTooSmall,
    VideoModeActive,
    ExposureInProgress,
    GeneralError,
    InvalidMode,
    Unknown(i32),
}

impl ErrorCode {
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => ErrorCode::InvalidIndex,
            2 => ErrorCode::InvalidId,
            3 => ErrorCode::InvalidControlType,
            4 => ErrorCode::CameraClosed,
            5 => ErrorCode::CameraRemoved,
            6 => ErrorCode::InvalidPath,
            7 => ErrorCode::InvalidFileFormat,
            8 => ErrorCode::InvalidSize,
            9 => ErrorCode::InvalidImageType,
            10 => ErrorCode::OutOfBoundary,
            11 => ErrorCode::Timeout,
            12 => ErrorCode::InvalidSequence,
            13 => ErrorCode::BufferTooSmall,
            14 => ErrorCode::VideoModeActive,
            15 => ErrorCode::ExposureInProgress,
            16 => ErrorCode::GeneralError,
            17 => ErrorCode::InvalidMode,
            other => ErrorCode::Unknown(other),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            ErrorCode::InvalidIndex => 1,
            ErrorCode::InvalidId => 2,
            ErrorCode::InvalidControlType => 3,
            ErrorCode::CameraClosed => 4,
            ErrorCode::CameraRemoved => 5,
            ErrorCode::InvalidPath => 6,
            ErrorCode::InvalidFileFormat => 7,
            ErrorCode::InvalidSize => 8,
            ErrorCode::InvalidImageType => 9,
            ErrorCode::OutOfBoundary => 10,
            ErrorCode::Timeout => 11,
            ErrorCode::InvalidSequence => 12,
            ErrorCode::BufferTooSmall => 13,
            ErrorCode::VideoModeActive => 14,
            ErrorCode::ExposureInProgress => 15,
            ErrorCode::GeneralError => 16,
            ErrorCode::InvalidMode => 17,
            ErrorCode::Unknown(code) => *code,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidIndex => "Invalid index",
            ErrorCode::InvalidId => "Invalid ID",
            ErrorCode::InvalidControlType => "Invalid control type",
            ErrorCode::CameraClosed => "Camera closed",
            ErrorCode::CameraRemoved => "Camera removed",
            ErrorCode::InvalidPath => "Invalid path",
            ErrorCode::InvalidFileFormat => "Invalid file format",
            ErrorCode::InvalidSize => "Invalid size",
            ErrorCode::InvalidImageType => "Invalid image type",
            ErrorCode::OutOfBoundary => "Outside of boundary",
            ErrorCode::Timeout => "Timeout",
            ErrorCode::InvalidSequence => "Invalid sequence",
            ErrorCode::BufferTooSmall => "Buffer too small",
            ErrorCode::VideoModeActive => "Video mode active",
            ErrorCode::ExposureInProgress => "Exposure in progress",
            ErrorCode::GeneralError => "General error",
            ErrorCode::InvalidMode => "Invalid mode",
            ErrorCode::Unknown(_) => "Unknown error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message(), self.code())
    }
}

#[derive(Error, Debug)]
pub enum AsiError {
    #[error("ASI SDK error: {0}")]
    Sdk(ErrorCode),

    #[error("Could not capture image: exposure status {0:?}")]
    Capture(ExposureStatus),

    #[error("ASI SDK library not found (tried: {})", format_tried(.tried))]
    LibraryNotFound { tried: Vec<String> },

    #[error("Failed to load ASI SDK library {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("ASI SDK library is missing symbol {name}: {source}")]
    Symbol {
        name: &'static str,
        #[source]
        source: libloading::Error,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid camera index {0}")]
    InvalidIndex(i32),

    #[error("Could not find camera model {0}")]
    CameraNotFound(String),

    #[error("Video capture has not been started")]
    VideoNotStarted,

    #[error("Frame buffer is {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("Video capture thread panicked")]
    WorkerPanicked,

    #[error("Unsupported image type {0}")]
    UnsupportedImageType(i32),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
}

fn format_tried(tried: &[String]) -> String {
    if tried.is_empty() {
        "nothing".to_string()
    } else {
        tried.join(", ")
    }
}

pub type Result<T> = std::result::Result<T, AsiError>;

/// Turn an SDK status code into a `Result`.
pub fn check(code: i32) -> Result<()> {
    if code == 0 {
        Ok(())
    } else {
        Err(AsiError::Sdk(ErrorCode::from_code(code)))
    }
}

impl AsiError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        AsiError::InvalidArgument(msg.into())
    }

    pub fn sdk(code: ErrorCode) -> Self {
        AsiError::Sdk(code)
    }

    /// SDK status code behind this error, if it came from the library.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            AsiError::Sdk(code) => Some(*code),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.code() == Some(ErrorCode::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_success() {
        assert!(check(0).is_ok());
    }

    #[test]
    fn test_check_maps_every_known_code() {
        for code in 1..=17 {
            let err = check(code).unwrap_err();
            let mapped = err.code().expect("sdk error");
            assert_eq!(mapped.code(), code);
            assert!(!matches!(mapped, ErrorCode::Unknown(_)));
        }
    }

    #[test]
    fn test_unknown_code_is_preserved() {
        let err = check(42).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::Unknown(42)));
        assert_eq!(err.to_string(), "ASI SDK error: Unknown error (code 42)");
    }

    #[test]
    fn test_messages() {
        assert_eq!(ErrorCode::from_code(11).message(), "Timeout");
        assert_eq!(ErrorCode::from_code(14).message(), "Video mode active");
        assert_eq!(
            check(4).unwrap_err().to_string(),
            "ASI SDK error: Camera closed (code 4)"
        );
    }

    #[test]
    fn test_is_timeout() {
        assert!(check(11).unwrap_err().is_timeout());
        assert!(!check(12).unwrap_err().is_timeout());
        assert!(!AsiError::VideoNotStarted.is_timeout());
    }

    #[test]
    fn test_library_not_found_lists_candidates() {
        let err = AsiError::LibraryNotFound {
            tried: vec!["a.so".into(), "b.so".into()],
        };
        assert_eq!(err.to_string(), "ASI SDK library not found (tried: a.so, b.so)");
    }
}
