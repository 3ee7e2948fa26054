use log::trace;

use super::types::{Frame, Pixels};
use crate::error::{AsiError, Result};
use crate::types::{ImageType, RoiFormat};

/// Bytes the SDK writes for one frame in `format`.
pub fn buffer_size(format: &RoiFormat) -> usize {
    format.width.max(0) as usize
        * format.height.max(0) as usize
        * format.image_type.bytes_per_pixel()
}

pub struct FrameProcessor;

impl FrameProcessor {
    /// Copy an SDK pixel buffer into a [`Frame`].
    ///
    /// RAW16 samples are read in native byte order, which is how the SDK
    /// fills the buffer.
    pub fn decode(bytes: &[u8], format: &RoiFormat) -> Result<Frame> {
        let expected = buffer_size(format);
        if bytes.len() != expected {
            return Err(AsiError::BufferSize {
                expected,
                actual: bytes.len(),
            });
        }
        trace!(
            "Decoding {}x{} {:?} frame",
            format.width,
            format.height,
            format.image_type
        );

        let pixels = match format.image_type {
            ImageType::Raw8 | ImageType::Y8 | ImageType::Rgb24 => Pixels::U8(bytes.to_vec()),
            ImageType::Raw16 => Pixels::U16(
                bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_ne_bytes([pair[0], pair[1]]))
                    .collect(),
            ),
        };

        Ok(Frame::new(
            format.width as u32,
            format.height as u32,
            format.image_type,
            pixels,
        ))
    }

    /// Same as [`FrameProcessor::decode`] for a raw `ASI_IMG_TYPE` value.
    pub fn decode_raw(
        bytes: &[u8],
        width: i32,
        height: i32,
        bins: i32,
        image_type: i32,
    ) -> Result<Frame> {
        let format = RoiFormat {
            width,
            height,
            bins,
            image_type: ImageType::from_raw(image_type)?,
        };
        Self::decode(bytes, &format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(width: i32, height: i32, image_type: ImageType) -> RoiFormat {
        RoiFormat {
            width,
            height,
            bins: 1,
            image_type,
        }
    }

    #[test]
    fn test_buffer_size_per_type() {
        assert_eq!(buffer_size(&format(640, 480, ImageType::Raw8)), 307_200);
        assert_eq!(buffer_size(&format(640, 480, ImageType::Y8)), 307_200);
        assert_eq!(buffer_size(&format(640, 480, ImageType::Raw16)), 614_400);
        assert_eq!(buffer_size(&format(640, 480, ImageType::Rgb24)), 921_600);
    }

    #[test]
    fn test_decode_raw16_native_endian() {
        let samples = [0u16, 1, 0x1234, u16::MAX];
        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_ne_bytes()).collect();
        // 8 pixels wide is the SDK minimum, use two rows of two here.
        let frame = FrameProcessor::decode(&bytes, &format(2, 2, ImageType::Raw16)).unwrap();
        assert_eq!(frame.pixels, Pixels::U16(samples.to_vec()));
        assert_eq!(frame.shape(), vec![2, 2]);
    }

    #[test]
    fn test_decode_rgb_shape() {
        let bytes = vec![7u8; 8 * 2 * 3];
        let frame = FrameProcessor::decode(&bytes, &format(8, 2, ImageType::Rgb24)).unwrap();
        assert_eq!(frame.shape(), vec![2, 8, 3]);
        assert_eq!(frame.len(), 48);
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let err = FrameProcessor::decode(&[0u8; 10], &format(8, 2, ImageType::Raw8)).unwrap_err();
        assert!(matches!(
            err,
            AsiError::BufferSize {
                expected: 16,
                actual: 10
            }
        ));
    }

    #[test]
    fn test_decode_raw_unknown_type() {
        let err = FrameProcessor::decode_raw(&[0u8; 16], 8, 2, 1, 9).unwrap_err();
        assert!(matches!(err, AsiError::UnsupportedImageType(9)));
    }
}
