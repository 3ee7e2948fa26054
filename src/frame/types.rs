use image::{DynamicImage, GrayImage, ImageBuffer, Luma, RgbImage};

use crate::error::{AsiError, Result};
use crate::types::ImageType;

/// Pixel storage, one element per sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pixels {
    U8(Vec<u8>),
    U16(Vec<u16>),
}

/// A decoded image as delivered by the camera.
///
/// RGB24 frames keep the SDK's channel order, which is B, G, R.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub image_type: ImageType,
    pub pixels: Pixels,
}

impl Frame {
    pub fn new(width: u32, height: u32, image_type: ImageType, pixels: Pixels) -> Self {
        Self {
            width,
            height,
            image_type,
            pixels,
        }
    }

    pub fn channels(&self) -> usize {
        match self.image_type {
            ImageType::Rgb24 => 3,
            _ => 1,
        }
    }

    /// `[height, width]`, or `[height, width, 3]` for RGB24.
    pub fn shape(&self) -> Vec<usize> {
        let mut shape = vec![self.height as usize, self.width as usize];
        if self.channels() == 3 {
            shape.push(3);
        }
        shape
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        match &self.pixels {
            Pixels::U8(data) => data.len(),
            Pixels::U16(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bit_depth(&self) -> u8 {
        match self.pixels {
            Pixels::U8(_) => 8,
            Pixels::U16(_) => 16,
        }
    }

    pub fn mean(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let sum: u64 = match &self.pixels {
            Pixels::U8(data) => data.iter().map(|&v| u64::from(v)).sum(),
            Pixels::U16(data) => data.iter().map(|&v| u64::from(v)).sum(),
        };
        sum as f64 / self.len() as f64
    }

    pub fn min_max(&self) -> Option<(u16, u16)> {
        let fold = |acc: Option<(u16, u16)>, v: u16| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        };
        match &self.pixels {
            Pixels::U8(data) => data.iter().map(|&v| u16::from(v)).fold(None, fold),
            Pixels::U16(data) => data.iter().copied().fold(None, fold),
        }
    }

    /// Convert for saving with the `image` crate. RGB24 is reordered to RGB.
    pub fn to_image(&self) -> Result<DynamicImage> {
        let size_error = || AsiError::BufferSize {
            expected: self.width as usize * self.height as usize * self.channels(),
            actual: self.len(),
        };

        match (&self.pixels, self.image_type) {
            (Pixels::U8(data), ImageType::Rgb24) => {
                let mut rgb = data.clone();
                for pixel in rgb.chunks_exact_mut(3) {
                    pixel.swap(0, 2);
                }
                RgbImage::from_raw(self.width, self.height, rgb)
                    .map(DynamicImage::ImageRgb8)
                    .ok_or_else(size_error)
            }
            (Pixels::U8(data), _) => GrayImage::from_raw(self.width, self.height, data.clone())
                .map(DynamicImage::ImageLuma8)
                .ok_or_else(size_error),
            (Pixels::U16(data), _) => {
                ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(self.width, self.height, data.clone())
                    .map(DynamicImage::ImageLuma16)
                    .ok_or_else(size_error)
            }
        }
    }
}
