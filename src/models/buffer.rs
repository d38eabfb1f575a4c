use image::{GrayImage, RgbImage};

use crate::error::StageError;
use crate::utils::grayscale::rgb_to_grayscale;

/// Colour layout of a [`PixelBuffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// Three channels in R, G, B order
    Rgb,
    /// Single intensity channel (grayscale or binary)
    Luma,
}

impl ColorSpace {
    /// Bytes per pixel
    pub fn channels(&self) -> usize {
        match self {
            ColorSpace::Rgb => 3,
            ColorSpace::Luma => 1,
        }
    }
}

/// In-memory raster shared between pipeline stages.
///
/// Stages never mutate a buffer; every transform produces a new one, so a
/// buffer can be handed to several attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PixelBuffer {
    /// 8-bit RGB image
    Rgb(RgbImage),
    /// 8-bit single-channel image
    Luma(GrayImage),
}

impl PixelBuffer {
    /// Build a buffer from raw bytes, checking that the length matches
    /// `width * height * channels`.
    pub fn from_raw(
        color_space: ColorSpace,
        width: u32,
        height: u32,
        data: Vec<u8>,
    ) -> Result<Self, StageError> {
        let expected = width as usize * height as usize * color_space.channels();
        if data.len() != expected {
            return Err(StageError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        let buffer = match color_space {
            ColorSpace::Rgb => RgbImage::from_raw(width, height, data).map(PixelBuffer::Rgb),
            ColorSpace::Luma => GrayImage::from_raw(width, height, data).map(PixelBuffer::Luma),
        };
        buffer.ok_or(StageError::LengthMismatch {
            expected,
            actual: expected,
        })
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        match self {
            PixelBuffer::Rgb(img) => img.width(),
            PixelBuffer::Luma(img) => img.width(),
        }
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        match self {
            PixelBuffer::Rgb(img) => img.height(),
            PixelBuffer::Luma(img) => img.height(),
        }
    }

    /// Colour-space tag
    pub fn color_space(&self) -> ColorSpace {
        match self {
            PixelBuffer::Rgb(_) => ColorSpace::Rgb,
            PixelBuffer::Luma(_) => ColorSpace::Luma,
        }
    }

    /// Raw interleaved pixel bytes
    pub fn as_raw(&self) -> &[u8] {
        match self {
            PixelBuffer::Rgb(img) => img.as_raw(),
            PixelBuffer::Luma(img) => img.as_raw(),
        }
    }

    /// Fail unless the buffer has pixels and its data matches its dimensions.
    pub fn check_shape(&self) -> Result<(), StageError> {
        let (width, height) = (self.width(), self.height());
        if width == 0 || height == 0 {
            return Err(StageError::EmptyBuffer { width, height });
        }
        let expected = width as usize * height as usize * self.color_space().channels();
        let actual = self.as_raw().len();
        if actual < expected {
            return Err(StageError::LengthMismatch { expected, actual });
        }
        Ok(())
    }

    /// Intensity view of the buffer. Luma buffers are cloned as-is.
    pub fn to_luma(&self) -> GrayImage {
        match self {
            PixelBuffer::Luma(img) => img.clone(),
            PixelBuffer::Rgb(img) => {
                let (w, h) = img.dimensions();
                let gray = rgb_to_grayscale(img.as_raw(), w as usize, h as usize);
                // Lengths agree by construction of `rgb_to_grayscale`.
                GrayImage::from_raw(w, h, gray).unwrap_or_else(|| GrayImage::new(w, h))
            }
        }
    }
}

impl From<RgbImage> for PixelBuffer {
    fn from(img: RgbImage) -> Self {
        PixelBuffer::Rgb(img)
    }
}

impl From<GrayImage> for PixelBuffer {
    fn from(img: GrayImage) -> Self {
        PixelBuffer::Luma(img)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_checks_length() {
        let err = PixelBuffer::from_raw(ColorSpace::Rgb, 2, 2, vec![0; 11]).unwrap_err();
        assert_eq!(
            err,
            StageError::LengthMismatch {
                expected: 12,
                actual: 11
            }
        );

        let ok = PixelBuffer::from_raw(ColorSpace::Luma, 2, 2, vec![7; 4]).unwrap();
        assert_eq!(ok.color_space(), ColorSpace::Luma);
        assert_eq!((ok.width(), ok.height()), (2, 2));
    }

    #[test]
    fn test_check_shape_rejects_empty() {
        let buffer = PixelBuffer::Luma(GrayImage::new(0, 5));
        assert_eq!(
            buffer.check_shape(),
            Err(StageError::EmptyBuffer {
                width: 0,
                height: 5
            })
        );
    }

    #[test]
    fn test_to_luma_white_stays_white() {
        let rgb = RgbImage::from_pixel(3, 2, image::Rgb([255, 255, 255]));
        let luma = PixelBuffer::Rgb(rgb).to_luma();
        assert_eq!(luma.dimensions(), (3, 2));
        assert!(luma.as_raw().iter().all(|&v| v == 255));
    }
}
