use std::panic::{AssertUnwindSafe, catch_unwind};

use rqrr::PreparedImage;
use tracing::trace;

use super::QrDetector;
use crate::error::StageError;
use crate::models::{Payload, PixelBuffer};

/// QR detector built on `rqrr`.
///
/// RGB buffers are reduced to luminance before detection; binary buffers are
/// used as-is. Grids are tried in detection order and the first one that
/// decodes wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct RqrrDetector;

impl RqrrDetector {
    /// Create a detector
    pub fn new() -> Self {
        Self
    }
}

impl QrDetector for RqrrDetector {
    fn detect(&self, buffer: &PixelBuffer) -> Result<Option<Payload>, StageError> {
        buffer.check_shape()?;
        let gray = buffer.to_luma();
        let (width, height) = (gray.width() as usize, gray.height() as usize);
        let raw = gray.as_raw();

        // rqrr indexes by (x, y) without bounds guarantees on odd inputs; a
        // panic there is a detector fault, not a process abort.
        let decoded = catch_unwind(AssertUnwindSafe(|| {
            let mut prepared =
                PreparedImage::prepare_from_greyscale(width, height, |x, y| raw[y * width + x]);
            let grids = prepared.detect_grids();
            trace!(grids = grids.len(), "rqrr grid candidates");

            for (idx, grid) in grids.iter().enumerate() {
                let mut bytes = Vec::new();
                match grid.decode_to(&mut bytes) {
                    Ok(meta) if !bytes.is_empty() => {
                        trace!(grid = idx, ?meta, "grid decoded");
                        return Some(bytes);
                    }
                    Ok(_) => trace!(grid = idx, "grid decoded to an empty payload"),
                    Err(err) => trace!(grid = idx, ?err, "grid failed to decode"),
                }
            }
            None
        }))
        .map_err(|_| StageError::Detector("rqrr panicked during detection".to_string()))?;

        Ok(decoded.map(Payload::new))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::{RenderOptions, render_luma};
    use image::{GrayImage, Luma, Rgb, RgbImage};

    #[test]
    fn test_detects_rendered_code() {
        let img = render_luma(b"https://example.com/a?b=c", RenderOptions::default()).unwrap();
        let payload = RqrrDetector.detect(&PixelBuffer::Luma(img)).unwrap();
        assert_eq!(
            payload.as_ref().and_then(Payload::as_str),
            Some("https://example.com/a?b=c")
        );
    }

    #[test]
    fn test_detects_rgb_code() {
        let gray = render_luma(b"rgb", RenderOptions::default()).unwrap();
        let rgb = RgbImage::from_fn(gray.width(), gray.height(), |x, y| {
            let v = gray.get_pixel(x, y)[0];
            Rgb([v, v, v])
        });
        let payload = RqrrDetector.detect(&PixelBuffer::Rgb(rgb)).unwrap();
        assert_eq!(payload, Some(Payload::from("rgb")));
    }

    #[test]
    fn test_blank_image_is_not_an_error() {
        let blank = GrayImage::from_pixel(120, 80, Luma([255]));
        assert_eq!(RqrrDetector.detect(&PixelBuffer::Luma(blank)), Ok(None));
    }

    #[test]
    fn test_empty_buffer_is_an_error() {
        let empty = GrayImage::new(0, 0);
        assert!(RqrrDetector.detect(&PixelBuffer::Luma(empty)).is_err());
    }
}
