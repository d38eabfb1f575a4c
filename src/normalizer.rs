//! Decoding of uploaded image bytes into the pipeline's starting buffer

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use tracing::debug;

use crate::error::InputError;
use crate::models::PixelBuffer;

/// Decode encoded image bytes (PNG, JPEG, GIF, BMP, ...) into an RGB buffer.
///
/// Grayscale, palette, 16-bit and alpha sources are converted to 8-bit RGB;
/// alpha is dropped. When `max_dimension` is set and the longer side exceeds
/// it, the image is downscaled keeping its aspect ratio.
pub fn normalize(bytes: &[u8], max_dimension: Option<u32>) -> Result<PixelBuffer, InputError> {
    if bytes.is_empty() {
        return Err(InputError::Empty);
    }
    let img = image::load_from_memory(bytes)?;
    normalize_image(img, max_dimension)
}

/// Same as [`normalize`] for an already decoded image
pub fn normalize_image(
    img: DynamicImage,
    max_dimension: Option<u32>,
) -> Result<PixelBuffer, InputError> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(InputError::ZeroArea { width, height });
    }
    debug!(width, height, color = ?img.color(), "decoded input image");

    let img = match max_dimension {
        Some(max_dim) if width.max(height) > max_dim => {
            let resized = img.resize(max_dim, max_dim, FilterType::Triangle);
            debug!(
                from_width = width,
                from_height = height,
                to_width = resized.width(),
                to_height = resized.height(),
                "downscaled input image"
            );
            resized
        }
        _ => img,
    };

    Ok(PixelBuffer::Rgb(img.to_rgb8()))
}
