//! QR code rendering.
//!
//! Produces black-on-white symbols with error-correction level L and the
//! smallest version that fits the payload.

use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageOutputFormat, Luma};
use qrcode::{Color, EcLevel, QrCode};

use crate::error::EncodeError;

/// Layout of a rendered symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Pixels per module side
    pub module_pixels: u32,
    /// Light modules around the symbol
    pub quiet_zone: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            module_pixels: 10,
            quiet_zone: 4,
        }
    }
}

/// Render `payload` into a grayscale image
pub fn render_luma(payload: &[u8], options: RenderOptions) -> Result<GrayImage, EncodeError> {
    let code = QrCode::with_error_correction_level(payload, EcLevel::L).map_err(EncodeError::Qr)?;
    let modules = code.width() as u32;
    let colors = code.to_colors();
    let scale = options.module_pixels.max(1);
    let quiet = options.quiet_zone;
    let size = (modules + 2 * quiet) * scale;

    Ok(GrayImage::from_fn(size, size, |x, y| {
        let (mx, my) = (x / scale, y / scale);
        let inside = (quiet..modules + quiet).contains(&mx) && (quiet..modules + quiet).contains(&my);
        if !inside {
            return Luma([255]);
        }
        let idx = ((my - quiet) * modules + (mx - quiet)) as usize;
        match colors[idx] {
            Color::Dark => Luma([0]),
            Color::Light => Luma([255]),
        }
    }))
}

/// Render `payload` with the default layout and encode it as PNG
pub fn render_png(payload: &[u8]) -> Result<Vec<u8>, EncodeError> {
    let img = render_luma(payload, RenderOptions::default())?;
    let mut bytes = Vec::new();
    DynamicImage::ImageLuma8(img).write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)?;
    Ok(bytes)
}
