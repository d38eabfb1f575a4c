//! Preprocessing stages of the decode pipeline.
//!
//! Each stage is a pure function from one [`PixelBuffer`] to a new one. The
//! set is closed; the pipeline walks them in order from least to most
//! destructive.

use std::fmt;

use image::GrayImage;

use crate::config::PipelineConfig;
use crate::error::StageError;
use crate::models::PixelBuffer;
use crate::utils::binarization::{adaptive_gaussian_binarize, otsu_binarize};
use crate::utils::blur::{Border, gaussian_blur};

/// A preprocessing stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Buffer passed through unchanged
    Identity,
    /// Grayscale, then Gaussian-weighted adaptive threshold
    AdaptiveThreshold,
    /// Grayscale, Gaussian blur, then Otsu global threshold
    BlurOtsu,
}

impl Stage {
    /// Canonical order: cheapest and least destructive first
    pub const ALL: [Stage; 3] = [Stage::Identity, Stage::AdaptiveThreshold, Stage::BlurOtsu];

    /// Stable identifier used in logs and configuration
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Identity => "identity",
            Stage::AdaptiveThreshold => "adaptive-threshold",
            Stage::BlurOtsu => "blur-otsu",
        }
    }

    /// Parse a stage name. Accepts the canonical names and the short forms
    /// `raw`, `adaptive` and `otsu`.
    pub fn from_name(name: &str) -> Option<Stage> {
        match name.to_ascii_lowercase().as_str() {
            "identity" | "raw" => Some(Stage::Identity),
            "adaptive-threshold" | "adaptive" => Some(Stage::AdaptiveThreshold),
            "blur-otsu" | "otsu" => Some(Stage::BlurOtsu),
            _ => None,
        }
    }

    /// Produce this stage's buffer from `input`
    pub fn apply(
        &self,
        input: &PixelBuffer,
        config: &PipelineConfig,
    ) -> Result<PixelBuffer, StageError> {
        input.check_shape()?;
        match self {
            Stage::Identity => Ok(input.clone()),
            Stage::AdaptiveThreshold => {
                let gray = input.to_luma();
                let (w, h) = gray.dimensions();
                let binary = adaptive_gaussian_binarize(
                    gray.as_raw(),
                    w as usize,
                    h as usize,
                    config.adaptive_block_size as usize,
                    config.adaptive_offset,
                );
                luma_buffer(w, h, binary)
            }
            Stage::BlurOtsu => {
                let gray = input.to_luma();
                let (w, h) = gray.dimensions();
                let blurred = gaussian_blur(
                    gray.as_raw(),
                    w as usize,
                    h as usize,
                    config.blur_kernel_size as usize,
                    0.0,
                    Border::Reflect101,
                );
                let (binary, threshold) = otsu_binarize(&blurred);
                tracing::trace!(threshold, "otsu threshold selected");
                luma_buffer(w, h, binary)
            }
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn luma_buffer(width: u32, height: u32, data: Vec<u8>) -> Result<PixelBuffer, StageError> {
    let actual = data.len();
    GrayImage::from_raw(width, height, data)
        .map(PixelBuffer::Luma)
        .ok_or(StageError::LengthMismatch {
            expected: width as usize * height as usize,
            actual,
        })
}
