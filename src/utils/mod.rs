//! Image processing helpers used by the transform stages
//!
//! - Grayscale conversion (RGB to luminance)
//! - Gaussian smoothing with border handling
//! - Binarization (Otsu, global and Gaussian-adaptive thresholds)

pub mod binarization;
pub mod blur;
pub mod grayscale;
