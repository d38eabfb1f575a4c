//! RustQR Reader - robust QR code reading from photographs
//!
//! A single detection pass often fails on noisy, low-contrast or unevenly lit
//! photos. This crate decodes the uploaded image once and then escalates
//! through a fixed chain of preprocessing stages, asking the detector after
//! each one and stopping at the first payload:
//!
//! 1. identity (the image as uploaded)
//! 2. grayscale + Gaussian adaptive threshold
//! 3. grayscale + Gaussian blur + Otsu threshold
//!
//! ```
//! let png = rust_qr_reader::encode::render_png(b"hello").unwrap();
//! let result = rust_qr_reader::decode(&png).unwrap();
//! assert_eq!(result.payload().and_then(|p| p.as_str()), Some("hello"));
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Pipeline tunables and environment overrides
pub mod config;
/// QR symbol detection behind a swappable trait
pub mod detector;
/// QR code rendering to images and PNG bytes
pub mod encode;
/// Error types
pub mod error;
/// Core data structures (pixel buffers, payloads, decode results)
pub mod models;
/// Image byte decoding into the canonical RGB buffer
pub mod normalizer;
/// Stage sequencing and the decode entry points
pub mod pipeline;
/// Helpers for the command-line tool (dataset walking, buffer statistics)
pub mod tools;
/// Preprocessing stages
pub mod transform;
/// Image processing primitives (grayscale, blur, binarization)
pub mod utils;

pub use config::PipelineConfig;
pub use detector::{QrDetector, RqrrDetector};
pub use error::{ConfigError, EncodeError, InputError, StageError};
pub use models::{
    AttemptOutcome, ColorSpace, DecodeAttempt, DecodeReport, DecodeResult, Payload, PixelBuffer,
};
pub use pipeline::DecodePipeline;
pub use transform::Stage;

/// Decode a QR code from encoded image bytes with the default pipeline
///
/// # Arguments
/// * `bytes` - Encoded image (PNG, JPEG, ...)
///
/// # Returns
/// `Found(payload)` or `NotFound`; `InputError` only when the bytes are not
/// an image at all
pub fn decode(bytes: &[u8]) -> Result<DecodeResult, InputError> {
    DecodePipeline::default().decode(bytes)
}

/// Decode several images in parallel with the default pipeline
///
/// Results are returned in input order.
pub fn decode_batch<B: AsRef<[u8]> + Sync>(inputs: &[B]) -> Vec<Result<DecodeResult, InputError>> {
    DecodePipeline::default().decode_batch(inputs)
}
