//! Error types for QR reading

use thiserror::Error;

/// Errors raised when the input bytes cannot be turned into an image.
///
/// This is the only error that crosses the pipeline boundary; everything that
/// goes wrong after normalization resolves to a [`crate::DecodeResult`].
#[derive(Error, Debug)]
pub enum InputError {
    /// No bytes were supplied
    #[error("input is empty")]
    Empty,

    /// The bytes are not an image in any supported format
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),

    /// The image decoded but has no pixels
    #[error("image has zero area ({width}x{height})")]
    ZeroArea {
        /// Decoded width
        width: u32,
        /// Decoded height
        height: u32,
    },
}

/// Recovered failure of a single transform or detection attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    /// Buffer has a zero dimension
    #[error("buffer has zero area ({width}x{height})")]
    EmptyBuffer {
        /// Buffer width
        width: u32,
        /// Buffer height
        height: u32,
    },

    /// Raw pixel data does not match the declared dimensions
    #[error("buffer length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch {
        /// Bytes implied by the dimensions
        expected: usize,
        /// Bytes present
        actual: usize,
    },

    /// Detector reported an internal fault
    #[error("detector fault: {0}")]
    Detector(String),
}

/// Invalid pipeline configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Adaptive threshold window must be odd and within `3..=255`
    #[error("adaptive block size must be odd and in 3..=255, got {0}")]
    AdaptiveBlockSize(u32),

    /// Adaptive threshold offset must lie within `-255..=255`
    #[error("adaptive offset must be in -255..=255, got {0}")]
    AdaptiveOffset(i32),

    /// Blur kernel must be odd and within `1..=255`
    #[error("blur kernel size must be odd and in 1..=255, got {0}")]
    BlurKernelSize(u32),

    /// No stage to run
    #[error("stage list is empty")]
    NoStages,

    /// A stage appears more than once
    #[error("stage `{0}` is listed more than once")]
    DuplicateStage(&'static str),

    /// Downscale target of zero
    #[error("max dimension must be > 0")]
    ZeroMaxDimension,
}

/// Errors raised while rendering a QR code
#[derive(Error, Debug)]
pub enum EncodeError {
    /// Payload does not fit any QR version, or similar encoder failure
    #[error("QR encoding failed: {0}")]
    Qr(qrcode::types::QrError),

    /// PNG encoding failed
    #[error("PNG encoding failed: {0}")]
    Image(#[from] image::ImageError),
}
