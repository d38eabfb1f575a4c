//! Data types shared by the pipeline stages

/// Pixel buffers handed between stages and the detector
pub mod buffer;
/// Decode outcomes and per-stage attempt records
pub mod result;

pub use buffer::{ColorSpace, PixelBuffer};
pub use result::{AttemptOutcome, DecodeAttempt, DecodeReport, DecodeResult, Payload};
