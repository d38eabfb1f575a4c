//! QR symbol detection
//!
//! The pipeline talks to detection through the [`QrDetector`] trait so the
//! preprocessing logic can be exercised against fake detectors. The default
//! implementation, [`RqrrDetector`], wraps the `rqrr` crate.

/// Detector backed by `rqrr`
pub mod rqrr_adapter;

pub use rqrr_adapter::RqrrDetector;

use crate::error::StageError;
use crate::models::{Payload, PixelBuffer};

/// Locate and decode one QR symbol in a pixel buffer.
///
/// `Ok(None)` means no symbol was found, which is an ordinary outcome.
/// Errors are reserved for buffers the detector cannot process at all.
pub trait QrDetector {
    /// Return the payload of the first decodable symbol
    fn detect(&self, buffer: &PixelBuffer) -> Result<Option<Payload>, StageError>;
}

impl<D: QrDetector + ?Sized> QrDetector for &D {
    fn detect(&self, buffer: &PixelBuffer) -> Result<Option<Payload>, StageError> {
        (**self).detect(buffer)
    }
}

impl<D: QrDetector + ?Sized> QrDetector for Box<D> {
    fn detect(&self, buffer: &PixelBuffer) -> Result<Option<Payload>, StageError> {
        (**self).detect(buffer)
    }
}
