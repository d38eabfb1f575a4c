//! The decode pipeline: normalize once, then walk the preprocessing stages
//! until the detector recovers a payload.

use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::detector::{QrDetector, RqrrDetector};
use crate::error::{ConfigError, InputError, StageError};
use crate::models::{
    AttemptOutcome, DecodeAttempt, DecodeReport, DecodeResult, Payload, PixelBuffer,
};
use crate::normalizer::normalize;
use crate::transform::Stage;

/// Staged QR decoder.
///
/// Stages run in the configured order and the first payload short-circuits
/// the rest. A failing stage is logged and counts as "not found"; only
/// undecodable input bytes surface as an error.
#[derive(Debug, Clone)]
pub struct DecodePipeline<D = RqrrDetector> {
    detector: D,
    config: PipelineConfig,
}

impl Default for DecodePipeline<RqrrDetector> {
    fn default() -> Self {
        Self::new(RqrrDetector)
    }
}

impl<D: QrDetector> DecodePipeline<D> {
    /// Pipeline with the default configuration
    pub fn new(detector: D) -> Self {
        Self {
            detector,
            config: PipelineConfig::default(),
        }
    }

    /// Pipeline with a custom configuration
    pub fn with_config(detector: D, config: PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { detector, config })
    }

    /// Active configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Underlying detector
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Decode encoded image bytes
    pub fn decode(&self, bytes: &[u8]) -> Result<DecodeResult, InputError> {
        self.decode_report(bytes).map(|report| report.result)
    }

    /// Decode encoded image bytes and keep the attempt log
    pub fn decode_report(&self, bytes: &[u8]) -> Result<DecodeReport, InputError> {
        let buffer = normalize(bytes, self.config.max_dimension)?;
        Ok(self.run(&buffer))
    }

    /// Decode an already normalized buffer
    pub fn decode_buffer(&self, buffer: &PixelBuffer) -> DecodeResult {
        self.run(buffer).result
    }

    /// Run the stages against `buffer`, recording every attempt
    pub fn run(&self, buffer: &PixelBuffer) -> DecodeReport {
        let mut attempts = Vec::with_capacity(self.config.stages.len());

        for &stage in &self.config.stages {
            let start = Instant::now();
            let outcome = self.attempt(stage, buffer);
            let elapsed = start.elapsed();

            match outcome {
                Ok(Some(payload)) => {
                    debug!(
                        stage = stage.name(),
                        elapsed_us = elapsed.as_micros() as u64,
                        bytes = payload.as_bytes().len(),
                        "stage decoded a payload"
                    );
                    attempts.push(DecodeAttempt {
                        stage,
                        outcome: AttemptOutcome::Found,
                        elapsed,
                    });
                    return DecodeReport {
                        attempts,
                        result: DecodeResult::Found(payload),
                    };
                }
                Ok(None) => {
                    debug!(
                        stage = stage.name(),
                        elapsed_us = elapsed.as_micros() as u64,
                        "stage found nothing"
                    );
                    attempts.push(DecodeAttempt {
                        stage,
                        outcome: AttemptOutcome::NotFound,
                        elapsed,
                    });
                }
                Err(err) => {
                    warn!(stage = stage.name(), error = %err, "stage failed, continuing");
                    attempts.push(DecodeAttempt {
                        stage,
                        outcome: AttemptOutcome::Failed(err),
                        elapsed,
                    });
                }
            }
        }

        debug!(stages = attempts.len(), "all stages exhausted");
        DecodeReport {
            attempts,
            result: DecodeResult::NotFound,
        }
    }

    fn attempt(&self, stage: Stage, input: &PixelBuffer) -> Result<Option<Payload>, StageError> {
        let transformed = stage.apply(input, &self.config)?;
        let payload = self.detector.detect(&transformed)?;
        Ok(payload.filter(|p| !p.is_empty()))
    }
}

impl<D: QrDetector + Sync> DecodePipeline<D> {
    /// Decode many images in parallel. Results keep input order.
    pub fn decode_batch<B>(&self, inputs: &[B]) -> Vec<Result<DecodeResult, InputError>>
    where
        B: AsRef<[u8]> + Sync,
    {
        inputs
            .par_iter()
            .map(|bytes| self.decode(bytes.as_ref()))
            .collect()
    }
}
