use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

use crate::error::StageError;
use crate::transform::Stage;

/// Raw bytes recovered from a QR symbol.
///
/// QR symbols can carry any byte sequence, so no character set is assumed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Payload(Vec<u8>);

impl Payload {
    /// Wrap raw payload bytes
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Payload bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Payload as text if it is valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    /// Payload as text, replacing invalid sequences
    pub fn to_text_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    /// Consume into the raw bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// True when no bytes were recovered
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self(text.into_bytes())
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text_lossy())
    }
}

/// Final outcome of a decode call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeResult {
    /// A symbol was decoded
    Found(Payload),
    /// No stage recovered a symbol
    NotFound,
}

impl DecodeResult {
    /// True for [`DecodeResult::Found`]
    pub fn is_found(&self) -> bool {
        matches!(self, DecodeResult::Found(_))
    }

    /// Borrow the payload, if any
    pub fn payload(&self) -> Option<&Payload> {
        match self {
            DecodeResult::Found(payload) => Some(payload),
            DecodeResult::NotFound => None,
        }
    }

    /// Take the payload, if any
    pub fn into_payload(self) -> Option<Payload> {
        match self {
            DecodeResult::Found(payload) => Some(payload),
            DecodeResult::NotFound => None,
        }
    }
}

/// What happened in one stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Detector returned a payload
    Found,
    /// Detector ran and saw nothing
    NotFound,
    /// Transform or detector failed; treated as not found
    Failed(StageError),
}

/// One transform + detect pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeAttempt {
    /// Stage that produced the buffer
    pub stage: Stage,
    /// Result of the pass
    pub outcome: AttemptOutcome,
    /// Wall time spent in transform and detection
    pub elapsed: Duration,
}

/// Attempt log of one pipeline run together with its result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeReport {
    /// Attempts in execution order; stops at the first success
    pub attempts: Vec<DecodeAttempt>,
    /// Final outcome
    pub result: DecodeResult,
}

impl DecodeReport {
    /// Stage that produced the payload, if one did
    pub fn winning_stage(&self) -> Option<Stage> {
        self.attempts
            .iter()
            .find(|a| a.outcome == AttemptOutcome::Found)
            .map(|a| a.stage)
    }

    /// Stages in the order they ran
    pub fn stages_tried(&self) -> Vec<Stage> {
        self.attempts.iter().map(|a| a.stage).collect()
    }

    /// Total time across all attempts
    pub fn total_elapsed(&self) -> Duration {
        self.attempts.iter().map(|a| a.elapsed).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_text_views() {
        let p = Payload::from("héllo");
        assert_eq!(p.as_str(), Some("héllo"));
        assert_eq!(p.to_string(), "héllo");

        let binary = Payload::new(vec![0xff, 0xfe, b'a']);
        assert_eq!(binary.as_str(), None);
        assert!(binary.to_text_lossy().ends_with('a'));
        assert_eq!(binary.as_bytes(), &[0xff, 0xfe, b'a']);
    }

    #[test]
    fn test_winning_stage() {
        let report = DecodeReport {
            attempts: vec![
                DecodeAttempt {
                    stage: Stage::Identity,
                    outcome: AttemptOutcome::NotFound,
                    elapsed: Duration::from_millis(2),
                },
                DecodeAttempt {
                    stage: Stage::AdaptiveThreshold,
                    outcome: AttemptOutcome::Found,
                    elapsed: Duration::from_millis(3),
                },
            ],
            result: DecodeResult::Found(Payload::from("x")),
        };
        assert_eq!(report.winning_stage(), Some(Stage::AdaptiveThreshold));
        assert_eq!(report.total_elapsed(), Duration::from_millis(5));
        assert_eq!(
            report.stages_tried(),
            vec![Stage::Identity, Stage::AdaptiveThreshold]
        );
    }
}
