use std::fmt;

use serde::{Deserialize, Serialize};

use crate::DomainError;

pub const WAV_CONTENT_TYPE: &str = "audio/wav";

/// Mono floating-point audio as produced by a synthesis collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSamples {
    pub sample_rate_hz: u32,
    pub samples: Vec<f32>,
}

impl AudioSamples {
    pub fn new(samples: Vec<f32>, sample_rate_hz: u32) -> Self {
        Self {
            sample_rate_hz,
            samples,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate_hz == 0 {
            return 0;
        }
        (self.samples.len() as u64).saturating_mul(1_000) / u64::from(self.sample_rate_hz)
    }
}

/// A complete, self-describing audio container ready to be sent as a response body.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedAudio {
    bytes: Vec<u8>,
    content_type: &'static str,
}

impl EncodedAudio {
    pub fn new(bytes: Vec<u8>, content_type: &'static str) -> Self {
        Self {
            bytes,
            content_type,
        }
    }

    pub fn wav(bytes: Vec<u8>) -> Self {
        Self::new(bytes, WAV_CONTENT_TYPE)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl fmt::Debug for EncodedAudio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedAudio")
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Pronunciation hints forwarded to the synthesis model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccentFlags {
    pub put_accent: bool,
    pub put_yo: bool,
}

impl Default for AccentFlags {
    fn default() -> Self {
        Self {
            put_accent: true,
            put_yo: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisInput {
    pub text: String,
    pub speaker: String,
    pub sample_rate_hz: u32,
    pub accents: AccentFlags,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    pub start_ms: u64,
    pub end_ms: u64,
}

impl TranscriptSegment {
    pub fn new(text: impl Into<String>, start_ms: u64, end_ms: u64) -> Self {
        Self {
            text: text.into(),
            start_ms,
            end_ms,
        }
    }
}

/// Segments are produced on demand; decoding errors may surface while draining.
pub type SegmentStream = Box<dyn Iterator<Item = Result<TranscriptSegment, DomainError>> + Send>;

pub struct TranscriptionOutput {
    pub language: String,
    pub segments: SegmentStream,
}

impl TranscriptionOutput {
    pub fn new(language: impl Into<String>, segments: SegmentStream) -> Self {
        Self {
            language: language.into(),
            segments,
        }
    }

    pub fn from_segments(language: impl Into<String>, segments: Vec<TranscriptSegment>) -> Self {
        Self::new(language, Box::new(segments.into_iter().map(Ok)))
    }
}

impl fmt::Debug for TranscriptionOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranscriptionOutput")
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptionResult {
    pub text: String,
    pub language: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_is_derived_from_sample_rate() {
        let audio = AudioSamples::new(vec![0.0; 24_000], 48_000);
        assert_eq!(audio.duration_ms(), 500);
        assert_eq!(AudioSamples::new(vec![0.0; 10], 0).duration_ms(), 0);
    }

    #[test]
    fn accent_flags_are_enabled_by_default() {
        let flags = AccentFlags::default();
        assert!(flags.put_accent);
        assert!(flags.put_yo);
    }
}
