use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SynthesizeSpeechRequest {
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub text: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 64, message = "speaker must be 1 to 64 characters"))]
    pub speaker: Option<String>,
    #[serde(default, rename = "sampleRate", alias = "sample_rate")]
    #[validate(range(min = 1, message = "sampleRate must be positive"))]
    pub sample_rate: Option<u32>,
}

impl SynthesizeSpeechRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            speaker: None,
            sample_rate: None,
        }
    }

    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }
}
