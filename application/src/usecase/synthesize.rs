use std::sync::Arc;

use async_trait::async_trait;
use validator::Validate;

use speech_domain::{AccentFlags, AudioEncoder, EncodedAudio, SynthesisInput, SynthesisPort};

use crate::{ApplicationError, SynthesizeSpeechRequest};

#[async_trait]
pub trait SynthesisUseCase: Send + Sync {
    async fn synthesize(
        &self,
        request: SynthesizeSpeechRequest,
    ) -> Result<EncodedAudio, ApplicationError>;
}

#[derive(Debug, Clone)]
pub struct SynthesisDefaults {
    pub speaker: String,
    pub sample_rate_hz: u32,
}

pub struct SynthesisUseCaseImpl {
    synthesis: Arc<dyn SynthesisPort>,
    encoder: Arc<dyn AudioEncoder>,
    defaults: SynthesisDefaults,
}

impl SynthesisUseCaseImpl {
    pub fn new(
        synthesis: Arc<dyn SynthesisPort>,
        encoder: Arc<dyn AudioEncoder>,
        defaults: SynthesisDefaults,
    ) -> Self {
        Self {
            synthesis,
            encoder,
            defaults,
        }
    }

    fn resolve_input(&self, request: SynthesizeSpeechRequest) -> SynthesisInput {
        SynthesisInput {
            text: request.text,
            speaker: request
                .speaker
                .unwrap_or_else(|| self.defaults.speaker.clone()),
            sample_rate_hz: request.sample_rate.unwrap_or(self.defaults.sample_rate_hz),
            accents: AccentFlags::default(),
        }
    }
}

#[async_trait]
impl SynthesisUseCase for SynthesisUseCaseImpl {
    async fn synthesize(
        &self,
        request: SynthesizeSpeechRequest,
    ) -> Result<EncodedAudio, ApplicationError> {
        request.validate()?;

        let input = self.resolve_input(request);
        let speaker = input.speaker.clone();
        let requested_rate_hz = input.sample_rate_hz;
        tracing::debug!(
            speaker = %speaker,
            sample_rate_hz = requested_rate_hz,
            text_chars = input.text.chars().count(),
            "starting speech synthesis"
        );

        let audio = self.synthesis.synthesize(input).await.map_err(|err| {
            tracing::error!(speaker = %speaker, error = %err, "synthesis model failed");
            ApplicationError::Synthesis(err)
        })?;

        if audio.sample_rate_hz != requested_rate_hz {
            tracing::warn!(
                requested_rate_hz,
                produced_rate_hz = audio.sample_rate_hz,
                "synthesis model returned a different sample rate; encoding at the produced rate"
            );
        }

        let encoded = self.encoder.encode(&audio).map_err(|err| {
            tracing::error!(error = %err, "audio encoding failed");
            ApplicationError::Synthesis(err)
        })?;

        tracing::debug!(
            sample_count = audio.len(),
            duration_ms = audio.duration_ms(),
            encoded_bytes = encoded.len(),
            "speech synthesis completed"
        );

        Ok(encoded)
    }
}
