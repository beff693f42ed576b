use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use serde::{Deserialize, Serialize};

use speech_domain::{AudioSamples, DomainError, SynthesisInput, SynthesisPort};
use speech_infra_audio::decode_wav;

const SERVICE: &str = "tts";

/// Calls a text-to-speech model server over HTTP.
///
/// The server receives the model id, text, speaker and accent flags and
/// answers either with a WAV body or with JSON `{sample_rate, samples}`.
pub struct RestSynthesisAdapter {
    client: Client,
    endpoint: String,
    model_id: String,
}

#[derive(Serialize)]
struct ModelRequest<'a> {
    model: &'a str,
    text: &'a str,
    speaker: &'a str,
    sample_rate: u32,
    put_accent: bool,
    put_yo: bool,
}

#[derive(Deserialize)]
struct RawSamplesResponse {
    sample_rate: u32,
    samples: Vec<f32>,
}

impl RestSynthesisAdapter {
    pub fn new(
        endpoint: impl Into<String>,
        model_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(timeout)
            .tcp_nodelay(true)
            .build()
            .map_err(|err| DomainError::internal_error(format!("http client: {err}")))?;
        Ok(Self::with_client(client, endpoint, model_id))
    }

    pub fn with_client(
        client: Client,
        endpoint: impl Into<String>,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            model_id: model_id.into(),
        }
    }
}

#[async_trait]
impl SynthesisPort for RestSynthesisAdapter {
    async fn synthesize(&self, input: SynthesisInput) -> Result<AudioSamples, DomainError> {
        let body = ModelRequest {
            model: &self.model_id,
            text: &input.text,
            speaker: &input.speaker,
            sample_rate: input.sample_rate_hz,
            put_accent: input.accents.put_accent,
            put_yo: input.accents.put_yo,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                tracing::error!(endpoint = %self.endpoint, error = %err, "tts request failed");
                DomainError::model_invocation(SERVICE, format!("request failed: {err}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| status.to_string());
            tracing::error!(status = status.as_u16(), detail = %detail, "tts model rejected request");
            return Err(DomainError::model_invocation(SERVICE, detail));
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));

        let audio = if is_json {
            let raw: RawSamplesResponse = response.json().await.map_err(|err| {
                DomainError::model_invocation(SERVICE, format!("invalid sample payload: {err}"))
            })?;
            AudioSamples::new(raw.samples, raw.sample_rate)
        } else {
            let bytes = response.bytes().await.map_err(|err| {
                DomainError::model_invocation(SERVICE, format!("failed to read body: {err}"))
            })?;
            decode_wav(&bytes).map_err(|err| {
                DomainError::model_invocation(SERVICE, format!("invalid wav payload: {err}"))
            })?
        };

        tracing::debug!(
            speaker = %input.speaker,
            sample_rate_hz = audio.sample_rate_hz,
            sample_count = audio.len(),
            "tts model returned audio"
        );

        Ok(audio)
    }
}
