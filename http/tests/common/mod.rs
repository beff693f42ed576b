use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use reqwest::Client;
use tempfile::TempDir;
use tokio::net::TcpListener;

use speech_application::{SynthesisDefaults, SynthesisUseCaseImpl, TranscriptionUseCaseImpl};
use speech_domain::{
    AudioSamples, DomainError, SynthesisInput, SynthesisPort, TranscriptSegment,
    TranscriptionOutput, TranscriptionPort,
};
use speech_http_server::{create_router, AppState, BodyLimits};
use speech_infra_audio::WavEncoder;
use speech_infra_staging::TempFileStagingStore;

pub struct MockSynthesisPort;

#[async_trait]
impl SynthesisPort for MockSynthesisPort {
    async fn synthesize(&self, input: SynthesisInput) -> Result<AudioSamples, DomainError> {
        if input.speaker == "nobody" {
            return Err(DomainError::model_invocation(
                "tts",
                format!("unknown speaker: {}", input.speaker),
            ));
        }
        Ok(AudioSamples::new(vec![0.1; 4_800], input.sample_rate_hz))
    }
}

/// Reads the staged file, so a missing or wrong path fails the request.
pub struct MockTranscriptionPort;

#[async_trait]
impl TranscriptionPort for MockTranscriptionPort {
    async fn transcribe(
        &self,
        path: &Path,
        beam_width: u32,
    ) -> Result<TranscriptionOutput, DomainError> {
        assert_eq!(beam_width, 5);
        let bytes = std::fs::read(path)
            .map_err(|err| DomainError::model_invocation("whisper", err.to_string()))?;
        if bytes.starts_with(b"FAIL") {
            return Err(DomainError::model_invocation("whisper", "corrupt audio"));
        }
        Ok(TranscriptionOutput::from_segments(
            "ru",
            vec![
                TranscriptSegment::new(" Привет", 0, 500),
                TranscriptSegment::new(" мир", 500, 900),
            ],
        ))
    }
}

pub struct TestServer {
    pub base_url: String,
    pub client: Client,
    pub staging_dir: TempDir,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn staged_files(&self) -> usize {
        std::fs::read_dir(self.staging_dir.path())
            .expect("read staging dir")
            .count()
    }
}

pub async fn setup_test_server() -> TestServer {
    let staging_dir = tempfile::tempdir().expect("tempdir");

    let synthesis = Arc::new(SynthesisUseCaseImpl::new(
        Arc::new(MockSynthesisPort),
        Arc::new(WavEncoder::default()),
        SynthesisDefaults {
            speaker: "xenia".to_string(),
            sample_rate_hz: 48_000,
        },
    ));
    let transcription = Arc::new(TranscriptionUseCaseImpl::new(
        Arc::new(TempFileStagingStore::new(
            Some(staging_dir.path().to_path_buf()),
            "speech-upload-",
        )),
        Arc::new(MockTranscriptionPort),
    ));

    let router = create_router(
        AppState::new(synthesis, transcription),
        BodyLimits::default(),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });

    TestServer {
        base_url: format!("http://{addr}"),
        client: Client::new(),
        staging_dir,
    }
}
