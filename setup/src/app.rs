use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Error};
use axum::Router;
use tokio::net::TcpListener;

use speech_application::{
    SynthesisDefaults, SynthesisUseCase, SynthesisUseCaseImpl, TranscriptionUseCase,
    TranscriptionUseCaseImpl,
};
use speech_configuration::{AppConfig, AudioEncoding};
use speech_domain::TranscriptionPort;
use speech_http_server::{create_router, AppState, BodyLimits};
use speech_infra_audio::{WavEncoder, WavSampleFormat};
use speech_infra_staging::TempFileStagingStore;
use speech_infra_tts_rest::RestSynthesisAdapter;

pub async fn build_and_run(config: AppConfig) -> Result<(), Error> {
    let app = Application::new(config).await?;
    app.run().await
}

pub struct Application {
    pub config: AppConfig,
    pub state: AppState,
}

impl Application {
    pub async fn new(config: AppConfig) -> Result<Self, Error> {
        log_transcription_backend();

        let synthesis_config = &config.service.synthesis;
        tracing::info!(
            model_id = %synthesis_config.model_id,
            endpoint = %synthesis_config.endpoint,
            default_speaker = %synthesis_config.default_speaker,
            default_sample_rate_hz = synthesis_config.default_sample_rate_hz,
            encoding = ?synthesis_config.encoding,
            transcription_model = %config.service.transcription.model_path,
            "initializing speech application"
        );

        let synthesis_port = RestSynthesisAdapter::new(
            synthesis_config.endpoint.clone(),
            synthesis_config.model_id.clone(),
            Duration::from_millis(synthesis_config.request_timeout_ms),
        )
        .context("failed to build synthesis client")?;
        let encoder = WavEncoder::new(match synthesis_config.encoding {
            AudioEncoding::Float32 => WavSampleFormat::Float32,
            AudioEncoding::Pcm16 => WavSampleFormat::Pcm16,
        });
        let synthesis: Arc<dyn SynthesisUseCase> = Arc::new(SynthesisUseCaseImpl::new(
            Arc::new(synthesis_port),
            Arc::new(encoder),
            SynthesisDefaults {
                speaker: synthesis_config.default_speaker.clone(),
                sample_rate_hz: synthesis_config.default_sample_rate_hz,
            },
        ));

        let staging_config = &config.service.staging;
        let staging = TempFileStagingStore::new(
            staging_config.directory.as_ref().map(PathBuf::from),
            staging_config.prefix.clone(),
        );
        let transcription: Arc<dyn TranscriptionUseCase> = Arc::new(
            TranscriptionUseCaseImpl::new(Arc::new(staging), transcription_port(&config)),
        );

        let state = AppState::new(synthesis, transcription);
        Ok(Self { config, state })
    }

    pub fn router(&self) -> Router {
        let limits = &self.config.service.http;
        create_router(
            self.state.clone(),
            BodyLimits {
                max_upload_bytes: limits.max_upload_bytes,
                max_json_bytes: limits.max_json_bytes,
            },
        )
    }

    pub async fn run(self) -> Result<(), Error> {
        let address = self.config.server.address();
        let listener = TcpListener::bind(&address)
            .await
            .with_context(|| format!("failed to bind {address}"))?;
        self.run_with_listener(listener).await
    }

    pub async fn run_with_listener(self, listener: TcpListener) -> Result<(), Error> {
        let local_addr: SocketAddr = listener.local_addr()?;
        tracing::info!(address = %local_addr, "starting speech HTTP routes");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|err| anyhow::anyhow!("server failed: {err}"))?;

        tracing::info!("speech HTTP routes stopped");
        Ok(())
    }
}

#[cfg(feature = "whisper-runtime")]
fn transcription_port(config: &AppConfig) -> Arc<dyn TranscriptionPort> {
    use speech_infra_asr_whisper::{WhisperAdapterConfig, WhisperTranscriptionAdapter};

    let transcription = &config.service.transcription;
    Arc::new(WhisperTranscriptionAdapter::new(WhisperAdapterConfig {
        model_path: transcription.model_path.clone(),
        language: transcription.language.clone(),
        threads: transcription.threads,
    }))
}

#[cfg(not(feature = "whisper-runtime"))]
fn transcription_port(_config: &AppConfig) -> Arc<dyn TranscriptionPort> {
    Arc::new(speech_infra_asr_whisper::UnavailableTranscriber)
}

fn log_transcription_backend() {
    if !speech_infra_asr_whisper::whisper_runtime_enabled() {
        tracing::warn!(
            "service compiled without `whisper-runtime`; /transcribe will fail until it is enabled"
        );
        return;
    }
    #[cfg(feature = "whisper-cuda")]
    tracing::info!("whisper backend: CUDA");
    #[cfg(feature = "whisper-vulkan")]
    tracing::info!("whisper backend: Vulkan");
    #[cfg(not(any(feature = "whisper-cuda", feature = "whisper-vulkan")))]
    tracing::info!("whisper backend: CPU");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
