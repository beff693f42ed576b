use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use speech_application::{SynthesisUseCase, TranscriptionUseCase};

pub mod error;
pub mod extract;
pub mod handlers;
pub mod observability;

pub use error::{error_mapper, HttpError};
pub use extract::{AudioUpload, ValidatedJson};
pub use handlers::*;

#[derive(Clone)]
pub struct AppState {
    pub synthesis: Arc<dyn SynthesisUseCase>,
    pub transcription: Arc<dyn TranscriptionUseCase>,
}

impl AppState {
    pub fn new(
        synthesis: Arc<dyn SynthesisUseCase>,
        transcription: Arc<dyn TranscriptionUseCase>,
    ) -> Self {
        Self {
            synthesis,
            transcription,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BodyLimits {
    pub max_upload_bytes: usize,
    pub max_json_bytes: usize,
}

impl Default for BodyLimits {
    fn default() -> Self {
        Self {
            max_upload_bytes: 64 * 1024 * 1024,
            max_json_bytes: 1024 * 1024,
        }
    }
}

pub fn create_router(state: AppState, limits: BodyLimits) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Uploads are buffered whole before staging, so the limit bounds memory per request.
    let transcribe_route =
        post(transcribe_audio).layer(DefaultBodyLimit::max(limits.max_upload_bytes));
    let generate_route = post(generate_speech).layer(DefaultBodyLimit::max(limits.max_json_bytes));

    Router::new()
        .route("/health", get(health_check))
        .route("/generate", generate_route)
        .route("/transcribe", transcribe_route)
        .layer(middleware::from_fn(observability::request_id_middleware))
        .layer(trace_layer)
        .with_state(state)
}
