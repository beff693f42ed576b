use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Json, Response},
};

use speech_application::{SynthesizeSpeechRequest, TranscribeAudioResponse};

use crate::{
    error::{error_mapper, HttpError},
    extract::{AudioUpload, ValidatedJson},
    AppState,
};

pub async fn generate_speech(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SynthesizeSpeechRequest>,
) -> Result<Response, HttpError> {
    tracing::info!(
        text_chars = request.text.chars().count(),
        speaker = request.speaker.as_deref().unwrap_or("default"),
        sample_rate = ?request.sample_rate,
        "received generate request"
    );

    let audio = state
        .synthesis
        .synthesize(request)
        .await
        .map_err(error_mapper)?;

    tracing::info!(encoded_bytes = audio.len(), "generate request completed");

    let content_type = audio.content_type();
    Ok((StatusCode::OK, [(CONTENT_TYPE, content_type)], audio.into_bytes()).into_response())
}

pub async fn transcribe_audio(
    State(state): State<AppState>,
    AudioUpload(upload): AudioUpload,
) -> Result<(StatusCode, Json<TranscribeAudioResponse>), HttpError> {
    tracing::info!(
        upload_bytes = upload.len(),
        filename = upload.filename.as_deref().unwrap_or("unnamed"),
        "received transcribe request"
    );

    let response = state
        .transcription
        .transcribe(upload)
        .await
        .map_err(error_mapper)?;

    tracing::info!(
        language = %response.language,
        text_chars = response.text.chars().count(),
        "transcribe request completed"
    );

    Ok((StatusCode::OK, Json(response)))
}
