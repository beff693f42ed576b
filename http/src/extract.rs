use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use speech_application::TranscriptionUpload;

use crate::HttpError;

const UPLOAD_FIELD: &str = "file";

/// JSON body that has passed `validator` rules.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(request, state)
            .await
            .map_err(|rejection| HttpError::rejected(rejection.body_text()))?;
        value
            .validate()
            .map_err(|errors| HttpError::rejected(errors.to_string()))?;
        Ok(ValidatedJson(value))
    }
}

/// Audio sent either as a multipart form (field `file`, or else the first
/// file part) or as the raw request body.
pub struct AudioUpload(pub TranscriptionUpload);

impl<S> FromRequest<S> for AudioUpload
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let is_multipart = content_type
            .as_deref()
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(request, state)
                .await
                .map_err(|rejection| HttpError::rejected(rejection.body_text()))?;
            return read_multipart(multipart).await.map(AudioUpload);
        }

        let bytes = Bytes::from_request(request, state)
            .await
            .map_err(|rejection| HttpError::rejected(rejection.body_text()))?;
        Ok(AudioUpload(TranscriptionUpload {
            bytes: bytes.to_vec(),
            filename: None,
            content_type,
        }))
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<TranscriptionUpload, HttpError> {
    let mut fallback: Option<TranscriptionUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| HttpError::rejected(format!("failed to parse multipart form: {err}")))?
    {
        let is_upload_field = field.name() == Some(UPLOAD_FIELD);
        if !is_upload_field && (field.file_name().is_none() || fallback.is_some()) {
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|err| HttpError::rejected(format!("failed to read audio data: {err}")))?;
        let upload = TranscriptionUpload {
            bytes: bytes.to_vec(),
            filename,
            content_type,
        };

        if is_upload_field {
            return Ok(upload);
        }
        fallback = Some(upload);
    }

    fallback.ok_or_else(|| HttpError::rejected("missing 'file' field in multipart form"))
}
