use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use speech_application::ApplicationError;

/// Every failure leaves the service as a 500 with a `detail` message;
/// the variants only differ in how they are logged.
#[derive(Debug)]
pub enum HttpError {
    Rejected { detail: String },
    Internal { kind: &'static str, detail: String },
}

impl HttpError {
    pub fn rejected(detail: impl Into<String>) -> Self {
        HttpError::Rejected {
            detail: detail.into(),
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            HttpError::Rejected { detail } | HttpError::Internal { detail, .. } => detail,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        match &self {
            HttpError::Rejected { detail } => {
                tracing::warn!(detail = %detail, "request rejected");
            }
            HttpError::Internal { kind, detail } => {
                tracing::error!(kind, detail = %detail, "request failed");
            }
        }

        let detail = match self {
            HttpError::Rejected { detail } | HttpError::Internal { detail, .. } => detail,
        };
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": detail })),
        )
            .into_response()
    }
}

pub fn error_mapper(error: ApplicationError) -> HttpError {
    match error {
        ApplicationError::Validation(_) => HttpError::Rejected {
            detail: error.to_string(),
        },
        _ => HttpError::Internal {
            kind: error.kind(),
            detail: error.to_string(),
        },
    }
}
