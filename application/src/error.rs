use speech_domain::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("speech synthesis failed: {0}")]
    Synthesis(#[source] DomainError),

    #[error("transcription failed: {0}")]
    Transcription(#[source] DomainError),
}

impl ApplicationError {
    /// Stable label for the underlying failure, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ApplicationError::Validation(_) => "validation",
            ApplicationError::Synthesis(cause) | ApplicationError::Transcription(cause) => {
                match cause {
                    DomainError::Validation(_) => "validation",
                    DomainError::Staging(_) => "staging",
                    DomainError::ModelInvocation { .. } => "model_invocation",
                    DomainError::Encoding(_) => "encoding",
                    DomainError::Internal(_) => "internal",
                }
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApplicationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApplicationError::Validation(errors.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_the_wrapped_cause() {
        let staging = ApplicationError::Transcription(DomainError::staging("disk full"));
        let model = ApplicationError::Synthesis(DomainError::model_invocation("tts", "boom"));

        assert_eq!(staging.kind(), "staging");
        assert_eq!(model.kind(), "model_invocation");
        assert_eq!(ApplicationError::Validation("x".into()).kind(), "validation");
        assert_eq!(
            model.to_string(),
            "speech synthesis failed: tts invocation failed: boom"
        );
    }
}
