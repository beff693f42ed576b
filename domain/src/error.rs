use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("staging failed: {0}")]
    Staging(String),

    #[error("{service} invocation failed: {message}")]
    ModelInvocation { service: String, message: String },

    #[error("encoding failed: {0}")]
    Encoding(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn staging(message: impl Into<String>) -> Self {
        Self::Staging(message.into())
    }

    pub fn model_invocation(service: &str, message: impl Into<String>) -> Self {
        Self::ModelInvocation {
            service: service.to_string(),
            message: message.into(),
        }
    }

    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding(message.into())
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}
