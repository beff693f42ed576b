use std::{path::Path, sync::Arc};

use async_trait::async_trait;

use speech_domain::{DomainError, StagingPort, TranscriptionPort, TranscriptionResult};

use crate::{ApplicationError, TranscribeAudioResponse, TranscriptAssembler, TranscriptionUpload};

pub const TRANSCRIPTION_BEAM_WIDTH: u32 = 5;

#[async_trait]
pub trait TranscriptionUseCase: Send + Sync {
    async fn transcribe(
        &self,
        upload: TranscriptionUpload,
    ) -> Result<TranscribeAudioResponse, ApplicationError>;
}

pub struct TranscriptionUseCaseImpl {
    staging: Arc<dyn StagingPort>,
    transcription: Arc<dyn TranscriptionPort>,
    beam_width: u32,
}

impl TranscriptionUseCaseImpl {
    pub fn new(staging: Arc<dyn StagingPort>, transcription: Arc<dyn TranscriptionPort>) -> Self {
        Self {
            staging,
            transcription,
            beam_width: TRANSCRIPTION_BEAM_WIDTH,
        }
    }

    async fn transcribe_staged(&self, path: &Path) -> Result<TranscriptionResult, DomainError> {
        let output = self.transcription.transcribe(path, self.beam_width).await?;
        let language = output.language;
        let text = TranscriptAssembler::try_assemble(output.segments)?;
        Ok(TranscriptionResult { text, language })
    }
}

#[async_trait]
impl TranscriptionUseCase for TranscriptionUseCaseImpl {
    async fn transcribe(
        &self,
        upload: TranscriptionUpload,
    ) -> Result<TranscribeAudioResponse, ApplicationError> {
        if upload.is_empty() {
            return Err(ApplicationError::Validation(
                "uploaded audio file is empty".to_string(),
            ));
        }

        tracing::debug!(
            upload_bytes = upload.len(),
            filename = upload.filename.as_deref().unwrap_or("unnamed"),
            content_type = upload.content_type.as_deref().unwrap_or("unknown"),
            "staging upload for transcription"
        );

        let extension = upload.extension();
        let mut staged = self
            .staging
            .stage(&upload.bytes, extension.as_deref())
            .map_err(|err| {
                tracing::error!(error = %err, "failed to stage upload");
                ApplicationError::Transcription(err)
            })?;
        drop(upload);

        let outcome = self.transcribe_staged(staged.path()).await;
        let released = staged.release();

        match (outcome, released) {
            (Ok(result), Ok(())) => {
                if result.text.is_empty() {
                    tracing::warn!(language = %result.language, "transcription produced no text");
                }
                tracing::debug!(
                    language = %result.language,
                    text_chars = result.text.chars().count(),
                    "transcription completed"
                );
                Ok(result.into())
            }
            (Ok(_), Err(release_err)) => {
                tracing::error!(error = %release_err, "failed to remove staged upload");
                Err(ApplicationError::Transcription(release_err))
            }
            (Err(err), released) => {
                if let Err(release_err) = released {
                    tracing::error!(error = %release_err, "failed to remove staged upload");
                }
                tracing::error!(error = %err, "transcription model failed");
                Err(ApplicationError::Transcription(err))
            }
        }
    }
}
