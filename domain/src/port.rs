use std::path::Path;

use async_trait::async_trait;

use crate::{AudioSamples, DomainError, EncodedAudio, SynthesisInput, TranscriptionOutput};

#[async_trait]
pub trait SynthesisPort: Send + Sync {
    async fn synthesize(&self, input: SynthesisInput) -> Result<AudioSamples, DomainError>;
}

/// Speech-to-text collaborator. It only reads audio from the filesystem.
#[async_trait]
pub trait TranscriptionPort: Send + Sync {
    async fn transcribe(
        &self,
        path: &Path,
        beam_width: u32,
    ) -> Result<TranscriptionOutput, DomainError>;
}

pub trait AudioEncoder: Send + Sync {
    fn encode(&self, audio: &AudioSamples) -> Result<EncodedAudio, DomainError>;
}

/// A staged upload on disk. Dropping the artifact deletes it as well.
pub trait StagedArtifact: Send + Sync {
    fn path(&self) -> &Path;

    /// Deletes the artifact. Calling it again after success is a no-op.
    fn release(&mut self) -> Result<(), DomainError>;
}

pub trait StagingPort: Send + Sync {
    /// `extension` (without the dot) is appended to the artifact name.
    fn stage(
        &self,
        bytes: &[u8],
        extension: Option<&str>,
    ) -> Result<Box<dyn StagedArtifact>, DomainError>;
}
