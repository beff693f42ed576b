mod synthesize;
mod transcribe;

pub use synthesize::{SynthesisDefaults, SynthesisUseCase, SynthesisUseCaseImpl};
pub use transcribe::{TranscriptionUseCase, TranscriptionUseCaseImpl, TRANSCRIPTION_BEAM_WIDTH};
