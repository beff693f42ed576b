pub mod assembler;
pub mod dto;
pub mod error;
pub mod usecase;

pub use assembler::TranscriptAssembler;
pub use dto::*;
pub use error::*;
pub use usecase::{
    SynthesisDefaults, SynthesisUseCase, SynthesisUseCaseImpl, TranscriptionUseCase,
    TranscriptionUseCaseImpl, TRANSCRIPTION_BEAM_WIDTH,
};
