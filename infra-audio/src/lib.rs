mod codec;
mod dsp;
mod probe;

pub use codec::{decode_wav, WavEncoder, WavSampleFormat};
pub use dsp::{downmix_to_mono, resample_linear};
pub use probe::{decode_audio, AudioDecodeError};
