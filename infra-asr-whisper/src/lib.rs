use std::path::Path;

use async_trait::async_trait;
use speech_domain::{DomainError, TranscriptionOutput, TranscriptionPort};
use speech_infra_audio::{decode_audio, resample_linear};

#[cfg(feature = "whisper-runtime")]
mod runtime;

#[cfg(feature = "whisper-runtime")]
pub use runtime::WhisperTranscriptionAdapter;

pub(crate) const SERVICE: &str = "whisper";

/// Sample rate the whisper models are trained on.
pub const WHISPER_SAMPLE_RATE_HZ: u32 = 16_000;

#[derive(Debug, Clone)]
pub struct WhisperAdapterConfig {
    pub model_path: String,
    pub language: String,
    pub threads: usize,
}

impl WhisperAdapterConfig {
    /// `None` means the language is detected from the audio.
    pub fn decode_language(&self) -> Option<String> {
        let normalized = self.language.trim().to_ascii_lowercase();
        if normalized.is_empty() || normalized == "auto" {
            None
        } else {
            Some(normalized)
        }
    }
}

pub const fn whisper_runtime_enabled() -> bool {
    cfg!(feature = "whisper-runtime")
}

/// Reads a staged upload in any supported container and converts it to
/// 16 kHz mono.
pub fn load_whisper_input(path: &Path) -> Result<Vec<f32>, DomainError> {
    let bytes = std::fs::read(path).map_err(|err| {
        DomainError::model_invocation(
            SERVICE,
            format!("failed to read {}: {err}", path.display()),
        )
    })?;
    let extension = path.extension().and_then(|ext| ext.to_str());
    let audio = decode_audio(&bytes, extension).map_err(|err| {
        DomainError::model_invocation(SERVICE, format!("unsupported audio: {err}"))
    })?;
    Ok(resample_linear(
        &audio.samples,
        audio.sample_rate_hz,
        WHISPER_SAMPLE_RATE_HZ,
    ))
}

/// Stand-in used when the binary is built without a speech-to-text runtime.
pub struct UnavailableTranscriber;

#[async_trait]
impl TranscriptionPort for UnavailableTranscriber {
    async fn transcribe(
        &self,
        _path: &Path,
        _beam_width: u32,
    ) -> Result<TranscriptionOutput, DomainError> {
        Err(DomainError::model_invocation(
            SERVICE,
            "speech-to-text runtime is not enabled in this build",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(path: &Path, sample_rate: u32, channels: u16, frames: usize) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).expect("writer");
        for _ in 0..frames * usize::from(channels) {
            writer.write_sample(1_000_i16).expect("sample");
        }
        writer.finalize().expect("finalize");
    }

    #[test]
    fn staged_wav_is_converted_to_16khz_mono() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("clip.wav");
        write_wav(&path, 48_000, 2, 4_800);

        let samples = load_whisper_input(&path).expect("loads");
        assert_eq!(samples.len(), 1_600);
    }

    /// Silent MPEG-1 Layer III frames, 44.1 kHz mono.
    fn write_silent_mp3(path: &Path, frames: usize) {
        let mut bytes = Vec::new();
        for _ in 0..frames {
            let mut frame = vec![0_u8; 417];
            frame[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, 0xC4]);
            bytes.extend(frame);
        }
        std::fs::write(path, bytes).expect("write mp3");
    }

    #[test]
    fn staged_mp3_is_converted_to_16khz_mono() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("voice-note.mp3");
        write_silent_mp3(&path, 12);

        let samples = load_whisper_input(&path).expect("loads mp3");
        // 8+ frames of 1152 samples at 44.1 kHz, resampled to 16 kHz
        assert!(samples.len() >= 1_152 * 8 * 16_000 / 44_100);
        assert!(samples.iter().all(|sample| sample.abs() < 1e-3));
    }

    #[test]
    fn unrecognized_upload_is_a_model_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("clip.bin");
        std::fs::write(&path, b"not audio at all").expect("write");

        let err = load_whisper_input(&path).expect_err("rejects");
        assert!(matches!(err, DomainError::ModelInvocation { .. }));
    }

    #[test]
    fn auto_language_means_detection() {
        let mut config = WhisperAdapterConfig {
            model_path: "models/ggml-base.bin".to_string(),
            language: "auto".to_string(),
            threads: 4,
        };
        assert_eq!(config.decode_language(), None);
        config.language = " RU ".to_string();
        assert_eq!(config.decode_language().as_deref(), Some("ru"));
    }

    #[tokio::test]
    async fn unavailable_transcriber_always_fails() {
        let err = UnavailableTranscriber
            .transcribe(Path::new("/tmp/none.wav"), 5)
            .await
            .expect_err("no runtime");
        assert!(err.to_string().contains("not enabled"));
    }
}
