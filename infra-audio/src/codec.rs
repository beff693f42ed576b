use std::io::Cursor;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use speech_domain::{AudioEncoder, AudioSamples, DomainError, EncodedAudio};

use crate::downmix_to_mono;

const RIFF_HEADER_BYTES: usize = 44;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WavSampleFormat {
    /// 32-bit IEEE float samples, written as produced.
    #[default]
    Float32,
    /// 16-bit signed PCM, samples clamped to [-1.0, 1.0].
    Pcm16,
}

impl WavSampleFormat {
    fn spec(self, sample_rate_hz: u32) -> WavSpec {
        match self {
            WavSampleFormat::Float32 => WavSpec {
                channels: 1,
                sample_rate: sample_rate_hz,
                bits_per_sample: 32,
                sample_format: SampleFormat::Float,
            },
            WavSampleFormat::Pcm16 => WavSpec {
                channels: 1,
                sample_rate: sample_rate_hz,
                bits_per_sample: 16,
                sample_format: SampleFormat::Int,
            },
        }
    }

    fn bytes_per_sample(self) -> usize {
        match self {
            WavSampleFormat::Float32 => 4,
            WavSampleFormat::Pcm16 => 2,
        }
    }
}

/// Serializes mono samples into an in-memory RIFF/WAVE container.
#[derive(Debug, Clone, Default)]
pub struct WavEncoder {
    format: WavSampleFormat,
}

impl WavEncoder {
    pub fn new(format: WavSampleFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> WavSampleFormat {
        self.format
    }

    fn write(&self, audio: &AudioSamples) -> Result<Vec<u8>, hound::Error> {
        let capacity = RIFF_HEADER_BYTES + audio.len() * self.format.bytes_per_sample();
        let mut cursor = Cursor::new(Vec::with_capacity(capacity));
        {
            let mut writer = WavWriter::new(&mut cursor, self.format.spec(audio.sample_rate_hz))?;
            match self.format {
                WavSampleFormat::Float32 => {
                    for &sample in &audio.samples {
                        writer.write_sample(sample)?;
                    }
                }
                WavSampleFormat::Pcm16 => {
                    for &sample in &audio.samples {
                        let value = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
                        writer.write_sample(value)?;
                    }
                }
            }
            writer.finalize()?;
        }
        Ok(cursor.into_inner())
    }
}

impl AudioEncoder for WavEncoder {
    fn encode(&self, audio: &AudioSamples) -> Result<EncodedAudio, DomainError> {
        if audio.sample_rate_hz == 0 {
            return Err(DomainError::encoding("sample rate must be positive"));
        }
        if audio.is_empty() {
            return Err(DomainError::encoding("no samples to encode"));
        }
        if audio.samples.iter().any(|sample| !sample.is_finite()) {
            return Err(DomainError::encoding("samples contain non-finite values"));
        }

        let bytes = self
            .write(audio)
            .map_err(|err| DomainError::encoding(err.to_string()))?;

        tracing::debug!(
            format = ?self.format,
            sample_rate_hz = audio.sample_rate_hz,
            sample_count = audio.len(),
            encoded_bytes = bytes.len(),
            "encoded wav"
        );

        Ok(EncodedAudio::wav(bytes))
    }
}

/// Parses a WAV container and returns its samples downmixed to mono,
/// normalized to [-1.0, 1.0].
pub fn decode_wav(bytes: &[u8]) -> Result<AudioSamples, hound::Error> {
    let mut reader = WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                return Err(hound::Error::Unsupported);
            }
            let scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|sample| sample.map(|value| value as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    Ok(AudioSamples::new(
        downmix_to_mono(&interleaved, spec.channels),
        spec.sample_rate,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(sample_rate_hz: u32) -> AudioSamples {
        let samples = (0..480)
            .map(|i| (i as f32 / 480.0 * std::f32::consts::TAU).sin() * 0.5)
            .collect();
        AudioSamples::new(samples, sample_rate_hz)
    }

    #[test]
    fn float_wav_preserves_samples_and_rate() {
        let audio = tone(48_000);
        let encoded = WavEncoder::default().encode(&audio).expect("encodes");

        assert_eq!(encoded.content_type(), "audio/wav");
        assert_eq!(&encoded.bytes()[..4], b"RIFF");
        assert_eq!(&encoded.bytes()[8..12], b"WAVE");

        let decoded = decode_wav(encoded.bytes()).expect("decodes");
        assert_eq!(decoded.sample_rate_hz, 48_000);
        assert_eq!(decoded.samples, audio.samples);
    }

    #[test]
    fn pcm16_wav_clamps_out_of_range_samples() {
        let audio = AudioSamples::new(vec![2.0, -2.0, 0.0], 8_000);
        let encoded = WavEncoder::new(WavSampleFormat::Pcm16)
            .encode(&audio)
            .expect("encodes");

        let reader = WavReader::new(Cursor::new(encoded.bytes())).expect("reader");
        assert_eq!(reader.spec().bits_per_sample, 16);
        let values: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<Result<_, _>>()
            .expect("samples");
        assert_eq!(values, vec![i16::MAX, -i16::MAX, 0]);
    }

    #[test]
    fn pcm16_wav_round_trips_within_quantization_step() {
        let audio = tone(24_000);
        let encoded = WavEncoder::new(WavSampleFormat::Pcm16)
            .encode(&audio)
            .expect("encodes");

        let decoded = decode_wav(encoded.bytes()).expect("decodes");
        assert_eq!(decoded.sample_rate_hz, 24_000);
        assert_eq!(decoded.len(), audio.len());
        let tolerance = 2.0 / f32::from(i16::MAX);
        for (original, restored) in audio.samples.iter().zip(&decoded.samples) {
            assert!((original - restored).abs() <= tolerance, "{original} vs {restored}");
        }
    }

    #[test]
    fn stereo_pcm_is_decoded_to_mono() {
        let spec = WavSpec {
            channels: 2,
            sample_rate: 16_000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).expect("writer");
            for value in [16_384_i16, 0, -16_384, -16_384] {
                writer.write_sample(value).expect("sample");
            }
            writer.finalize().expect("finalize");
        }

        let decoded = decode_wav(&cursor.into_inner()).expect("decodes");
        assert_eq!(decoded.sample_rate_hz, 16_000);
        assert_eq!(decoded.samples, vec![0.25, -0.5]);
    }

    #[test]
    fn empty_or_rateless_audio_is_an_encoding_error() {
        let encoder = WavEncoder::default();
        let empty = encoder.encode(&AudioSamples::new(Vec::new(), 48_000));
        let rateless = encoder.encode(&AudioSamples::new(vec![0.1], 0));
        let nan = encoder.encode(&AudioSamples::new(vec![f32::NAN], 48_000));

        assert!(matches!(empty, Err(DomainError::Encoding(_))));
        assert!(matches!(rateless, Err(DomainError::Encoding(_))));
        assert!(matches!(nan, Err(DomainError::Encoding(_))));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(decode_wav(b"definitely not a wav").is_err());
    }
}
