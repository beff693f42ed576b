use std::io::{Cursor, ErrorKind};

use symphonia::core::{
    audio::SampleBuffer,
    codecs::DecoderOptions,
    errors::Error as SymphoniaError,
    formats::FormatOptions,
    io::MediaSourceStream,
    meta::MetadataOptions,
    probe::Hint,
};

use speech_domain::AudioSamples;

use crate::downmix_to_mono;

#[derive(Debug, thiserror::Error)]
pub enum AudioDecodeError {
    #[error("unrecognized audio container: {0}")]
    Probe(String),
    #[error("no decodable audio track")]
    NoTrack,
    #[error("unknown sample rate")]
    UnknownSampleRate,
    #[error("unsupported codec: {0}")]
    Codec(String),
    #[error("failed to read audio packet: {0}")]
    Packet(String),
    #[error("audio contains no samples")]
    Empty,
}

/// Probes the container (WAV, MP3, Ogg/Vorbis, FLAC, WebM, MP4/AAC...) and
/// decodes its default track to mono at the source sample rate.
///
/// `extension` is only a hint; the content itself decides the format.
pub fn decode_audio(
    bytes: &[u8],
    extension: Option<&str>,
) -> Result<AudioSamples, AudioDecodeError> {
    let source = MediaSourceStream::new(
        Box::new(Cursor::new(bytes.to_vec())),
        Default::default(),
    );

    let mut hint = Hint::new();
    if let Some(extension) = extension {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            source,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|err| AudioDecodeError::Probe(err.to_string()))?;
    let mut format = probed.format;

    let track = format.default_track().ok_or(AudioDecodeError::NoTrack)?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let sample_rate_hz = codec_params
        .sample_rate
        .ok_or(AudioDecodeError::UnknownSampleRate)?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|err| AudioDecodeError::Codec(err.to_string()))?;

    let mut samples = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(err)) if err.kind() == ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(err) => return Err(AudioDecodeError::Packet(err.to_string())),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(reason)) => {
                tracing::warn!(reason, "skipping corrupt audio frame");
                continue;
            }
            Err(err) => return Err(AudioDecodeError::Packet(err.to_string())),
        };
        if decoded.frames() == 0 {
            continue;
        }

        let spec = *decoded.spec();
        let channels = u16::try_from(spec.channels.count()).unwrap_or(u16::MAX);
        let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buffer.copy_interleaved_ref(decoded);
        samples.extend(downmix_to_mono(buffer.samples(), channels));
    }

    if samples.is_empty() {
        return Err(AudioDecodeError::Empty);
    }

    tracing::debug!(
        sample_rate_hz,
        sample_count = samples.len(),
        "decoded uploaded audio"
    );

    Ok(AudioSamples::new(samples, sample_rate_hz))
}
