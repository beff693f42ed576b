use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use speech_domain::{DomainError, TranscriptSegment, TranscriptionOutput, TranscriptionPort};
use whisper_rs::{
    FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters, WhisperState,
};

use crate::{load_whisper_input, WhisperAdapterConfig, SERVICE};

pub struct WhisperTranscriptionAdapter {
    config: Arc<WhisperAdapterConfig>,
    runtime: Arc<Mutex<WhisperRuntime>>,
}

struct WhisperRuntime {
    context: Option<WhisperContext>,
}

impl WhisperTranscriptionAdapter {
    pub fn new(config: WhisperAdapterConfig) -> Self {
        Self {
            config: Arc::new(config),
            runtime: Arc::new(Mutex::new(WhisperRuntime { context: None })),
        }
    }
}

#[async_trait]
impl TranscriptionPort for WhisperTranscriptionAdapter {
    async fn transcribe(
        &self,
        path: &Path,
        beam_width: u32,
    ) -> Result<TranscriptionOutput, DomainError> {
        let config = self.config.clone();
        let runtime = self.runtime.clone();
        let path = path.to_path_buf();

        tokio::task::spawn_blocking(move || decode(&config, &runtime, &path, beam_width))
            .await
            .map_err(|err| DomainError::internal_error(format!("whisper task failed: {err}")))?
    }
}

fn create_state(
    config: &WhisperAdapterConfig,
    runtime: &Mutex<WhisperRuntime>,
) -> Result<WhisperState, DomainError> {
    let mut runtime = runtime
        .lock()
        .map_err(|_| DomainError::internal_error("whisper runtime lock poisoned"))?;

    if runtime.context.is_none() {
        tracing::info!(model_path = %config.model_path, "loading whisper model");
        let context =
            WhisperContext::new_with_params(&config.model_path, WhisperContextParameters::default())
                .map_err(|err| {
                    DomainError::model_invocation(SERVICE, format!("failed to load model: {err}"))
                })?;
        runtime.context = Some(context);
    }

    let context = runtime
        .context
        .as_ref()
        .ok_or_else(|| DomainError::internal_error("whisper context unavailable"))?;

    context.create_state().map_err(|err| {
        DomainError::model_invocation(SERVICE, format!("failed to create state: {err}"))
    })
}

fn decode(
    config: &WhisperAdapterConfig,
    runtime: &Mutex<WhisperRuntime>,
    path: &Path,
    beam_width: u32,
) -> Result<TranscriptionOutput, DomainError> {
    let samples = load_whisper_input(path)?;
    let mut state = create_state(config, runtime)?;

    let decode_language = config.decode_language();
    let mut params = FullParams::new(SamplingStrategy::BeamSearch {
        beam_size: beam_width.max(1) as i32,
        patience: -1.0,
    });
    params.set_n_threads(config.threads as i32);
    params.set_language(Some(decode_language.as_deref().unwrap_or("auto")));
    params.set_no_timestamps(false);
    params.set_single_segment(false);
    params.set_print_realtime(false);
    params.set_print_progress(false);
    params.set_print_timestamps(false);
    params.set_print_special(false);

    state.full(params, &samples).map_err(|err| {
        DomainError::model_invocation(SERVICE, format!("full decode failed: {err}"))
    })?;

    let language = match decode_language {
        Some(language) => language,
        None => detected_language(&state),
    };

    tracing::debug!(
        language = %language,
        beam_width,
        segments = state.full_n_segments(),
        "whisper decode finished"
    );

    Ok(TranscriptionOutput::new(
        language,
        Box::new(SegmentCursor {
            state,
            next: 0,
        }),
    ))
}

fn detected_language(state: &WhisperState) -> String {
    let lang_id = state.full_lang_id_from_state();
    whisper_rs::get_lang_str(lang_id)
        .unwrap_or("unknown")
        .to_string()
}

/// Reads segments out of a finished decode one at a time.
struct SegmentCursor {
    state: WhisperState,
    next: i32,
}

impl Iterator for SegmentCursor {
    type Item = Result<TranscriptSegment, DomainError>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < self.state.full_n_segments() {
            let idx = self.next;
            self.next += 1;
            let Some(segment) = self.state.get_segment(idx) else {
                continue;
            };
            let start_ms = to_ms_10ms_units(segment.start_timestamp()).unwrap_or(0);
            let end_ms = to_ms_10ms_units(segment.end_timestamp()).unwrap_or(start_ms);
            let text = segment.to_str_lossy().map(|cow| cow.into_owned()).map_err(|err| {
                DomainError::model_invocation(SERVICE, format!("segment {idx} unreadable: {err}"))
            });
            return Some(text.map(|text| TranscriptSegment::new(text, start_ms, end_ms)));
        }
        None
    }
}

fn to_ms_10ms_units(raw: i64) -> Option<u64> {
    u64::try_from(raw).ok()?.checked_mul(10)
}
