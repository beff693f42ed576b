use serde::{Deserialize, Serialize};

use speech_domain::TranscriptionResult;

const MAX_EXTENSION_LEN: usize = 8;

/// Raw client upload, fully buffered.
#[derive(Debug, Clone, Default)]
pub struct TranscriptionUpload {
    pub bytes: Vec<u8>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

impl TranscriptionUpload {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Lowercased extension of the client filename, if it looks like one.
    pub fn extension(&self) -> Option<String> {
        let name = self.filename.as_deref()?;
        let (stem, extension) = name.rsplit_once('.')?;
        let valid = !stem.is_empty()
            && (1..=MAX_EXTENSION_LEN).contains(&extension.len())
            && extension.chars().all(|c| c.is_ascii_alphanumeric());
        valid.then(|| extension.to_ascii_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscribeAudioResponse {
    pub text: String,
    pub language: String,
}

impl From<TranscriptionResult> for TranscribeAudioResponse {
    fn from(result: TranscriptionResult) -> Self {
        Self {
            text: result.text,
            language: result.language,
        }
    }
}
