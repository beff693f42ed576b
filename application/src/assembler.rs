use std::convert::Infallible;

use speech_domain::TranscriptSegment;

/// Joins transcript segments, in order, into a single line of text.
///
/// Each segment is trimmed and separated from the next by exactly one space;
/// blank segments are skipped. An empty sequence yields an empty string.
pub struct TranscriptAssembler;

impl TranscriptAssembler {
    pub fn assemble<I>(segments: I) -> String
    where
        I: IntoIterator<Item = TranscriptSegment>,
    {
        match Self::try_assemble(segments.into_iter().map(Ok::<_, Infallible>)) {
            Ok(text) => text,
            Err(never) => match never {},
        }
    }

    /// Drains a fallible segment sequence, stopping at the first error.
    pub fn try_assemble<I, E>(segments: I) -> Result<String, E>
    where
        I: IntoIterator<Item = Result<TranscriptSegment, E>>,
    {
        let mut transcript = String::new();
        for segment in segments {
            let segment = segment?;
            let part = segment.text.trim();
            if part.is_empty() {
                continue;
            }
            if !transcript.is_empty() {
                transcript.push(' ');
            }
            transcript.push_str(part);
        }
        Ok(transcript)
    }
}
