mod synthesis;
mod transcription;

pub use synthesis::*;
pub use transcription::*;
