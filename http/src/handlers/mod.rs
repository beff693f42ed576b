mod health;
mod speech;

pub use health::health_check;
pub use speech::{generate_speech, transcribe_audio};
