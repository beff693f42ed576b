use std::path::Path;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub use config::ConfigError;

pub type AppConfig = SpeechConfig;

pub const ENV_PREFIX: &str = "SPEECH_SERVICE";
pub const RUN_ENV_VAR: &str = "RUN_ENV";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub service: ServiceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub synthesis: SynthesisConfig,
    #[serde(default)]
    pub transcription: TranscriptionConfig,
    #[serde(default)]
    pub staging: StagingConfig,
    #[serde(default)]
    pub http: HttpLimitsConfig,
}

/// Sample layout of generated WAV files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioEncoding {
    Float32,
    Pcm16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    #[serde(default = "default_tts_model_id")]
    pub model_id: String,
    #[serde(default = "default_speaker")]
    pub default_speaker: String,
    #[serde(default = "default_tts_sample_rate")]
    pub default_sample_rate_hz: u32,
    #[serde(default = "default_tts_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_tts_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_encoding")]
    pub encoding: AudioEncoding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    #[serde(default = "default_model_path")]
    pub model_path: String,
    /// `auto` lets the model detect the spoken language.
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_threads")]
    pub threads: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingConfig {
    /// Falls back to the system temp directory when unset.
    #[serde(default)]
    pub directory: Option<String>,
    #[serde(default = "default_staging_prefix")]
    pub prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpLimitsConfig {
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    #[serde(default = "default_max_json_bytes")]
    pub max_json_bytes: usize,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            service: ServiceConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            model_id: default_tts_model_id(),
            default_speaker: default_speaker(),
            default_sample_rate_hz: default_tts_sample_rate(),
            endpoint: default_tts_endpoint(),
            request_timeout_ms: default_tts_timeout_ms(),
            encoding: default_encoding(),
        }
    }
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            language: default_language(),
            threads: default_threads(),
        }
    }
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            directory: None,
            prefix: default_staging_prefix(),
        }
    }
}

impl Default for HttpLimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: default_max_upload_bytes(),
            max_json_bytes: default_max_json_bytes(),
        }
    }
}

/// Loads configuration from `config/default.toml`, `config/{RUN_ENV}.toml`
/// and `SPEECH_SERVICE__*` environment variables, in that order of precedence.
pub fn load_config() -> Result<SpeechConfig, ConfigError> {
    let run_env = std::env::var(RUN_ENV_VAR).unwrap_or_else(|_| "development".to_string());
    load_config_from(Path::new("config"), &run_env)
}

pub fn load_config_from(dir: &Path, run_env: &str) -> Result<SpeechConfig, ConfigError> {
    Config::builder()
        .add_source(Config::try_from(&SpeechConfig::default())?)
        .add_source(File::from(dir.join("default")).required(false))
        .add_source(File::from(dir.join(run_env)).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

/// Installs the global tracing subscriber. `RUST_LOG` takes precedence over
/// the configured level. Later calls are ignored.
pub fn setup_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new(default_log_level()));

    let installed = match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true))
            .try_init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .try_init(),
    };

    if installed.is_ok() {
        tracing::debug!(level = %config.level, format = ?config.format, "logging initialized");
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Text
}

fn default_tts_model_id() -> String {
    "v4_ru".to_string()
}

fn default_speaker() -> String {
    "xenia".to_string()
}

fn default_tts_sample_rate() -> u32 {
    48_000
}

fn default_tts_endpoint() -> String {
    "http://127.0.0.1:9000/synthesize".to_string()
}

fn default_tts_timeout_ms() -> u64 {
    60_000
}

fn default_encoding() -> AudioEncoding {
    AudioEncoding::Float32
}

fn default_model_path() -> String {
    "models/ggml-base.bin".to_string()
}

fn default_language() -> String {
    "auto".to_string()
}

fn default_threads() -> usize {
    4
}

fn default_staging_prefix() -> String {
    "speech-upload-".to_string()
}

fn default_max_upload_bytes() -> usize {
    64 * 1024 * 1024
}

fn default_max_json_bytes() -> usize {
    1024 * 1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_are_deterministic() {
        let cfg = SpeechConfig::default();
        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.server.address(), "0.0.0.0:8000");
        assert_eq!(cfg.service.synthesis.default_speaker, "xenia");
        assert_eq!(cfg.service.synthesis.default_sample_rate_hz, 48_000);
        assert_eq!(cfg.service.synthesis.model_id, "v4_ru");
        assert_eq!(cfg.service.synthesis.encoding, AudioEncoding::Float32);
        assert_eq!(cfg.service.transcription.language, "auto");
        assert!(cfg.service.staging.directory.is_none());
    }

    #[test]
    fn files_layer_over_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("default.toml"),
            "[service.synthesis]\ndefault_speaker = \"baya\"\nencoding = \"pcm16\"\n",
        )
        .expect("write default");
        std::fs::write(
            dir.path().join("staging.toml"),
            "[service.synthesis]\ndefault_speaker = \"kseniya\"\n[logging]\nformat = \"json\"\n",
        )
        .expect("write env file");

        let cfg = load_config_from(dir.path(), "staging").expect("config loads");

        assert_eq!(cfg.service.synthesis.default_speaker, "kseniya");
        assert_eq!(cfg.service.synthesis.encoding, AudioEncoding::Pcm16);
        assert_eq!(cfg.logging.format, LogFormat::Json);
        assert_eq!(cfg.service.synthesis.default_sample_rate_hz, 48_000);
    }

    #[test]
    fn missing_files_fall_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = load_config_from(dir.path(), "production").expect("config loads");
        assert_eq!(cfg.service.synthesis.model_id, "v4_ru");
        assert_eq!(cfg.service.http.max_upload_bytes, 64 * 1024 * 1024);
    }
}
