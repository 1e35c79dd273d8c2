//! Server configuration loading from file and environment variables.

use companion_chat::{GeminiConfig, GenerationOptions, PipelineSettings};
use companion_db::DbRuntimeSettings;
use companion_voice::SynthesizerConfig;
use serde::Deserialize;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Hosted chat model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Speech engine settings.
    #[serde(default)]
    pub voice: SynthesizerConfig,

    /// Audio file locations.
    #[serde(default)]
    pub audio: AudioConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file. Without one the character
    /// service runs without a store.
    #[serde(default)]
    pub path: Option<String>,

    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Maximum number of pooled connections.
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "companion_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// Hosted chat model configuration.
#[derive(Clone, Deserialize)]
pub struct ModelConfig {
    /// Gemini API key. Never logged.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds.
    #[serde(default = "default_model_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Sentence that opens the system instruction.
    #[serde(default = "default_persona")]
    pub persona: String,
}

/// Locations of greeting audio, per-request scratch space and uploaded
/// voice samples.
#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_greeting_dir")]
    pub greeting_dir: PathBuf,

    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    #[serde(default = "default_samples_dir")]
    pub samples_dir: PathBuf,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    3000
}

fn default_busy_timeout_ms() -> u64 {
    DbRuntimeSettings::default().busy_timeout_ms
}

fn default_pool_max_size() -> u32 {
    DbRuntimeSettings::default().pool_max_size
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_model() -> String {
    GeminiConfig::default().model
}

fn default_api_base() -> String {
    GeminiConfig::default().api_base
}

fn default_max_output_tokens() -> u32 {
    GenerationOptions::default().max_output_tokens
}

fn default_temperature() -> f32 {
    GenerationOptions::default().temperature
}

fn default_model_timeout_seconds() -> u64 {
    GeminiConfig::default().timeout_seconds
}

fn default_persona() -> String {
    companion_chat::prompt::DEFAULT_PERSONA.to_string()
}

fn default_greeting_dir() -> PathBuf {
    PathBuf::from("audios")
}

fn default_work_dir() -> PathBuf {
    PathBuf::from("audios/work")
}

fn default_samples_dir() -> PathBuf {
    PathBuf::from("audios/samples")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: default_busy_timeout_ms(),
            pool_max_size: default_pool_max_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            api_base: default_api_base(),
            max_output_tokens: default_max_output_tokens(),
            temperature: default_temperature(),
            timeout_seconds: default_model_timeout_seconds(),
            persona: default_persona(),
        }
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("temperature", &self.temperature)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("persona", &self.persona)
            .finish()
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            greeting_dir: default_greeting_dir(),
            work_dir: default_work_dir(),
            samples_dir: default_samples_dir(),
        }
    }
}

impl DatabaseConfig {
    pub fn runtime_settings(&self) -> DbRuntimeSettings {
        DbRuntimeSettings {
            busy_timeout_ms: self.busy_timeout_ms,
            pool_max_size: self.pool_max_size,
        }
    }
}

impl ModelConfig {
    pub fn gemini(&self) -> GeminiConfig {
        GeminiConfig {
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            api_base: self.api_base.clone(),
            timeout_seconds: self.timeout_seconds,
        }
    }

    pub fn generation(&self) -> GenerationOptions {
        GenerationOptions {
            max_output_tokens: self.max_output_tokens,
            temperature: self.temperature,
            ..GenerationOptions::default()
        }
    }
}

impl Config {
    /// Settings for the chat pipeline, assembled from the model and audio
    /// sections.
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            greeting_dir: self.audio.greeting_dir.clone(),
            work_dir: self.audio.work_dir.clone(),
            persona: self.model.persona.clone(),
            generation: self.model.generation(),
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// An environment override holds a value that cannot be used.
    #[error("invalid value for {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `COMPANION_HOST` overrides `server.host`
/// - `COMPANION_PORT` overrides `server.port`
/// - `COMPANION_DB_PATH` overrides `database.path` (empty disables the store)
/// - `COMPANION_LOG_LEVEL` overrides `logging.level`
/// - `COMPANION_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `GEMINI_API_KEY` overrides `model.api_key`
/// - `COMPANION_MODEL` overrides `model.model`
/// - `COMPANION_TTS_ENGINE` overrides `voice.engine`
/// - `COMPANION_AUDIO_DIR` moves `audio.greeting_dir` and places
///   `work_dir` and `samples_dir` beneath it
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed,
/// or if `COMPANION_TTS_ENGINE` names an unknown engine.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(config, |name| std::env::var(name).ok())
}

/// Applies environment overrides read through `lookup`.
fn apply_env_overrides(
    mut config: Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Config, ConfigError> {
    if let Some(host) = lookup("COMPANION_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Some(port) = lookup("COMPANION_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Some(db_path) = lookup("COMPANION_DB_PATH") {
        config.database.path = Some(db_path).filter(|p| !p.trim().is_empty());
    }
    if let Some(level) = lookup("COMPANION_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = lookup("COMPANION_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Some(key) = lookup("GEMINI_API_KEY") {
        config.model.api_key = key;
    }
    if let Some(model) = lookup("COMPANION_MODEL") {
        config.model.model = model;
    }
    if let Some(engine) = lookup("COMPANION_TTS_ENGINE") {
        config.voice.engine = engine.parse().map_err(|_| ConfigError::InvalidEnv {
            name: "COMPANION_TTS_ENGINE",
            value: engine.clone(),
        })?;
    }
    if let Some(dir) = lookup("COMPANION_AUDIO_DIR") {
        let dir = PathBuf::from(dir);
        config.audio.work_dir = dir.join("work");
        config.audio.samples_dir = dir.join("samples");
        config.audio.greeting_dir = dir;
    }

    Ok(config)
}
