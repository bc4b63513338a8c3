use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};
use url::Url;

pub const DEFAULT_MAX_RECORDS: usize = 1000;
pub const DEFAULT_SUMMARY_INTERVAL_SECS: u64 = 30 * 60;
pub const DEFAULT_AUDIO_SAMPLE_RATE_HZ: u32 = 48_000;
pub const DEFAULT_BLOCK_SIZE: usize = 2048;
pub const DEFAULT_SPEECH_ENDPOINT: &str = "https://speech.googleapis.com/v1/speech:recognize";
pub const DEFAULT_SPEECH_LANGUAGE: &str = "zh-CN";
pub const DEFAULT_SPEECH_SAMPLE_RATE_HZ: u32 = 16_000;
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 100;
pub const ENV_GOOGLE_SPEECH_API_KEY: &str = "GOOGLE_SPEECH_API_KEY";
pub const ENV_SPEECH_LANGUAGE: &str = "WELLNESS_SPEECH_LANGUAGE";
pub const ENV_SPEECH_ENDPOINT: &str = "WELLNESS_SPEECH_ENDPOINT";

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, ConfigError> {
        let v = value.into();
        if v.trim().is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        Ok(Self(v))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(**redacted**)")
    }
}

/// Bounds and reporting cadence of the in-memory emotion history.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryConfig {
    pub max_records: usize,
    pub summary_interval: Duration,
}

impl HistoryConfig {
    pub fn new(max_records: usize, summary_interval: Duration) -> Result<Self, ConfigError> {
        if max_records == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if summary_interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(Self {
            max_records,
            summary_interval,
        })
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_records: DEFAULT_MAX_RECORDS,
            summary_interval: Duration::from_secs(DEFAULT_SUMMARY_INTERVAL_SECS),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AudioConfig {
    pub sample_rate_hz: u32,
    pub block_size: usize,
}

impl AudioConfig {
    pub fn new(sample_rate_hz: u32, block_size: usize) -> Result<Self, ConfigError> {
        if sample_rate_hz == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        if block_size == 0 {
            return Err(ConfigError::ZeroBlockSize);
        }
        Ok(Self {
            sample_rate_hz,
            block_size,
        })
    }

    pub fn block_duration(&self) -> Duration {
        let nanos = (self.block_size as u64).saturating_mul(1_000_000_000);
        Duration::from_nanos(nanos / u64::from(self.sample_rate_hz))
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: DEFAULT_AUDIO_SAMPLE_RATE_HZ,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpeechConfig {
    pub endpoint: Url,
    pub language_code: String,
    pub sample_rate_hz: u32,
    pub api_key: Option<ApiKey>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SensorConfig {
    pub video: bool,
    pub audio: bool,
    pub physiological: bool,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            video: true,
            audio: true,
            physiological: false,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    pub history: HistoryConfig,
    pub audio: AudioConfig,
    /// Resolved only for commands that talk to the speech service.
    pub speech: Option<SpeechConfig>,
    pub sensors: SensorConfig,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("api key must not be empty")]
    EmptyApiKey,
    #[error("history capacity must be > 0")]
    ZeroCapacity,
    #[error("summary interval must be > 0")]
    ZeroInterval,
    #[error("sample rate must be > 0 Hz")]
    ZeroSampleRate,
    #[error("block size must be > 0 samples")]
    ZeroBlockSize,
    #[error("invalid endpoint url: {0}")]
    InvalidEndpoint(String),
}

pub trait Env {
    fn var(&self, key: &str) -> Option<String>;
}

#[derive(Clone, Debug, Default)]
pub struct StdEnv;

impl Env for StdEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Clone, Debug, Default)]
pub struct MapEnv {
    vars: std::collections::BTreeMap<String, String>,
}

impl MapEnv {
    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_owned(), value.to_owned());
        self
    }
}

impl Env for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

pub fn resolve_api_key(
    cli_value: Option<String>,
    env_key: &str,
    env: &impl Env,
) -> Result<Option<ApiKey>, ConfigError> {
    match cli_value {
        Some(v) => Ok(Some(ApiKey::new(v)?)),
        None => match env.var(env_key) {
            Some(v) => Ok(Some(ApiKey::new(v)?)),
            None => Ok(None),
        },
    }
}

pub fn resolve_string_with_default(
    cli_value: Option<String>,
    env_key: &str,
    env: &impl Env,
    default: &str,
) -> String {
    match cli_value {
        Some(v) => v,
        None => env.var(env_key).unwrap_or_else(|| default.to_owned()),
    }
}

/// Builds the speech-to-text settings, CLI values first, then environment, then defaults.
pub fn resolve_speech_config(
    cli_api_key: Option<String>,
    cli_language: Option<String>,
    cli_endpoint: Option<String>,
    env: &impl Env,
) -> Result<SpeechConfig, ConfigError> {
    let api_key = resolve_api_key(cli_api_key, ENV_GOOGLE_SPEECH_API_KEY, env)?;
    let language_code =
        resolve_string_with_default(cli_language, ENV_SPEECH_LANGUAGE, env, DEFAULT_SPEECH_LANGUAGE);
    let endpoint =
        resolve_string_with_default(cli_endpoint, ENV_SPEECH_ENDPOINT, env, DEFAULT_SPEECH_ENDPOINT);
    let endpoint =
        Url::parse(&endpoint).map_err(|e| ConfigError::InvalidEndpoint(e.to_string()))?;

    Ok(SpeechConfig {
        endpoint,
        language_code,
        sample_rate_hz: DEFAULT_SPEECH_SAMPLE_RATE_HZ,
        api_key,
    })
}
