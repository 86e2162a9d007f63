use std::fmt;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gpt-4o-transcribe";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Largest upload the provider accepts (25 MB).
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub const SUPPORTED_CONTENT_TYPES: &[&str] = &[
    "audio/mpeg",
    "audio/mp3",
    "audio/mp4",
    "audio/mpeg3",
    "audio/mpg",
    "audio/mpga",
    "audio/m4a",
    "audio/wav",
    "audio/webm",
    // browser aliases
    "audio/x-wav",
    "audio/wave",
    "audio/x-m4a",
    "video/mp4",
    "video/webm",
];

/// File extension to the content type declared upstream.
pub const EXTENSION_CONTENT_TYPES: &[(&str, &str)] = &[
    ("mp3", "audio/mpeg"),
    ("mp4", "audio/mp4"),
    ("m4a", "audio/m4a"),
    ("wav", "audio/wav"),
    ("webm", "audio/webm"),
    ("mpeg", "audio/mpeg"),
    ("mpga", "audio/mpga"),
    ("mpg", "audio/mpg"),
];

const API_KEY_VAR: &str = "OPENAI_API_KEY";
const BASE_URL_VAR: &str = "OPENAI_BASE_URL";
const TIMEOUT_VAR: &str = "TRANSCRIBE_UPSTREAM_TIMEOUT_SECS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY environment variable is not set. Set it in your .env file or environment.")]
    MissingApiKey,

    #[error("TRANSCRIBE_UPSTREAM_TIMEOUT_SECS must be a positive number of seconds, got {0:?}")]
    InvalidTimeout(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Process-wide settings, loaded once at startup and never mutated.
#[derive(Clone)]
pub struct Settings {
    pub api_key: String,
    pub base_url: String,
    /// `None` keeps the HTTP client default. Requests are never retried.
    pub upstream_timeout: Option<Duration>,
}

impl Settings {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            upstream_timeout: None,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let base_url = lookup(BASE_URL_VAR)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let upstream_timeout = match lookup(TIMEOUT_VAR) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
            None => None,
        };

        let mut settings = Self::new(api_key, base_url.trim());
        settings.upstream_timeout = upstream_timeout;
        Ok(settings)
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("upstream_timeout", &self.upstream_timeout)
            .finish()
    }
}
