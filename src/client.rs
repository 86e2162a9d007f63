use std::fmt;
use std::str::FromStr;

use log::{debug, error, info};
use serde::Deserialize;
use serde_json::Value;

use crate::config::{ConfigError, DEFAULT_MODEL, Settings};

/// Output encoding requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ResponseFormat {
    Json,
    Text,
    Srt,
    #[value(name = "verbose_json")]
    VerboseJson,
    Vtt,
    #[value(name = "diarized_json")]
    DiarizedJson,
}

impl ResponseFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
            Self::Srt => "srt",
            Self::VerboseJson => "verbose_json",
            Self::Vtt => "vtt",
            Self::DiarizedJson => "diarized_json",
        }
    }

    pub fn is_json(self) -> bool {
        matches!(self, Self::Json | Self::VerboseJson | Self::DiarizedJson)
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            "srt" => Ok(Self::Srt),
            "verbose_json" => Ok(Self::VerboseJson),
            "vtt" => Ok(Self::Vtt),
            "diarized_json" => Ok(Self::DiarizedJson),
            other => Err(format!(
                "Unknown response_format '{other}'; expected one of json, text, srt, verbose_json, vtt, diarized_json"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionOptions {
    pub model: String,
    /// `None` leaves the choice to the provider (json).
    pub response_format: Option<ResponseFormat>,
    pub prompt: Option<String>,
}

impl Default for TranscriptionOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            response_format: None,
            prompt: None,
        }
    }
}

/// A validated upload ready to be forwarded upstream.
#[derive(Debug)]
pub struct UploadRequest {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: String,
    pub options: TranscriptionOptions,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptionResult {
    /// Provider JSON passed through as-is, including any segment metadata.
    Json(Value),
    /// Plain text, srt or vtt body.
    Text(String),
}

impl TranscriptionResult {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Json(value) => value.get("text").and_then(Value::as_str),
            Self::Text(text) => Some(text),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("Failed to build upstream request: {0}")]
    Request(String),

    #[error("Failed to reach transcription provider: {0}")]
    Transport(String),

    #[error("Transcription provider returned {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("Failed to decode provider response: {0}")]
    Decode(String),
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    error: ProviderErrorDetail,
}

#[derive(Deserialize)]
struct ProviderErrorDetail {
    message: String,
}

/// Issues single, unretried requests to the provider's transcription endpoint.
#[derive(Clone)]
pub struct TranscriptionClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl TranscriptionClient {
    pub fn new(settings: &Settings) -> Result<Self, ConfigError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.upstream_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: format!("{}/audio/transcriptions", settings.base_url),
            api_key: settings.api_key.clone(),
        })
    }

    pub async fn transcribe(
        &self,
        request: UploadRequest,
    ) -> Result<TranscriptionResult, UpstreamError> {
        let UploadRequest {
            bytes,
            filename,
            content_type,
            options,
        } = request;

        debug!(
            "Forwarding {} bytes ({content_type}, {filename}) to {} with model={}",
            bytes.len(),
            self.endpoint,
            options.model
        );

        let file_part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename)
            .mime_str(&content_type)
            .map_err(|e| UpstreamError::Request(format!("invalid content type: {e}")))?;

        let mut form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("model", options.model);

        if let Some(format) = options.response_format {
            form = form.text("response_format", format.as_str());
        }
        if let Some(prompt) = options.prompt.filter(|p| !p.trim().is_empty()) {
            form = form.text("prompt", prompt);
        }

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                error!("Transcription request failed: {e}");
                UpstreamError::Transport(e.to_string())
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!("Failed to read provider response: {e}");
            UpstreamError::Transport(e.to_string())
        })?;

        if !status.is_success() {
            let message = provider_message(&body);
            error!("Provider error ({status}): {message}");
            return Err(UpstreamError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let result = match options.response_format {
            Some(format) if !format.is_json() => TranscriptionResult::Text(body),
            _ => {
                let value: Value = serde_json::from_str(&body)
                    .map_err(|e| UpstreamError::Decode(e.to_string()))?;
                TranscriptionResult::Json(value)
            }
        };

        info!(
            "Transcription completed: {} characters",
            result.text().map_or(0, str::len)
        );
        Ok(result)
    }
}

fn provider_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ProviderErrorBody>(body) {
        return parsed.error.message;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Unknown error".to_string()
    } else {
        trimmed.to_string()
    }
}
