//! Text-generation provider seam and an OpenAI-compatible HTTP client.
//!
//! The client talks to any `/chat/completions` endpoint that accepts a
//! bearer token, which covers OpenAI itself and most self-hosted gateways.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Default base URL when `AI_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1";

/// Default model when `AI_MODEL` is unset.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default request timeout when `AI_TIMEOUT_SECS` is unset.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Sampling temperature for every request. Low, since callers mostly want
/// structured verdicts.
const TEMPERATURE: f32 = 0.2;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Failures talking to the provider. These are logged and turned into a
/// rule-based fallback; they never reach an HTTP response body.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Provider returned HTTP {status}")]
    Api { status: u16, body: String },

    /// The provider answered without any message content.
    #[error("Provider returned an empty completion")]
    EmptyResponse,

    /// The completion was not the JSON shape the caller asked for.
    #[error("Malformed model output: {0}")]
    Parse(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// One chat turn sent to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Anything that can turn a conversation into a completion.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Return the raw completion text. With `json_mode` the provider is asked
    /// to answer with a single JSON object.
    async fn complete(&self, messages: &[ChatMessage], json_mode: bool) -> Result<String, AiError>;
}

/// Ask for a JSON object and deserialize it into `T`.
pub async fn complete_json<T: DeserializeOwned>(
    generator: &dyn TextGenerator,
    system: &str,
    user: &str,
) -> Result<T, AiError> {
    let messages = [ChatMessage::system(system), ChatMessage::user(user)];
    let raw = generator.complete(&messages, true).await?;
    Ok(serde_json::from_str(extract_json(&raw))?)
}

/// Cut the JSON object out of a completion.
///
/// Models sometimes wrap JSON in Markdown fences or add a sentence before
/// it even in JSON mode.
pub fn extract_json(raw: &str) -> &str {
    let trimmed = raw.trim();
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if end > start => &trimmed[start..=end],
        _ => trimmed,
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Provider settings.
///
/// | Env var           | Default                      |
/// |-------------------|------------------------------|
/// | `AI_API_KEY`      | (unset disables the provider) |
/// | `AI_API_URL`      | `https://api.openai.com/v1`  |
/// | `AI_MODEL`        | `gpt-4o-mini`                |
/// | `AI_TIMEOUT_SECS` | `30`                         |
#[derive(Clone)]
pub struct AiConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl AiConfig {
    /// Load from the environment. Returns `None` when no API key is set so
    /// the server can start without a provider.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("AI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())?;

        let api_url = std::env::var("AI_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let model = std::env::var("AI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let timeout_secs: u64 = std::env::var("AI_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse()
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Some(Self {
            api_url,
            api_key,
            model,
            timeout_secs,
        })
    }
}

// ---------------------------------------------------------------------------
// OpenAI-compatible client
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// HTTP client for a `/chat/completions` endpoint.
pub struct OpenAiClient {
    client: reqwest::Client,
    config: AiConfig,
}

impl OpenAiClient {
    pub fn new(config: AiConfig) -> Result<Self, AiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage], json_mode: bool) -> Result<String, AiError> {
        let mut body = serde_json::json!({
            "model": self.config.model,
            "messages": messages,
            "temperature": TEMPERATURE,
        });
        if json_mode {
            body["response_format"] = serde_json::json!({ "type": "json_object" });
        }

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_url))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(status = status.as_u16(), body = %body, "AI provider error");
            return Err(AiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CompletionResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(AiError::EmptyResponse)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
