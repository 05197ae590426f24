//! Gateway to the hosted text-generation service.
//!
//! The gateway does one thing: send a prompt with the fixed per-task model
//! configuration and hand back the raw reply text, normalizing transport
//! failures into a typed error. It never retries - retry policy belongs to
//! the caller, which knows whether a failure is worth another attempt.

use super::models::PromptKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Error)]
pub enum GatewayError {
    /// No API key configured. Fatal; surfaced before any request is made.
    #[error("missing API key: set {} or add it to {}", crate::config::API_KEY_ENV, crate::config::Config::config_location())]
    MissingApiKey,
    /// The service rejected the credentials.
    #[error("authentication failed: the API key was rejected")]
    AuthenticationFailed,
    /// The service is rate limiting. Transient; the caller may back off and retry.
    #[error("rate limit exceeded; try again in a few minutes")]
    RateLimited,
    /// The service answered but returned no usable text.
    #[error("the model returned an empty response")]
    EmptyResponse,
    /// Network fault or an unexpected service error.
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Anything that can run a generation task. The production implementation is
/// [`AnthropicClient`]; tests script replies through a fake.
#[allow(async_fn_in_trait)]
pub trait Gateway {
    async fn invoke(&self, kind: PromptKind, prompt: &str) -> Result<String, GatewayError>;
}

impl<G: Gateway> Gateway for &G {
    async fn invoke(&self, kind: PromptKind, prompt: &str) -> Result<String, GatewayError> {
        (**self).invoke(kind, prompt).await
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

/// Client for the Anthropic messages API.
pub struct AnthropicClient {
    api_key: String,
    http: reqwest::Client,
}

impl AnthropicClient {
    pub fn new(api_key: String) -> Self {
        AnthropicClient {
            api_key,
            http: reqwest::Client::new(),
        }
    }

    /// Build a client from config, failing fast when no key is set.
    pub fn from_config(config: &crate::config::Config) -> Result<Self, GatewayError> {
        let key = config.api_key().ok_or(GatewayError::MissingApiKey)?;
        Ok(Self::new(key))
    }
}

impl Gateway for AnthropicClient {
    async fn invoke(&self, kind: PromptKind, prompt: &str) -> Result<String, GatewayError> {
        let request = MessagesRequest {
            model: kind.model(),
            max_tokens: kind.max_tokens(),
            temperature: kind.temperature(),
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        tracing::debug!(
            task = kind.label(),
            model = kind.model(),
            prompt_chars = prompt.len(),
            "invoking generation service"
        );

        let response = self
            .http
            .post(ANTHROPIC_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if status.is_success() {
            let parsed: MessagesResponse = serde_json::from_str(&text).map_err(|e| {
                GatewayError::Transport(format!("unexpected response body: {}", e))
            })?;
            let reply = parsed
                .content
                .first()
                .map(|block| block.text.clone())
                .unwrap_or_default();
            if reply.trim().is_empty() {
                return Err(GatewayError::EmptyResponse);
            }
            return Ok(reply);
        }

        tracing::warn!(task = kind.label(), status = status.as_u16(), "generation request failed");
        match status.as_u16() {
            401 | 403 => Err(GatewayError::AuthenticationFailed),
            429 => Err(GatewayError::RateLimited),
            code => Err(GatewayError::Transport(format!(
                "API error {}: {}",
                code,
                truncate_str(&text, 200)
            ))),
        }
    }
}

/// Truncate a string for display (Unicode-safe)
pub(crate) fn truncate_str(s: &str, max_chars: usize) -> &str {
    if s.chars().count() <= max_chars {
        s
    } else {
        let byte_idx = s
            .char_indices()
            .nth(max_chars)
            .map(|(i, _)| i)
            .unwrap_or(s.len());
        &s[..byte_idx]
    }
}
