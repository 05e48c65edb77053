//! Anthropic Messages API adapter implementing the [`ChatModel`] port (C2).
//!
//! Grounded on the teacher's `infrastructure/claude/client.rs`: a pooled
//! `reqwest::Client`, a typed config struct with env-var fallback for the
//! API key, and an HTTP status -> domain error mapping.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::error::GenerationError;
use crate::domain::ports::{ChatModel, ChatResponse, Message, Usage};

/// Configuration for the Anthropic chat-model adapter.
#[derive(Debug, Clone)]
pub struct AnthropicChatConfig {
    /// API key. Falls back to the `ANTHROPIC_API_KEY` env var.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for AnthropicChatConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.anthropic.com".to_string(),
            model: "claude-3-5-sonnet-20241022".to_string(),
            max_tokens: 4096,
            timeout_secs: 120,
        }
    }
}

impl AnthropicChatConfig {
    fn resolved_api_key(&self) -> Result<String, GenerationError> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .ok_or_else(|| {
                GenerationError::ModelCallFailed(
                    "ANTHROPIC_API_KEY not set and no api_key configured".to_string(),
                )
            })
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: UsageWire,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize, Default)]
struct UsageWire {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

/// Anthropic-backed [`ChatModel`]. Called at temperature 0 for the
/// deterministic structured-output contract C6 requires.
pub struct AnthropicChatClient {
    config: AnthropicChatConfig,
    http: reqwest::Client,
}

impl AnthropicChatClient {
    pub fn new(config: AnthropicChatConfig) -> Result<Self, GenerationError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::ModelCallFailed(format!("failed to build http client: {e}")))?;
        Ok(Self { config, http })
    }
}

#[async_trait]
impl ChatModel for AnthropicChatClient {
    async fn generate(&self, messages: &[Message]) -> Result<ChatResponse, GenerationError> {
        let api_key = self.config.resolved_api_key()?;

        let mut system = None;
        let mut wire_messages = Vec::with_capacity(messages.len());
        for m in messages {
            if m.role == "system" {
                system = Some(m.content.as_str());
            } else {
                wire_messages.push(WireMessage { role: &m.role, content: &m.content });
            }
        }

        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: 0.0,
            messages: wire_messages,
            system,
        };

        let response = self
            .http
            .post(format!("{}/v1/messages", self.config.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::ModelCallFailed(describe_transport_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::ModelCallFailed(format!(
                "anthropic api returned {status}: {body}"
            )));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::ModelCallFailed(format!("failed to parse response body: {e}")))?;

        let content = parsed.content.into_iter().map(|b| b.text).collect::<Vec<_>>().join("");

        Ok(ChatResponse {
            content,
            usage: Usage {
                input_tokens: parsed.usage.input_tokens,
                output_tokens: parsed.usage.output_tokens,
            },
        })
    }
}

/// Maps low-level transport failures (timeout, connect) onto the substrings
/// `GenerationError::is_transient` recognizes, so a dropped connection
/// retries the same as an explicit 429.
fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timeout: {err}")
    } else if err.is_connect() {
        format!("connection error: {err}")
    } else {
        err.to_string()
    }
}
