//! Structured generator (C6): drives the chat model through the repair
//! (C3) and validation (C4) stages, retrying with accumulated feedback
//! spliced into the prompt until the output validates or retries run out.

use serde_json::Value;
use std::time::Duration;

use crate::domain::error::{GenerationError, ValidationError};
use crate::domain::ports::Message;

use super::json_repair;
use super::llm_gateway::LlmGateway;

/// Feedback truncated beyond this many characters before being spliced back
/// into the next prompt, so a pathological validation report cannot blow up
/// the context.
const MAX_FEEDBACK_CHARS: usize = 500;

/// Retry policy for the generator: a fixed base delay multiplied by the
/// attempt number (1-indexed), not exponential backoff.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self { max_retries: 3, base_delay_ms: 500 }
    }
}

impl GeneratorConfig {
    fn backoff(&self, attempt_number: u32) -> Duration {
        Duration::from_millis(self.base_delay_ms * u64::from(attempt_number))
    }
}

fn format_feedback(report: &ValidationError) -> String {
    let joined = report
        .issues
        .iter()
        .map(|issue| issue.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    if joined.chars().count() > MAX_FEEDBACK_CHARS {
        let truncated: String = joined.chars().take(MAX_FEEDBACK_CHARS).collect();
        format!("{truncated}...")
    } else {
        joined
    }
}

fn feedback_message(report: &ValidationError) -> Message {
    Message::user(format!(
        "The previous response failed validation. Fix these issues and return the corrected JSON only:\n{{ValidationErrors}}"
            .replace("{{ValidationErrors}}", &format_feedback(report))
    ))
}

/// Drive the model through up to `config.max_retries + 1` attempts,
/// repairing and validating each response via `validate`, splicing
/// validation feedback into the conversation between attempts.
pub async fn generate_structured<T>(
    gateway: &LlmGateway,
    base_messages: &[Message],
    config: &GeneratorConfig,
    validate: impl Fn(&Value) -> Result<T, ValidationError>,
) -> Result<T, GenerationError> {
    let mut messages: Vec<Message> = base_messages.to_vec();
    let mut last_error = String::new();

    for attempt in 0..=config.max_retries {
        let response = match gateway.generate(&messages).await {
            Ok(r) => r,
            Err(e) => {
                last_error = e.to_string();
                if attempt >= config.max_retries || !e.is_transient() {
                    return Err(GenerationError::RetriesExhausted {
                        attempts: attempt + 1,
                        last_error,
                    });
                }
                tokio::time::sleep(config.backoff(attempt + 1)).await;
                continue;
            }
        };

        let parsed: Result<Value, _> = json_repair::extract(&response.content);
        let value = match parsed {
            Ok(v) => v,
            Err(e) => {
                last_error = e.to_string();
                if attempt >= config.max_retries {
                    return Err(GenerationError::RetriesExhausted { attempts: attempt + 1, last_error });
                }
                messages.push(Message::assistant_placeholder(&response.content));
                messages.push(Message::user(format!(
                    "Your last response was not valid JSON ({e}). Return only the corrected JSON."
                )));
                continue;
            }
        };

        match validate(&value) {
            Ok(result) => return Ok(result),
            Err(report) => {
                last_error = report.to_string();
                if attempt >= config.max_retries {
                    return Err(GenerationError::RetriesExhausted { attempts: attempt + 1, last_error });
                }
                messages.push(Message::assistant_placeholder(&response.content));
                messages.push(feedback_message(&report));
            }
        }
    }

    Err(GenerationError::RetriesExhausted { attempts: config.max_retries + 1, last_error })
}

impl Message {
    /// Replays a prior model response back into the conversation so the next
    /// turn has full history. `role` is fixed to `"assistant"`.
    fn assistant_placeholder(content: &str) -> Self {
        Self { role: "assistant".to_string(), content: content.to_string() }
    }
}
