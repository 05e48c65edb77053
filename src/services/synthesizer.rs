//! Synthesizer (C8): a second LLM pass that merges the raw findings an
//! orchestrator run produced into a single report with a summary, deduped
//! key decisions, surfaced conflicts and recommendations. Failure here is
//! always non-fatal: on any error the caller gets a degraded report
//! carrying the raw findings verbatim.

use serde_json::Value;

use crate::domain::error::ValidationError;
use crate::domain::models::{Finding, SynthesisReport};
use crate::domain::ports::Message;

use super::llm_gateway::LlmGateway;
use super::structured_generator::{generate_structured, GeneratorConfig};

/// Reserved `source_agent` value for synthesized findings. No real analyzer
/// agent should register under this name.
pub const SYNTHESIZER_AGENT_NAME: &str = "synthesizer";

fn build_prompt(findings: &[Finding]) -> String {
    let grouped = serde_json::to_string_pretty(findings).unwrap_or_default();
    format!(
        "Synthesize the following findings, grouped by source agent. Merge \
         duplicates (keeping the strongest confidence), surface conflicts \
         between agents with their resolution, and produce a short summary \
         and a list of recommendations. Return a JSON object with keys \
         `summary`, `key_decisions` (an array of findings in the same shape \
         as the input), `conflicts` (each with `topic`, `sources`, \
         `resolution`), and `recommendations` (an array of strings).\n\n{grouped}"
    )
}

fn validate_report(value: &Value) -> Result<SynthesisReport, ValidationError> {
    let mut report = ValidationError::default();
    let synthesis: SynthesisReport = match serde_json::from_value(value.clone()) {
        Ok(s) => s,
        Err(e) => {
            report.push("<root>", format!("expected a synthesis report: {e}"));
            return Err(report);
        }
    };
    if let Err(message) = synthesis.validate() {
        report.push("<root>", message);
    }
    for (i, decision) in synthesis.key_decisions.iter().enumerate() {
        if let Err(message) = decision.validate() {
            report.push(format!("key_decisions[{i}]"), message);
        }
    }
    if report.is_empty() {
        Ok(synthesis)
    } else {
        Err(report)
    }
}

/// Attempt to synthesize `raw_findings` via the model; fall back to a
/// degraded report carrying the raw findings untouched on any failure.
pub async fn synthesize(
    gateway: &LlmGateway,
    raw_findings: Vec<Finding>,
    config: &GeneratorConfig,
) -> SynthesisReport {
    if raw_findings.is_empty() {
        return SynthesisReport::fallback(raw_findings);
    }

    let prompt = build_prompt(&raw_findings);
    match generate_structured(gateway, &[Message::user(prompt)], config, validate_report).await {
        Ok(mut synthesized) => {
            for finding in &mut synthesized.key_decisions {
                finding.source_agent = SYNTHESIZER_AGENT_NAME.to_string();
            }
            synthesized
        }
        Err(e) => {
            tracing::warn!(error = %e, "synthesis failed, falling back to raw findings");
            SynthesisReport::fallback(raw_findings)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::GenerationError;
    use crate::domain::models::finding::{Confidence, FindingKind};
    use crate::domain::ports::{ChatModel, ChatResponse, Embedder, Usage};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct FixedChat(&'static str);

    #[async_trait]
    impl ChatModel for FixedChat {
        async fn generate(&self, _messages: &[Message]) -> Result<ChatResponse, GenerationError> {
            Ok(ChatResponse { content: self.0.to_string(), usage: Usage::default() })
        }
    }

    struct FailingChat;

    #[async_trait]
    impl ChatModel for FailingChat {
        async fn generate(&self, _messages: &[Message]) -> Result<ChatResponse, GenerationError> {
            Err(GenerationError::ModelCallFailed("connection reset".to_string()))
        }
    }

    struct NoopEmbedder;

    #[async_trait]
    impl Embedder for NoopEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f64>>, crate::domain::error::IngestionError> {
            Ok(texts.iter().map(|_| vec![0.0]).collect())
        }
        fn dimension(&self) -> usize {
            1
        }
    }

    fn sample_findings() -> Vec<Finding> {
        vec![Finding::new(FindingKind::Note, "A", "a sufficiently long description", Confidence::Low)]
    }

    fn sample_report_json() -> String {
        serde_json::to_string(&SynthesisReport {
            summary: "two agents agree on the storage layer".to_string(),
            key_decisions: sample_findings(),
            conflicts: vec![],
            recommendations: vec!["add an index on created_at".to_string()],
        })
        .unwrap()
    }

    #[tokio::test]
    async fn empty_input_returns_fallback_without_calling_model() {
        let gateway = LlmGateway::new(Arc::new(FailingChat), Arc::new(NoopEmbedder));
        let config = GeneratorConfig { max_retries: 0, base_delay_ms: 1 };
        let report = synthesize(&gateway, vec![], &config).await;
        assert!(report.key_decisions.is_empty());
    }

    #[tokio::test]
    async fn successful_synthesis_relabels_source_agent_and_keeps_recommendations() {
        let json = sample_report_json();
        let gateway = LlmGateway::new(Arc::new(FixedChat(Box::leak(json.into_boxed_str()))), Arc::new(NoopEmbedder));
        let config = GeneratorConfig { max_retries: 0, base_delay_ms: 1 };
        let report = synthesize(&gateway, sample_findings(), &config).await;
        assert_eq!(report.key_decisions[0].source_agent, SYNTHESIZER_AGENT_NAME);
        assert_eq!(report.recommendations.len(), 1);
    }

    #[tokio::test]
    async fn model_failure_falls_back_to_raw_findings() {
        let gateway = LlmGateway::new(Arc::new(FailingChat), Arc::new(NoopEmbedder));
        let config = GeneratorConfig { max_retries: 0, base_delay_ms: 1 };
        let input = sample_findings();
        let report = synthesize(&gateway, input.clone(), &config).await;
        assert_eq!(report.key_decisions.len(), input.len());
        assert_eq!(report.key_decisions[0].title, input[0].title);
    }

    #[tokio::test]
    async fn invalid_output_falls_back_to_raw_findings() {
        let gateway = LlmGateway::new(Arc::new(FixedChat("not json at all")), Arc::new(NoopEmbedder));
        let config = GeneratorConfig { max_retries: 0, base_delay_ms: 1 };
        let input = sample_findings();
        let report = synthesize(&gateway, input.clone(), &config).await;
        assert_eq!(report.key_decisions[0].source_agent, input[0].source_agent);
    }
}
