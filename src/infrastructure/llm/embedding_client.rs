//! OpenAI-compatible embeddings adapter implementing the [`Embedder`] port
//! (C2). Grounded directly on `adapters/embeddings/openai.rs`: batching by
//! `max_batch_size`, index-sorted reassembly, env-var API key fallback.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::error::IngestionError;
use crate::domain::ports::Embedder;

/// Configuration for the OpenAI-compatible embedding adapter.
#[derive(Debug, Clone)]
pub struct OpenAiEmbeddingConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub dimension: usize,
    pub timeout_secs: u64,
    pub max_batch_size: usize,
}

impl Default for OpenAiEmbeddingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimension: 1536,
            timeout_secs: 30,
            max_batch_size: 2048,
        }
    }
}

impl OpenAiEmbeddingConfig {
    fn resolved_api_key(&self) -> Result<String, IngestionError> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                IngestionError::EmbeddingFailed(
                    "OPENAI_API_KEY not set and no api_key configured".to_string(),
                )
            })
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f64>,
    index: usize,
}

/// OpenAI-compatible [`Embedder`]. `dimension()` is the configured,
/// adapter-constant value the spec requires (§3's "embedding dimension is
/// consistent across all nodes" invariant).
pub struct OpenAiEmbeddingClient {
    config: OpenAiEmbeddingConfig,
    http: reqwest::Client,
}

impl OpenAiEmbeddingClient {
    pub fn new(config: OpenAiEmbeddingConfig) -> Result<Self, IngestionError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| IngestionError::EmbeddingFailed(format!("failed to build http client: {e}")))?;
        Ok(Self { config, http })
    }

    async fn call_embeddings_api(&self, texts: &[String]) -> Result<Vec<Vec<f64>>, IngestionError> {
        let api_key = self.config.resolved_api_key()?;
        let request = EmbeddingsRequest { model: &self.config.model, input: texts };

        let response = self
            .http
            .post(format!("{}/embeddings", self.config.base_url))
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&request)
            .send()
            .await
            .map_err(|e| IngestionError::EmbeddingFailed(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IngestionError::EmbeddingFailed(format!(
                "embedding api returned {status}: {body}"
            )));
        }

        let mut parsed: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| IngestionError::EmbeddingFailed(format!("failed to parse response: {e}")))?;

        parsed.data.sort_by_key(|d| d.index);
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl Embedder for OpenAiEmbeddingClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f64>>, IngestionError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let mut all = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.config.max_batch_size) {
            let vectors = self.call_embeddings_api(chunk).await?;
            all.extend(vectors);
        }
        Ok(all)
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }
}
