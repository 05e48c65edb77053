//! LLM gateway (C2): a uniform facade over the chat-model and embedder
//! ports so the rest of the engine depends on one seam instead of two
//! separate adapter lifecycles.

use std::sync::Arc;

use crate::domain::error::{GenerationError, IngestionError};
use crate::domain::ports::{ChatModel, ChatResponse, Embedder, Message};

/// Wraps a chat model and an embedder behind a single handle, closable as a
/// unit.
pub struct LlmGateway {
    chat: Arc<dyn ChatModel>,
    embedder: Arc<dyn Embedder>,
}

impl LlmGateway {
    pub fn new(chat: Arc<dyn ChatModel>, embedder: Arc<dyn Embedder>) -> Self {
        Self { chat, embedder }
    }

    pub async fn generate(&self, messages: &[Message]) -> Result<ChatResponse, GenerationError> {
        self.chat.generate(messages).await
    }

    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f64>>, IngestionError> {
        self.embedder.embed(texts).await
    }

    pub fn embedding_dimension(&self) -> usize {
        self.embedder.dimension()
    }

    /// Release both underlying clients. Embedder has no analogous close in
    /// its port contract, so only the chat model is closed.
    pub async fn close(&self) -> Result<(), GenerationError> {
        self.chat.close().await
    }
}
