//! HTTP adapters for the chat model and embedder ports (C2, §6).

mod chat_client;
mod embedding_client;

pub use chat_client::{AnthropicChatClient, AnthropicChatConfig};
pub use embedding_client::{OpenAiEmbeddingClient, OpenAiEmbeddingConfig};
