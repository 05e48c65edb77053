//! Infrastructure layer
//!
//! Concrete adapters for the ports in `domain::ports`: HTTP chat-model and
//! embedder clients, a SQLite-backed knowledge repository, configuration
//! loading, logging initialization, and a subprocess-based shell validator.
//! `services/` depends only on port traits, never on this module directly,
//! so every adapter here is swappable behind those traits.

pub mod config;
pub mod knowledge_store;
pub mod llm;
pub mod logging;
pub mod shell;
