//! Model catalog domain model: provider inference, role tagging and per-model
//! pricing consumed by the model registry service (C1).

use serde::{Deserialize, Serialize};

/// The inferred vendor behind a model id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Anthropic,
    OpenAi,
    Local,
}

/// The role a model is best suited for in role-based selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelRole {
    Architect,
    Worker,
    Embedding,
}

/// A single catalog entry: id, provider, role and USD-per-million-token
/// pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    pub id: String,
    pub provider: Provider,
    pub role: ModelRole,
    pub input_cost_per_million: f64,
    pub output_cost_per_million: f64,
}

impl ModelSpec {
    pub fn new(
        id: impl Into<String>,
        provider: Provider,
        role: ModelRole,
        input_cost_per_million: f64,
        output_cost_per_million: f64,
    ) -> Self {
        Self {
            id: id.into(),
            provider,
            role,
            input_cost_per_million,
            output_cost_per_million,
        }
    }

    /// Estimated cost in cents for the given token usage.
    pub fn estimate_cost_cents(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        let input_cost = (input_tokens as f64 / 1_000_000.0) * self.input_cost_per_million;
        let output_cost = (output_tokens as f64 / 1_000_000.0) * self.output_cost_per_million;
        (input_cost + output_cost) * 100.0
    }
}
