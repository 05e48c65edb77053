//! Model registry (C1): catalog of known chat/embedding models, provider
//! inference from a bare model id, role-based selection, and cost
//! estimation.

use crate::domain::models::model_catalog::{ModelRole, ModelSpec, Provider};

fn default_catalog() -> Vec<ModelSpec> {
    vec![
        ModelSpec::new("claude-3-5-sonnet-20241022", Provider::Anthropic, ModelRole::Architect, 3.0, 15.0),
        ModelSpec::new("claude-3-5-haiku-20241022", Provider::Anthropic, ModelRole::Worker, 0.8, 4.0),
        ModelSpec::new("gpt-4o", Provider::OpenAi, ModelRole::Architect, 2.5, 10.0),
        ModelSpec::new("gpt-4o-mini", Provider::OpenAi, ModelRole::Worker, 0.15, 0.6),
        ModelSpec::new("text-embedding-3-small", Provider::OpenAi, ModelRole::Embedding, 0.02, 0.0),
        ModelSpec::new("local", Provider::Local, ModelRole::Worker, 0.0, 0.0),
    ]
}

/// Infer the vendor behind a model id from its naming convention.
pub fn infer_provider(model_id: &str) -> Provider {
    let lower = model_id.to_lowercase();
    if lower.starts_with("claude") {
        Provider::Anthropic
    } else if lower.starts_with("gpt") || lower.starts_with("text-embedding") || lower.starts_with("o1") {
        Provider::OpenAi
    } else {
        Provider::Local
    }
}

/// A registry of known models, extensible at runtime.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: Vec<ModelSpec>,
}

impl ModelRegistry {
    /// Build a registry seeded with the built-in catalog.
    pub fn new() -> Self {
        Self { models: default_catalog() }
    }

    /// Add or replace a model in the catalog.
    pub fn register(&mut self, spec: ModelSpec) {
        if let Some(existing) = self.models.iter_mut().find(|m| m.id == spec.id) {
            *existing = spec;
        } else {
            self.models.push(spec);
        }
    }

    pub fn get(&self, model_id: &str) -> Option<&ModelSpec> {
        self.models.iter().find(|m| m.id == model_id)
    }

    /// The first catalog entry matching `role`, in registration order.
    pub fn select_for_role(&self, role: ModelRole) -> Option<&ModelSpec> {
        self.models.iter().find(|m| m.role == role)
    }

    pub fn estimate_cost_cents(&self, model_id: &str, input_tokens: u64, output_tokens: u64) -> Option<f64> {
        self.get(model_id).map(|spec| spec.estimate_cost_cents(input_tokens, output_tokens))
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
