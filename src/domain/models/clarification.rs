//! Clarification response domain model.

use serde::{Deserialize, Serialize};

/// Result of the clarification pass that decides whether a goal is ready to
/// plan, or needs follow-up questions first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClarificationResponse {
    pub is_ready_to_plan: bool,
    pub goal_summary: String,
    #[serde(default)]
    pub enriched_goal: Option<String>,
    #[serde(default)]
    pub questions: Vec<String>,
}

impl ClarificationResponse {
    pub fn ready(goal_summary: impl Into<String>, enriched_goal: impl Into<String>) -> Self {
        Self {
            is_ready_to_plan: true,
            goal_summary: goal_summary.into(),
            enriched_goal: Some(enriched_goal.into()),
            questions: Vec::new(),
        }
    }

    pub fn needs_clarification(goal_summary: impl Into<String>, questions: Vec<String>) -> Self {
        Self {
            is_ready_to_plan: false,
            goal_summary: goal_summary.into(),
            enriched_goal: None,
            questions,
        }
    }

    /// Structural plus conditional validation: `goal_summary` 1-100 chars;
    /// when ready, `enriched_goal` is required; when not ready, at least one
    /// non-empty question is required.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let len = self.goal_summary.trim().chars().count();
        if len == 0 || len > 100 {
            errors.push("goal_summary must be 1-100 characters".to_string());
        }
        if self.is_ready_to_plan {
            match &self.enriched_goal {
                Some(goal) if !goal.trim().is_empty() => {}
                _ => errors.push("enriched_goal is required when is_ready_to_plan is true".to_string()),
            }
        } else if self.questions.is_empty() || self.questions.iter().all(|q| q.trim().is_empty()) {
            errors.push("questions must contain at least one non-empty entry when is_ready_to_plan is false".to_string());
        }
        errors
    }
}
