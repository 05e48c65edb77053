//! Plan response and task schema domain models.

use serde::{Deserialize, Serialize};

/// Relative task complexity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

/// The agent role a task should be handed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignedAgent {
    Coder,
    Qa,
    Architect,
    Researcher,
}

/// A single unit of work within a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSchema {
    pub title: String,
    pub description: String,
    /// Lower means more important; must be in `0..=100`.
    pub priority: u8,
    pub complexity: Complexity,
    pub assigned_agent: AssignedAgent,
    pub acceptance_criteria: Vec<String>,
    #[serde(default)]
    pub validation_steps: Vec<String>,
    /// 0-based indices into the same plan's `tasks`.
    #[serde(default)]
    pub depends_on: Vec<usize>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub expected_files: Vec<String>,
}

impl TaskSchema {
    /// Structural validation per §3: title ≤200, description ≥10,
    /// priority ≤100, at least one non-empty acceptance criterion.
    pub fn validate(&self, task_count: usize, index: usize) -> Vec<String> {
        let mut errors = Vec::new();
        let title = self.title.trim();
        if title.is_empty() {
            errors.push(format!("task[{index}].title must not be empty"));
        } else if title.chars().count() > 200 {
            errors.push(format!("task[{index}].title must be at most 200 characters"));
        }
        if self.description.chars().count() < 10 {
            errors.push(format!("task[{index}].description must be at least 10 characters"));
        }
        if self.priority > 100 {
            errors.push(format!("task[{index}].priority must be in 0..=100"));
        }
        if self.acceptance_criteria.is_empty()
            || self.acceptance_criteria.iter().all(|c| c.trim().is_empty())
        {
            errors.push(format!(
                "task[{index}].acceptance_criteria must contain at least one non-empty entry"
            ));
        }
        for dep in &self.depends_on {
            if *dep >= task_count {
                errors.push(format!(
                    "task[{index}].depends_on references out-of-range index {dep}"
                ));
            }
            if *dep == index {
                errors.push(format!("task[{index}].depends_on cannot reference itself"));
            }
        }
        errors
    }
}

/// The top-level structured plan produced by the generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResponse {
    pub goal_summary: String,
    pub rationale: String,
    pub estimated_complexity: Complexity,
    pub tasks: Vec<TaskSchema>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub risk_factors: Vec<String>,
}

impl PlanResponse {
    /// Structural validation per §3: goal_summary 1–100 chars, rationale
    /// ≥20 chars, 1–50 tasks, each task individually valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let summary_len = self.goal_summary.trim().chars().count();
        if summary_len == 0 || summary_len > 100 {
            errors.push("goal_summary must be 1-100 characters".to_string());
        }
        if self.rationale.chars().count() < 20 {
            errors.push("rationale must be at least 20 characters".to_string());
        }
        if self.tasks.is_empty() || self.tasks.len() > 50 {
            errors.push("tasks must contain between 1 and 50 entries".to_string());
        }
        for (i, task) in self.tasks.iter().enumerate() {
            errors.extend(task.validate(self.tasks.len(), i));
        }
        errors
    }
}
