//! Bootstrap plan domain model.
//!
//! The output of the bootstrap planner (C11): a decision about which of six
//! mutually exclusive modes applies, plus the ordered actions, summaries and
//! warnings that justify it.

use serde::{Deserialize, Serialize};

/// Which bootstrap path the planner selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    FirstTime,
    Repair,
    Reconfigure,
    Run,
    Noop,
    Error,
}

/// A single ordered step of the bootstrap plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapAction {
    pub description: String,
    #[serde(default)]
    pub reason: Option<String>,
}

impl BootstrapAction {
    pub fn new(description: impl Into<String>) -> Self {
        Self { description: description.into(), reason: None }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// The complete bootstrap decision: mode, ordered actions, and the
/// human-readable justification trail required for the bootstrap report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapPlan {
    pub mode: Mode,
    pub actions: Vec<BootstrapAction>,
    #[serde(default)]
    pub summaries: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default)]
    pub skip_justifications: Vec<String>,
}

impl BootstrapPlan {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            actions: Vec::new(),
            summaries: Vec::new(),
            warnings: Vec::new(),
            reasons: Vec::new(),
            skip_justifications: Vec::new(),
        }
    }

    pub fn with_action(mut self, action: BootstrapAction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reasons.push(reason.into());
        self
    }

    pub fn with_skip_justification(mut self, justification: impl Into<String>) -> Self {
        self.skip_justifications.push(justification.into());
        self
    }

    pub fn is_actionable(&self) -> bool {
        !matches!(self.mode, Mode::Noop | Mode::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_plan_is_not_actionable() {
        let plan = BootstrapPlan::new(Mode::Noop);
        assert!(!plan.is_actionable());
    }

    #[test]
    fn error_plan_is_not_actionable() {
        let plan = BootstrapPlan::new(Mode::Error);
        assert!(!plan.is_actionable());
    }

    #[test]
    fn first_time_plan_is_actionable() {
        let plan = BootstrapPlan::new(Mode::FirstTime)
            .with_action(BootstrapAction::new("write .claude/commands").with_reason("no existing commands found"));
        assert!(plan.is_actionable());
        assert_eq!(plan.actions.len(), 1);
    }

    #[test]
    fn builder_accumulates_warnings_and_reasons() {
        let plan = BootstrapPlan::new(Mode::Repair)
            .with_warning("hooks file missing Stop entry")
            .with_reason("managed commands are stale");
        assert_eq!(plan.warnings.len(), 1);
        assert_eq!(plan.reasons.len(), 1);
    }
}
