//! Repair planner (C10): a pure, I/O-free translation from integration
//! issues to concrete repair actions. Given the same issues and the same
//! options it always produces the same plan.

use crate::domain::error::RepairPlanError;
use crate::domain::models::{IntegrationIssue, RepairAction, RepairPrimitive};

/// Caller-supplied opt-ins that gate otherwise-blocked repair actions.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepairOptions {
    /// `--allow-global-mutation`: permits actions touching state outside the
    /// project directory (the global MCP registration).
    pub allow_global_mutation: bool,
    /// `--adopt-unmanaged`: permits overwriting artifacts TaskWing did not
    /// create.
    pub adopt_unmanaged: bool,
}

fn build_action(issue: &IntegrationIssue, opts: RepairOptions) -> RepairAction {
    let primitive = RepairPrimitive::for_component(issue.kind);
    let mut apply = issue.auto_fixable;
    let mut reason = issue.detail.clone();

    if issue.adopt_required {
        apply = opts.adopt_unmanaged;
        if !apply {
            reason = "adoption required (use --adopt-unmanaged)".to_string();
        }
    }
    if issue.mutates_global && !opts.allow_global_mutation {
        apply = false;
        reason = "global mutation disabled".to_string();
    }

    RepairAction {
        ai: issue.ai.clone(),
        component: issue.kind,
        primitive,
        apply,
        reason,
        mutates_global: issue.mutates_global,
        requires_adoption: issue.adopt_required,
    }
}

/// Translate every issue into a repair action, in deterministic order: AIs
/// sorted lexicographically, issues within one AI kept in their original
/// (per-AI) order.
pub fn plan_repairs(
    issues: &[IntegrationIssue],
    opts: RepairOptions,
) -> Result<Vec<RepairAction>, RepairPlanError> {
    if issues.is_empty() {
        return Err(RepairPlanError::NoIssues);
    }
    let mut ordered: Vec<&IntegrationIssue> = issues.iter().collect();
    ordered.sort_by(|a, b| a.ai.cmp(&b.ai));
    Ok(ordered.into_iter().map(|issue| build_action(issue, opts)).collect())
}
