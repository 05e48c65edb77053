//! Bootstrap planner (C11): validates CLI flags, reads a [`Snapshot`] of the
//! project/integration state, and decides which of six mutually exclusive
//! modes applies, then materializes the ordered actions for that mode.

use crate::domain::error::BootstrapError;
use crate::domain::models::{BootstrapAction, BootstrapPlan, Mode, Snapshot};

/// Large-project guard: above this many source files, `index_code` is
/// dropped from the plan unless the caller forces it.
pub const LARGE_PROJECT_THRESHOLD: usize = 5000;

/// Whether a TaskWing project has been bootstrapped here before.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectState {
    /// No `.taskwing` directory (or equivalent marker) exists yet.
    Missing,
    /// A `.taskwing` directory exists but its contents are incomplete or
    /// fail structural validation.
    PartialOrInvalid,
    Ok,
}

/// The subset of CLI flags the bootstrap planner reasons about.
#[derive(Debug, Clone, Copy, Default)]
pub struct BootstrapFlags {
    pub force: bool,
    pub skip_index: bool,
    pub skip_init: bool,
}

fn validate_flags(flags: BootstrapFlags) -> Result<(), BootstrapError> {
    if flags.skip_index && flags.force {
        return Err(BootstrapError::ConflictingFlags("--skip-index and --force".to_string()));
    }
    Ok(())
}

fn has_local_ai_presence(snapshot: &Snapshot) -> bool {
    use crate::domain::models::{ComponentKind, StatusKind};
    snapshot.reports.iter().any(|report| {
        [ComponentKind::Commands, ComponentKind::Hooks, ComponentKind::Plugin, ComponentKind::McpLocal]
            .iter()
            .filter_map(|k| report.component(*k))
            .any(|c| c.status != StatusKind::Missing)
    })
}

fn determine_mode(snapshot: &Snapshot, project_state: ProjectState, global_mcp_exists: bool) -> Mode {
    match project_state {
        ProjectState::Missing => Mode::FirstTime,
        ProjectState::PartialOrInvalid => Mode::Repair,
        ProjectState::Ok => {
            if snapshot.has_any_drift() {
                Mode::Repair
            } else if !has_local_ai_presence(snapshot) && !global_mcp_exists {
                Mode::Reconfigure
            } else {
                Mode::Run
            }
        }
    }
}

fn index_code_action(snapshot: &Snapshot, flags: BootstrapFlags) -> (Option<BootstrapAction>, Option<String>) {
    if flags.skip_index {
        return (None, None);
    }
    if snapshot.source_file_count > LARGE_PROJECT_THRESHOLD && !flags.force {
        let warning = format!(
            "skipping index_code: {} source files exceeds the guard threshold of {} (pass --force to override)",
            snapshot.source_file_count, LARGE_PROJECT_THRESHOLD
        );
        return (None, Some(warning));
    }
    (Some(BootstrapAction::new("index_code")), None)
}

fn build_actions(mode: Mode, snapshot: &Snapshot, global_mcp_exists: bool, flags: BootstrapFlags) -> BootstrapPlan {
    let mut plan = BootstrapPlan::new(mode);
    match mode {
        Mode::FirstTime => {
            if !flags.skip_init {
                plan = plan.with_action(BootstrapAction::new("initialize .taskwing project structure"));
            }
            plan = plan.with_action(if global_mcp_exists {
                BootstrapAction::new("select AI assistant integrations to enable")
                    .with_reason("suggested from existing global MCP registration")
            } else {
                BootstrapAction::new("select AI assistant integrations to enable")
            });
            let (index, warning) = index_code_action(snapshot, flags);
            if let Some(action) = index {
                plan = plan.with_action(action);
            }
            if let Some(warning) = warning {
                plan = plan.with_skip_justification(warning.clone()).with_warning(warning);
            }
            plan = plan.with_action(BootstrapAction::new("ingest initial project knowledge"));
        }
        Mode::Repair => {
            plan = plan
                .with_action(BootstrapAction::new("re-run integration repair for flagged AIs"))
                .with_reason("project or integration state has drifted since last bootstrap");
        }
        Mode::Reconfigure => {
            plan = plan.with_action(
                BootstrapAction::new("prompt for AI assistant integration selection")
                    .with_reason("no local AI integration and no global MCP registration found"),
            );
        }
        Mode::Run => {
            plan = plan.with_action(BootstrapAction::new("proceed to project analysis"));
        }
        Mode::Noop | Mode::Error => {}
    }
    plan
}

/// Validate flags, decide the mode, and materialize the bootstrap plan.
pub fn plan_bootstrap(
    snapshot: &Snapshot,
    project_state: ProjectState,
    global_mcp_exists: bool,
    flags: BootstrapFlags,
) -> Result<BootstrapPlan, BootstrapError> {
    validate_flags(flags)?;

    if flags.skip_init && project_state == ProjectState::Missing {
        return Ok(BootstrapPlan::new(Mode::Error)
            .with_reason("--skip-init was set but no TaskWing project exists to skip initializing"));
    }

    let mode = determine_mode(snapshot, project_state, global_mcp_exists);
    Ok(build_actions(mode, snapshot, global_mcp_exists, flags))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ComponentKind, ComponentStatus, IntegrationReport, Ownership, StatusKind};
    use std::path::PathBuf;

    fn empty_snapshot(source_file_count: usize) -> Snapshot {
        Snapshot {
            project_root: PathBuf::from("/tmp/project"),
            is_git_repository: true,
            source_file_count,
            source_file_count_capped: false,
            reports: vec![],
        }
    }

    #[test]
    fn conflicting_flags_is_an_error() {
        let flags = BootstrapFlags { force: true, skip_index: true, skip_init: false };
        let err = plan_bootstrap(&empty_snapshot(0), ProjectState::Ok, false, flags).unwrap_err();
        assert!(matches!(err, BootstrapError::ConflictingFlags(_)));
    }

    #[test]
    fn missing_project_is_first_time() {
        let plan = plan_bootstrap(
            &empty_snapshot(10),
            ProjectState::Missing,
            false,
            BootstrapFlags::default(),
        )
        .unwrap();
        assert_eq!(plan.mode, Mode::FirstTime);
        assert!(plan.is_actionable());
    }

    #[test]
    fn skip_init_with_missing_project_errors_out() {
        let flags = BootstrapFlags { skip_init: true, ..Default::default() };
        let plan = plan_bootstrap(&empty_snapshot(0), ProjectState::Missing, false, flags).unwrap();
        assert_eq!(plan.mode, Mode::Error);
        assert!(!plan.is_actionable());
    }

    #[test]
    fn partial_project_is_repair() {
        let plan = plan_bootstrap(
            &empty_snapshot(0),
            ProjectState::PartialOrInvalid,
            false,
            BootstrapFlags::default(),
        )
        .unwrap();
        assert_eq!(plan.mode, Mode::Repair);
    }

    #[test]
    fn ok_project_with_drift_is_repair() {
        let snapshot = Snapshot {
            reports: vec![IntegrationReport::new(
                "claude",
                vec![ComponentStatus::new(ComponentKind::Commands, StatusKind::Stale, Ownership::Managed)],
            )],
            ..empty_snapshot(0)
        };
        let plan = plan_bootstrap(&snapshot, ProjectState::Ok, false, BootstrapFlags::default()).unwrap();
        assert_eq!(plan.mode, Mode::Repair);
    }

    #[test]
    fn ok_project_with_no_local_ai_and_no_global_mcp_is_reconfigure() {
        let plan = plan_bootstrap(&empty_snapshot(0), ProjectState::Ok, false, BootstrapFlags::default()).unwrap();
        assert_eq!(plan.mode, Mode::Reconfigure);
    }

    #[test]
    fn ok_project_with_local_ai_is_run() {
        let snapshot = Snapshot {
            reports: vec![IntegrationReport::new(
                "claude",
                vec![ComponentStatus::new(ComponentKind::Commands, StatusKind::Ok, Ownership::Managed)],
            )],
            ..empty_snapshot(0)
        };
        let plan = plan_bootstrap(&snapshot, ProjectState::Ok, false, BootstrapFlags::default()).unwrap();
        assert_eq!(plan.mode, Mode::Run);
    }

    #[test]
    fn large_project_without_force_drops_index_code_with_warning() {
        let plan = plan_bootstrap(
            &empty_snapshot(6000),
            ProjectState::Missing,
            false,
            BootstrapFlags::default(),
        )
        .unwrap();
        assert!(plan.actions.iter().all(|a| a.description != "index_code"));
        assert!(!plan.warnings.is_empty());
        assert!(!plan.skip_justifications.is_empty());
    }

    #[test]
    fn large_project_with_force_keeps_index_code() {
        let flags = BootstrapFlags { force: true, ..Default::default() };
        let plan = plan_bootstrap(&empty_snapshot(6000), ProjectState::Missing, false, flags).unwrap();
        assert!(plan.actions.iter().any(|a| a.description == "index_code"));
    }
}
