//! Integration report and environment snapshot domain models.
//!
//! These describe the state of a single AI assistant's TaskWing integration
//! (commands, hooks, plugin, local/global MCP registration) and the overall
//! project snapshot produced by the environment probe.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The five integration surfaces probed per AI assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Commands,
    Hooks,
    Plugin,
    McpLocal,
    McpGlobal,
}

/// Whether a component is present, absent, malformed, or present-but-outdated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Ok,
    Missing,
    Invalid,
    Stale,
}

/// Who owns an existing component: TaskWing itself (marker present), a
/// human/other tool (no marker found), or no component at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ownership {
    Managed,
    Unmanaged,
    None,
}

/// Probed state of one integration surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentStatus {
    pub kind: ComponentKind,
    pub status: StatusKind,
    pub ownership: Ownership,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ComponentStatus {
    pub fn new(kind: ComponentKind, status: StatusKind, ownership: Ownership) -> Self {
        Self { kind, status, ownership, detail: None }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// A concrete problem surfaced for one AI's integration, consumed by the
/// repair planner (C10).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationIssue {
    pub ai: String,
    pub kind: ComponentKind,
    pub status: StatusKind,
    pub ownership: Ownership,
    pub detail: String,
    /// True iff `ownership == Managed`: the planner can repair this without
    /// asking the user to adopt someone else's artifact.
    pub auto_fixable: bool,
    /// True iff `ownership == Unmanaged`: repairing this would overwrite an
    /// artifact TaskWing did not create, so it requires an adoption opt-in.
    pub adopt_required: bool,
    /// True for the global MCP surface, which touches state outside the
    /// project directory.
    pub mutates_global: bool,
}

/// Integration state for a single AI assistant across all five surfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationReport {
    pub ai: String,
    pub components: Vec<ComponentStatus>,
}

impl IntegrationReport {
    pub fn new(ai: impl Into<String>, components: Vec<ComponentStatus>) -> Self {
        Self { ai: ai.into(), components }
    }

    pub fn component(&self, kind: ComponentKind) -> Option<&ComponentStatus> {
        self.components.iter().find(|c| c.kind == kind)
    }

    /// Commands/hooks/plugin are managed-but-drifted (present, TaskWing-owned,
    /// yet stale or invalid).
    pub fn managed_local_drift(&self) -> bool {
        [ComponentKind::Commands, ComponentKind::Hooks, ComponentKind::Plugin]
            .iter()
            .filter_map(|k| self.component(*k))
            .any(|c| {
                c.ownership == Ownership::Managed
                    && matches!(c.status, StatusKind::Stale | StatusKind::Invalid)
            })
    }

    /// Any local surface present but owned by something other than TaskWing.
    pub fn unmanaged_drift(&self) -> bool {
        [ComponentKind::Commands, ComponentKind::Hooks, ComponentKind::Plugin]
            .iter()
            .filter_map(|k| self.component(*k))
            .any(|c| c.ownership == Ownership::Unmanaged && c.status != StatusKind::Missing)
    }

    /// The global MCP registration is managed but stale/invalid.
    pub fn global_mcp_drift(&self) -> bool {
        self.component(ComponentKind::McpGlobal)
            .is_some_and(|c| {
                c.ownership == Ownership::Managed
                    && matches!(c.status, StatusKind::Stale | StatusKind::Invalid)
            })
    }

    /// A component looks like it could be a TaskWing integration (naming
    /// conventions match) but carries no marker, so it is unmanaged rather
    /// than ours.
    pub fn taskwing_like_unmanaged(&self) -> bool {
        self.components
            .iter()
            .any(|c| c.ownership == Ownership::Unmanaged && c.status == StatusKind::Invalid)
    }

    /// Flatten every non-`Ok` component into an issue for the repair planner.
    pub fn issues(&self) -> Vec<IntegrationIssue> {
        self.components
            .iter()
            .filter(|c| c.status != StatusKind::Ok)
            .map(|c| IntegrationIssue {
                ai: self.ai.clone(),
                kind: c.kind,
                status: c.status,
                ownership: c.ownership,
                detail: c.detail.clone().unwrap_or_default(),
                auto_fixable: c.ownership == Ownership::Managed,
                adopt_required: c.ownership == Ownership::Unmanaged,
                mutates_global: c.kind == ComponentKind::McpGlobal,
            })
            .collect()
    }
}

/// A full environment probe result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub project_root: PathBuf,
    pub is_git_repository: bool,
    pub source_file_count: usize,
    /// True when the scan hit the bounded-scan cap (§3) before finishing.
    pub source_file_count_capped: bool,
    pub reports: Vec<IntegrationReport>,
}

impl Snapshot {
    pub fn all_issues(&self) -> Vec<IntegrationIssue> {
        self.reports.iter().flat_map(IntegrationReport::issues).collect()
    }

    pub fn has_any_drift(&self) -> bool {
        self.reports.iter().any(|r| {
            r.managed_local_drift() || r.unmanaged_drift() || r.global_mcp_drift()
        })
    }
}
