//! Repair action domain model, produced by the repair planner (C10) from a
//! [`crate::domain::models::IntegrationIssue`] set.

use serde::{Deserialize, Serialize};

use super::integration::ComponentKind;

/// The concrete write operation a repair action would perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RepairPrimitive {
    RepairCommands,
    RepairHooks,
    RepairPlugin,
    RepairLocalMcp,
    RepairGlobalMcp,
}

impl RepairPrimitive {
    pub fn for_component(kind: ComponentKind) -> Self {
        match kind {
            ComponentKind::Commands => Self::RepairCommands,
            ComponentKind::Hooks => Self::RepairHooks,
            ComponentKind::Plugin => Self::RepairPlugin,
            ComponentKind::McpLocal => Self::RepairLocalMcp,
            ComponentKind::McpGlobal => Self::RepairGlobalMcp,
        }
    }

    /// The `adopt_and_` prefixed label used when the action requires adopting
    /// an unmanaged artifact.
    pub fn adopt_label(self) -> &'static str {
        match self {
            Self::RepairCommands => "adopt_and_repairCommands",
            Self::RepairHooks => "adopt_and_repairHooks",
            Self::RepairPlugin => "adopt_and_repairPlugin",
            Self::RepairLocalMcp => "adopt_and_repairLocalMCP",
            Self::RepairGlobalMcp => "adopt_and_repairGlobalMCP",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::RepairCommands => "repairCommands",
            Self::RepairHooks => "repairHooks",
            Self::RepairPlugin => "repairPlugin",
            Self::RepairLocalMcp => "repairLocalMCP",
            Self::RepairGlobalMcp => "repairGlobalMCP",
        }
    }
}

/// One concrete, pre-filtered repair action a caller may execute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairAction {
    pub ai: String,
    pub component: ComponentKind,
    pub primitive: RepairPrimitive,
    /// Whether this action should actually run, after gate filtering.
    pub apply: bool,
    pub reason: String,
    pub mutates_global: bool,
    pub requires_adoption: bool,
}

impl RepairAction {
    /// The primitive's label, `adopt_and_`-prefixed when adoption is
    /// required, matching §4.8's naming rule.
    pub fn primitive_label(&self) -> &'static str {
        if self.requires_adoption {
            self.primitive.adopt_label()
        } else {
            self.primitive.label()
        }
    }
}
