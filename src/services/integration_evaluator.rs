//! Integration evaluator (C9): probes each supported AI assistant's
//! filesystem footprint for commands, hooks, plugin and MCP registration,
//! classifying ownership via an embedded marker and status via presence,
//! structure and staleness.

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::domain::models::integration::{
    ComponentKind, ComponentStatus, IntegrationReport, Ownership, StatusKind,
};

/// The canonical MCP server key TaskWing registers under. Older installs
/// used a handful of other keys; finding one of those instead of this is a
/// legacy-key condition, not an absence.
pub const CANONICAL_MCP_NAME: &str = "taskwing-mcp";

/// MCP keys from prior releases, recognized so a re-run can flag them as
/// stale rather than reporting the integration as entirely missing.
const LEGACY_MCP_KEYS: &[&str] = &["taskwing", "task-wing-mcp"];

/// Current marker version. A managed file carrying an older version number
/// is reported `Stale`; one carrying no version number at all is treated as
/// version 1 for backward compatibility with earlier marker text.
const CURRENT_MARKER_VERSION: u32 = 1;

struct AssistantLayout {
    name: &'static str,
    commands_dir: &'static str,
    hooks_file: Option<&'static str>,
    plugin_file: Option<&'static str>,
    mcp_local_file: Option<&'static str>,
}

const ASSISTANTS: &[AssistantLayout] = &[
    AssistantLayout {
        name: "claude",
        commands_dir: ".claude/commands",
        hooks_file: Some(".claude/settings.json"),
        plugin_file: None,
        mcp_local_file: Some(".claude/mcp.json"),
    },
    AssistantLayout {
        name: "cursor",
        commands_dir: ".cursor/rules",
        hooks_file: None,
        plugin_file: None,
        mcp_local_file: Some(".cursor/mcp.json"),
    },
    AssistantLayout {
        name: "gemini",
        commands_dir: ".gemini/commands",
        hooks_file: None,
        plugin_file: None,
        mcp_local_file: Some(".gemini/mcp.json"),
    },
    AssistantLayout {
        name: "codex",
        commands_dir: ".codex/commands",
        hooks_file: None,
        plugin_file: None,
        mcp_local_file: None,
    },
    AssistantLayout {
        name: "opencode",
        commands_dir: ".opencode/commands",
        hooks_file: None,
        plugin_file: Some(".opencode/plugins/taskwing-hooks.js"),
        mcp_local_file: Some(".opencode/mcp.json"),
    },
];

fn marker_version(content: &str) -> Option<u32> {
    let re = Regex::new(r"TASKWING_MANAGED(?:[_ ][Vv](\d+))?").expect("static regex");
    re.captures(content)
        .map(|c| c.get(1).and_then(|m| m.as_str().parse().ok()).unwrap_or(1))
}

fn read(path: &Path) -> Option<String> {
    std::fs::read_to_string(path).ok()
}

fn probe_single_file(root: &Path, relative: &str) -> ComponentStatus {
    let path = root.join(relative);
    match read(&path) {
        None => ComponentStatus::new(ComponentKind::Hooks, StatusKind::Missing, Ownership::None),
        Some(content) => match marker_version(&content) {
            Some(version) if version < CURRENT_MARKER_VERSION => {
                ComponentStatus::new(ComponentKind::Hooks, StatusKind::Stale, Ownership::Managed)
                    .with_detail(format!("marker version {version} is older than {CURRENT_MARKER_VERSION}"))
            }
            Some(_) => {
                if content.contains("hook continue-check") {
                    ComponentStatus::new(ComponentKind::Hooks, StatusKind::Ok, Ownership::Managed)
                } else {
                    ComponentStatus::new(ComponentKind::Hooks, StatusKind::Invalid, Ownership::Managed)
                        .with_detail("managed hooks file is missing the Stop continue-check entry")
                }
            }
            None => ComponentStatus::new(ComponentKind::Hooks, StatusKind::Invalid, Ownership::Unmanaged)
                .with_detail("file exists but carries no TaskWing marker"),
        },
    }
}

fn probe_directory(root: &Path, relative: &str, kind: ComponentKind) -> ComponentStatus {
    let dir = root.join(relative);
    if !dir.is_dir() {
        return ComponentStatus::new(kind, StatusKind::Missing, Ownership::None);
    }
    let entries: Vec<PathBuf> = std::fs::read_dir(&dir)
        .map(|rd| rd.filter_map(|e| e.ok().map(|e| e.path())).collect())
        .unwrap_or_default();
    if entries.is_empty() {
        return ComponentStatus::new(kind, StatusKind::Invalid, Ownership::Unmanaged)
            .with_detail("directory exists but is empty");
    }
    let mut best_version: Option<u32> = None;
    let mut any_unmanaged = false;
    for entry in &entries {
        match read(entry).and_then(|c| marker_version(&c)) {
            Some(v) => best_version = Some(best_version.map_or(v, |b: u32| b.max(v))),
            None => any_unmanaged = true,
        }
    }
    match best_version {
        Some(v) if v < CURRENT_MARKER_VERSION => {
            ComponentStatus::new(kind, StatusKind::Stale, Ownership::Managed)
        }
        Some(_) => ComponentStatus::new(kind, StatusKind::Ok, Ownership::Managed),
        None if any_unmanaged => ComponentStatus::new(kind, StatusKind::Invalid, Ownership::Unmanaged)
            .with_detail("commands present but carry no TaskWing marker"),
        None => ComponentStatus::new(kind, StatusKind::Missing, Ownership::None),
    }
}

fn probe_mcp_local(root: &Path, relative: Option<&str>) -> ComponentStatus {
    let Some(relative) = relative else {
        return ComponentStatus::new(ComponentKind::McpLocal, StatusKind::Missing, Ownership::None);
    };
    let path = root.join(relative);
    match read(&path) {
        None => ComponentStatus::new(ComponentKind::McpLocal, StatusKind::Missing, Ownership::None),
        Some(content) => classify_mcp(&content, ComponentKind::McpLocal),
    }
}

/// Root keys different assistants nest their MCP server table under.
const SERVER_TABLE_KEYS: &[&str] = &["mcpServers", "servers", "mcp"];

/// Classify an MCP registration file by parsing its server table and
/// inspecting the exact key TaskWing (or a past version of it) registered
/// under, rather than substring-matching the raw file content — a
/// non-canonical key like `taskwing-mcp-my-project` contains `taskwing-mcp`
/// as a substring but is not the same key.
fn classify_mcp(content: &str, kind: ComponentKind) -> ComponentStatus {
    let value: serde_json::Value = match serde_json::from_str(content) {
        Err(_) => {
            return ComponentStatus::new(kind, StatusKind::Invalid, Ownership::Unmanaged)
                .with_detail("mcp config is not valid JSON")
        }
        Ok(v) => v,
    };
    let servers = SERVER_TABLE_KEYS.iter().find_map(|key| value.get(key).and_then(|v| v.as_object()));
    let Some(servers) = servers else {
        return ComponentStatus::new(kind, StatusKind::Invalid, Ownership::Unmanaged)
            .with_detail("mcp config present but does not reference TaskWing");
    };

    if servers.contains_key(CANONICAL_MCP_NAME) {
        return match marker_version(content) {
            Some(v) if v < CURRENT_MARKER_VERSION => {
                ComponentStatus::new(kind, StatusKind::Stale, Ownership::Managed)
                    .with_detail(format!("marker version {v} is older than {CURRENT_MARKER_VERSION}"))
            }
            _ => ComponentStatus::new(kind, StatusKind::Ok, Ownership::Managed),
        };
    }
    if let Some(legacy_key) = LEGACY_MCP_KEYS.iter().find(|k| servers.contains_key(**k)) {
        return ComponentStatus::new(kind, StatusKind::Stale, Ownership::Managed)
            .with_detail(format!("registered under a legacy MCP key '{legacy_key}'"));
    }
    if let Some(other_key) = servers.keys().find(|k| k.contains("taskwing") || k.contains("task-wing")) {
        return ComponentStatus::new(kind, StatusKind::Invalid, Ownership::Managed).with_detail(format!(
            "non-canonical MCP server key '{other_key}' found (expected '{CANONICAL_MCP_NAME}')"
        ));
    }
    ComponentStatus::new(kind, StatusKind::Invalid, Ownership::Unmanaged)
        .with_detail("mcp config present but does not reference TaskWing")
}

/// Probe every supported AI assistant against `project_root`. `global_mcp_config`
/// is the (optional) path to the user's global MCP registration file, read
/// once and shared across every assistant's `mcp_global` check.
pub fn evaluate(project_root: &Path, global_mcp_config: Option<&Path>) -> Vec<IntegrationReport> {
    let global_mcp_content = global_mcp_config.and_then(read);

    ASSISTANTS
        .iter()
        .map(|assistant| {
            let commands = probe_directory(project_root, assistant.commands_dir, ComponentKind::Commands);
            let hooks = match assistant.hooks_file {
                Some(relative) => probe_single_file(project_root, relative),
                None => ComponentStatus::new(ComponentKind::Hooks, StatusKind::Missing, Ownership::None),
            };
            let plugin = match assistant.plugin_file {
                Some(relative) => match read(&project_root.join(relative)) {
                    Some(content) => match marker_version(&content) {
                        Some(v) if v < CURRENT_MARKER_VERSION => {
                            ComponentStatus::new(ComponentKind::Plugin, StatusKind::Stale, Ownership::Managed)
                        }
                        Some(_) => ComponentStatus::new(ComponentKind::Plugin, StatusKind::Ok, Ownership::Managed),
                        None => ComponentStatus::new(ComponentKind::Plugin, StatusKind::Invalid, Ownership::Unmanaged),
                    },
                    None => ComponentStatus::new(ComponentKind::Plugin, StatusKind::Missing, Ownership::None),
                },
                None => ComponentStatus::new(ComponentKind::Plugin, StatusKind::Missing, Ownership::None),
            };
            let mcp_local = probe_mcp_local(project_root, assistant.mcp_local_file);
            let mcp_global = match &global_mcp_content {
                Some(content) => classify_mcp(content, ComponentKind::McpGlobal),
                None => ComponentStatus::new(ComponentKind::McpGlobal, StatusKind::Missing, Ownership::None),
            };

            IntegrationReport::new(assistant.name, vec![commands, hooks, plugin, mcp_local, mcp_global])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_commands_directory_reports_missing() {
        let dir = tempdir().unwrap();
        let reports = evaluate(dir.path(), None);
        let claude = reports.iter().find(|r| r.ai == "claude").unwrap();
        assert_eq!(claude.component(ComponentKind::Commands).unwrap().status, StatusKind::Missing);
    }

    #[test]
    fn managed_commands_directory_reports_ok() {
        let dir = tempdir().unwrap();
        let commands_dir = dir.path().join(".claude/commands");
        std::fs::create_dir_all(&commands_dir).unwrap();
        std::fs::write(commands_dir.join("plan.md"), "<!-- TASKWING_MANAGED_V1 -->\n# plan").unwrap();
        let reports = evaluate(dir.path(), None);
        let claude = reports.iter().find(|r| r.ai == "claude").unwrap();
        let commands = claude.component(ComponentKind::Commands).unwrap();
        assert_eq!(commands.status, StatusKind::Ok);
        assert_eq!(commands.ownership, Ownership::Managed);
    }

    #[test]
    fn unmanaged_commands_directory_is_invalid() {
        let dir = tempdir().unwrap();
        let commands_dir = dir.path().join(".claude/commands");
        std::fs::create_dir_all(&commands_dir).unwrap();
        std::fs::write(commands_dir.join("plan.md"), "# hand-written plan command").unwrap();
        let reports = evaluate(dir.path(), None);
        let claude = reports.iter().find(|r| r.ai == "claude").unwrap();
        let commands = claude.component(ComponentKind::Commands).unwrap();
        assert_eq!(commands.ownership, Ownership::Unmanaged);
    }

    #[test]
    fn hooks_missing_stop_entry_is_invalid() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".claude")).unwrap();
        std::fs::write(
            dir.path().join(".claude/settings.json"),
            r#"{"_taskwing_managed": "TASKWING_MANAGED_V1", "hooks": {}}"#,
        )
        .unwrap();
        let reports = evaluate(dir.path(), None);
        let claude = reports.iter().find(|r| r.ai == "claude").unwrap();
        assert_eq!(claude.component(ComponentKind::Hooks).unwrap().status, StatusKind::Invalid);
    }

    #[test]
    fn hooks_with_stop_continue_check_is_ok() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".claude")).unwrap();
        std::fs::write(
            dir.path().join(".claude/settings.json"),
            r#"{"_taskwing_managed": "TASKWING_MANAGED_V1", "hooks": {"Stop": ["taskwing hook continue-check"]}}"#,
        )
        .unwrap();
        let reports = evaluate(dir.path(), None);
        let claude = reports.iter().find(|r| r.ai == "claude").unwrap();
        assert_eq!(claude.component(ComponentKind::Hooks).unwrap().status, StatusKind::Ok);
    }

    #[test]
    fn legacy_mcp_key_is_flagged_stale() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".cursor")).unwrap();
        std::fs::write(dir.path().join(".cursor/mcp.json"), r#"{"mcpServers": {"taskwing": {}}}"#).unwrap();
        let reports = evaluate(dir.path(), None);
        let cursor = reports.iter().find(|r| r.ai == "cursor").unwrap();
        let mcp = cursor.component(ComponentKind::McpLocal).unwrap();
        assert_eq!(mcp.status, StatusKind::Stale);
    }

    #[test]
    fn non_canonical_mcp_key_is_flagged_invalid() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".cursor")).unwrap();
        std::fs::write(
            dir.path().join(".cursor/mcp.json"),
            r#"{"mcpServers": {"taskwing-mcp-my-project": {}}}"#,
        )
        .unwrap();
        let reports = evaluate(dir.path(), None);
        let cursor = reports.iter().find(|r| r.ai == "cursor").unwrap();
        let mcp = cursor.component(ComponentKind::McpLocal).unwrap();
        assert_eq!(mcp.status, StatusKind::Invalid);
        assert_eq!(mcp.ownership, Ownership::Managed);
        assert_eq!(
            mcp.detail.as_deref(),
            Some("non-canonical MCP server key 'taskwing-mcp-my-project' found (expected 'taskwing-mcp')")
        );
    }

    #[test]
    fn canonical_mcp_key_is_ok() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".cursor")).unwrap();
        std::fs::write(
            dir.path().join(".cursor/mcp.json"),
            format!(r#"{{"mcpServers": {{"{CANONICAL_MCP_NAME}": {{}}}}, "_marker": "TASKWING_MANAGED_V1"}}"#),
        )
        .unwrap();
        let reports = evaluate(dir.path(), None);
        let cursor = reports.iter().find(|r| r.ai == "cursor").unwrap();
        let mcp = cursor.component(ComponentKind::McpLocal).unwrap();
        assert_eq!(mcp.status, StatusKind::Ok);
    }
}
