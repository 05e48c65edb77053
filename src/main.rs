//! TaskWing demo binary.
//!
//! Proves that the library links and runs end to end: it probes a project
//! directory the way the real engine would during bootstrap, then prints
//! either a human-readable summary or a JSON snapshot. Argument parsing is
//! intentionally hand-rolled rather than framework-driven (§A): at most one
//! positional path and an optional `--json` flag.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use taskwing_core::domain::models::Snapshot;
use taskwing_core::infrastructure::config::ConfigLoader;
use taskwing_core::services::bootstrap_planner::{self, BootstrapFlags, ProjectState};
use taskwing_core::services::{git_stats, integration_evaluator};

struct Args {
    project_root: PathBuf,
    json: bool,
}

fn parse_args() -> Result<Args> {
    let mut project_root = None;
    let mut json = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            "-h" | "--help" => {
                println!("usage: taskwing [path] [--json]");
                std::process::exit(0);
            }
            other if project_root.is_none() => project_root = Some(PathBuf::from(other)),
            other => anyhow::bail!("unexpected argument: {other}"),
        }
    }
    let project_root = match project_root {
        Some(p) => p,
        None => std::env::current_dir().context("failed to read current directory")?,
    };
    Ok(Args { project_root, json })
}

fn project_state(project_root: &Path) -> ProjectState {
    let marker = project_root.join(".taskwing");
    if !marker.is_dir() {
        return ProjectState::Missing;
    }
    if marker.join("config.yaml").is_file() {
        ProjectState::Ok
    } else {
        ProjectState::PartialOrInvalid
    }
}

/// Count source files under `root`, skipping VCS/build directories, bounded
/// by `cap` (§5's scanner cap). Returns the count and whether the cap was
/// hit before the walk finished.
fn count_source_files(root: &Path, cap: usize) -> (usize, bool) {
    const SKIP_DIRS: &[&str] = &[".git", ".taskwing", "target", "node_modules", "dist", "build"];

    let mut stack = vec![root.to_path_buf()];
    let mut count = 0usize;
    while let Some(dir) = stack.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else { continue };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
                if !SKIP_DIRS.contains(&name) {
                    stack.push(path);
                }
            } else {
                count += 1;
                if count >= cap {
                    return (count, true);
                }
            }
        }
    }
    (count, false)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args()?;
    let config = ConfigLoader::load().context("failed to load configuration")?;

    let log_config = taskwing_core::infrastructure::logging::LogConfig {
        level: config.logging.level.clone(),
        ..Default::default()
    };
    let _logger = taskwing_core::infrastructure::logging::LoggerInit::init(&log_config)
        .context("failed to initialize logging")?;

    let git = git_stats::extract_git_stats(&args.project_root)
        .await
        .context("failed to extract git statistics")?;
    let reports = integration_evaluator::evaluate(&args.project_root, None);
    let (source_file_count, capped) =
        count_source_files(&args.project_root, config.source_scan_cap);

    let snapshot = Snapshot {
        project_root: args.project_root.clone(),
        is_git_repository: git.is_repository,
        source_file_count,
        source_file_count_capped: capped,
        reports,
    };

    let state = project_state(&args.project_root);
    let plan = bootstrap_planner::plan_bootstrap(
        &snapshot,
        state,
        false,
        BootstrapFlags { force: config.bootstrap.force, skip_index: config.bootstrap.skip_index, skip_init: config.bootstrap.skip_init },
    )
    .context("failed to compute bootstrap plan")?;

    if args.json {
        let output = serde_json::json!({
            "snapshot": snapshot,
            "git_stats": git,
            "plan": plan,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("TaskWing bootstrap report for {}", snapshot.project_root.display());
        println!("  mode: {:?}", plan.mode);
        println!("  source files: {}{}", snapshot.source_file_count, if capped { " (capped)" } else { "" });
        println!("  git repository: {} ({} commits)", git.is_repository, git.commit_count);
        if !plan.actions.is_empty() {
            println!("  actions:");
            for action in &plan.actions {
                println!("    - {}", action.description);
            }
        }
        for warning in &plan.warnings {
            println!("  warning: {warning}");
        }
    }

    Ok(())
}
