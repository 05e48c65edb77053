//! Git stats extractor (C14): a deterministic, read-only agent over a
//! handful of `git` subprocess invocations. No command ever mutates the
//! repository.

use std::path::Path;
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::process::Command;

use crate::domain::models::{Contributor, GitStats};

async fn run_git(repo_root: &Path, args: &[&str]) -> Result<Option<String>> {
    let output = Command::new("git")
        .arg("-C")
        .arg(repo_root)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .with_context(|| format!("failed to spawn git {}", args.join(" ")))?;

    if !output.status.success() {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string()))
}

fn parse_shortlog(raw: &str) -> Vec<Contributor> {
    raw.lines()
        .filter_map(|line| {
            let line = line.trim();
            let (count, name) = line.split_once('\t')?;
            Some(Contributor { name: name.trim().to_string(), commit_count: count.trim().parse().ok()? })
        })
        .collect()
}

/// Extract commit/contributor/recency statistics for the repository rooted
/// at `repo_root`. Returns [`GitStats::not_a_repository`] (not an error) if
/// `repo_root` is not inside a git working tree — that is a valid, common
/// state this component must tolerate rather than fail on.
pub async fn extract_git_stats(repo_root: &Path) -> Result<GitStats> {
    if run_git(repo_root, &["rev-parse", "--is-inside-work-tree"]).await?.as_deref() != Some("true") {
        return Ok(GitStats::not_a_repository());
    }

    let commit_count = run_git(repo_root, &["rev-list", "--count", "HEAD"])
        .await?
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);

    let head_commit = run_git(repo_root, &["log", "-1", "--format=%H"]).await?.filter(|s| !s.is_empty());

    let contributors = run_git(repo_root, &["shortlog", "-sn", "--all", "--no-merges"])
        .await?
        .map(|raw| parse_shortlog(&raw))
        .unwrap_or_default();

    let recent_commit_count = run_git(repo_root, &["log", "--since=12 months ago", "--format=%H"])
        .await?
        .map(|raw| raw.lines().filter(|l| !l.trim().is_empty()).count() as u64)
        .unwrap_or(0);

    Ok(GitStats { is_repository: true, commit_count, contributors, recent_commit_count, head_commit })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_shortlog_splits_count_and_name() {
        let raw = "   42\tAda Lovelace\n    7\tGrace Hopper\n";
        let contributors = parse_shortlog(raw);
        assert_eq!(contributors.len(), 2);
        assert_eq!(contributors[0].name, "Ada Lovelace");
        assert_eq!(contributors[0].commit_count, 42);
        assert_eq!(contributors[1].commit_count, 7);
    }

    #[test]
    fn parse_shortlog_skips_malformed_lines() {
        let raw = "not a shortlog line\n   3\tReal Name\n";
        let contributors = parse_shortlog(raw);
        assert_eq!(contributors.len(), 1);
        assert_eq!(contributors[0].name, "Real Name");
    }

    #[tokio::test]
    async fn non_repository_path_reports_not_a_repository() {
        let dir = tempfile::tempdir().unwrap();
        let stats = extract_git_stats(dir.path()).await.unwrap();
        assert!(!stats.is_repository);
        assert_eq!(stats.commit_count, 0);
    }
}
