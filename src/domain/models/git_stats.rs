//! Git statistics domain model, produced by the git stats extractor (C14).

use serde::{Deserialize, Serialize};

/// One contributor's commit count, as reported by `git shortlog -sn`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contributor {
    pub name: String,
    pub commit_count: u64,
}

/// Deterministic, read-only snapshot of a repository's commit history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitStats {
    pub is_repository: bool,
    pub commit_count: u64,
    pub contributors: Vec<Contributor>,
    /// Commits in the trailing 12 months (`git log --since="12 months ago"`).
    pub recent_commit_count: u64,
    /// The current `HEAD` commit hash, if any commits exist.
    pub head_commit: Option<String>,
}

impl GitStats {
    /// A snapshot for a path that is not a git repository at all.
    pub fn not_a_repository() -> Self {
        Self {
            is_repository: false,
            commit_count: 0,
            contributors: Vec::new(),
            recent_commit_count: 0,
            head_commit: None,
        }
    }
}
