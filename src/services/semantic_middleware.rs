//! Semantic middleware (C5): after schema validation, a generated plan is
//! checked against the real filesystem — every path-shaped token mentioned
//! in a task is resolved or recovered, and every validation-step command is
//! dry-run through an injected [`ShellValidator`].

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::domain::error::SemanticError;
use crate::domain::models::finding::Confidence;
use crate::domain::models::plan::{PlanResponse, TaskSchema};
use crate::domain::ports::ShellValidator;

/// Upper bound on how many path-like tokens a single text blob will yield,
/// to keep recovery bounded on pathological input.
const MAX_CANDIDATES: usize = 200;

/// Verbs that, within 50 characters before a path mention, mark it as
/// describing a file to be created rather than one that must already exist.
const CREATION_VERBS: &[&str] =
    &["create", "add", "new", "generate", "write", "initialize", "scaffold", "setup", "make"];

/// Tokens that match the path regexes but are never real paths.
const KNOWN_FALSE_POSITIVES: &[&str] = &["e.g.", "i.e.", "etc.", "vs.", "a.k.a."];

/// Directories searched by the medium/high recovery tiers, in priority
/// order for tier 3.
const RECOVERY_ROOTS: &[&str] = &["internal/", "pkg/", "cmd/", "src/", "lib/"];

/// A path-shaped token found in a text blob, with its byte offset so the
/// caller can check the preceding context for a creation verb.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Mention {
    text: String,
    start: usize,
}

fn looks_like_url_or_false_positive(candidate: &str) -> bool {
    let lower = candidate.to_lowercase();
    if lower.contains("http://") || lower.contains("https://") {
        return true;
    }
    if KNOWN_FALSE_POSITIVES.contains(&lower.as_str()) {
        return true;
    }
    if candidate.chars().filter(|c| c.is_alphanumeric()).count() < 3 {
        return true;
    }
    // A bare "word.tld"-looking token (no path separator, TLD-shaped
    // suffix) is much more likely a URL/domain than a source path.
    if !candidate.contains('/') && (lower.ends_with(".com") || lower.ends_with(".org") || lower.ends_with(".net")) {
        return true;
    }
    false
}

fn path_regexes() -> [Regex; 3] {
    [
        // Absolute paths with a recognized extension.
        Regex::new(r"/[A-Za-z0-9_.\-]+(?:/[A-Za-z0-9_.\-]+)*\.[A-Za-z0-9]{1,10}").expect("static regex"),
        // Relative paths (at least one separator) with a recognized extension.
        Regex::new(r"[A-Za-z0-9_.\-]+(?:/[A-Za-z0-9_.\-]+)+\.[A-Za-z0-9]{1,10}").expect("static regex"),
        // Backtick- or quote-enclosed paths, with or without a separator.
        Regex::new(r#"[`'"]([A-Za-z0-9_./\-]+\.[A-Za-z0-9]{1,10})[`'"]"#).expect("static regex"),
    ]
}

/// Extract every path-shaped mention from `text`, deduplicated by matched
/// text and byte offset, filtered for URLs/false positives/too-short
/// tokens, and bounded to [`MAX_CANDIDATES`].
fn extract_mentions(text: &str) -> Vec<Mention> {
    let mut mentions = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for (family, re) in path_regexes().iter().enumerate() {
        for m in re.find_iter(text) {
            let (matched, start) = if family == 2 {
                // The quoted-path family's capture group excludes the
                // enclosing quote/backtick; recompute the inner span.
                match re.captures(&text[m.start()..m.end()]) {
                    Some(caps) => {
                        let inner = caps.get(1).unwrap();
                        (inner.as_str(), m.start() + inner.start())
                    }
                    None => continue,
                }
            } else {
                (m.as_str(), m.start())
            };

            if looks_like_url_or_false_positive(matched) {
                continue;
            }
            let key = (matched.to_string(), start);
            if seen.insert(key) {
                mentions.push(Mention { text: matched.to_string(), start });
            }
            if mentions.len() >= MAX_CANDIDATES {
                return mentions;
            }
        }
    }
    mentions
}

/// Extract just the path text of every candidate mention in `text`,
/// ignoring creation-context and ordering. Exposed for callers that only
/// want the raw candidate list (e.g. diagnostics, tests).
pub fn extract_candidate_paths(text: &str) -> Vec<String> {
    extract_mentions(text).into_iter().map(|m| m.text).collect()
}

/// True if any creation verb appears in the 50 characters preceding
/// `start`, meaning this mention describes a file to be written rather than
/// one that must already exist.
fn is_creation_context(text: &str, start: usize) -> bool {
    let window_start = start.saturating_sub(50);
    // `start` and `window_start` are byte offsets into `text`; find.earlier
    // char boundary to avoid slicing mid-codepoint.
    let mut boundary = window_start;
    while boundary < text.len() && !text.is_char_boundary(boundary) {
        boundary += 1;
    }
    let preceding = &text[boundary..start.min(text.len())];
    let lower = preceding.to_lowercase();
    CREATION_VERBS.iter().any(|verb| lower.contains(verb))
}

fn normalize(path: &str) -> String {
    path.trim_start_matches("./").to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for i in 1..=a.len() {
        let mut prev = row[0];
        row[0] = i;
        for j in 1..=b.len() {
            let temp = row[j];
            row[j] = if a[i - 1] == b[j - 1] {
                prev
            } else {
                1 + prev.min(row[j]).min(row[j - 1])
            };
            prev = temp;
        }
    }
    row[b.len()]
}

/// The outcome of attempting to resolve one referenced path against the
/// project tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredPath {
    pub original: String,
    pub resolved: Option<PathBuf>,
    pub confidence: Confidence,
    /// True iff `resolved` differs from the literal candidate — i.e. this
    /// is a correction, not a direct hit.
    pub recovered: bool,
}

fn found(candidate: &str, project_root: &Path, path: &PathBuf, confidence: Confidence, recovered: bool) -> RecoveredPath {
    RecoveredPath {
        original: candidate.to_string(),
        resolved: Some(project_root.join(path)),
        confidence,
        recovered,
    }
}

/// Resolve a single candidate path against the project tree, given every
/// file already known to exist under `project_root` (relative paths).
///
/// Recovery priority when the literal candidate does not exist: (1) exact
/// basename anywhere with exactly one match → high; (2) basename under
/// `internal/*` or `pkg/*` with exactly one match → high; (3)
/// case-insensitive basename under `{internal,pkg,cmd,src,lib}` → medium;
/// (4) fuzzy name match (prefix containment, or Levenshtein ≤ 2 for names ≤
/// 10 chars) with identical extension → low.
pub fn recover_path(candidate: &str, project_root: &Path, known_files: &[PathBuf]) -> RecoveredPath {
    let normalized = normalize(candidate);
    let normalized_path = PathBuf::from(&normalized);
    if known_files.iter().any(|f| f == &normalized_path) {
        return found(candidate, project_root, &normalized_path, Confidence::High, false);
    }

    let wanted_name = normalized_path.file_name();
    let basename_matches: Vec<&PathBuf> = known_files.iter().filter(|f| f.file_name() == wanted_name).collect();

    if basename_matches.len() == 1 {
        return found(candidate, project_root, basename_matches[0], Confidence::High, true);
    }

    let under_internal_pkg: Vec<&&PathBuf> = basename_matches
        .iter()
        .filter(|f| {
            let s = f.to_string_lossy();
            s.starts_with("internal/") || s.starts_with("pkg/")
        })
        .collect();
    if under_internal_pkg.len() == 1 {
        return found(candidate, project_root, under_internal_pkg[0], Confidence::High, true);
    }

    if let Some(wanted_lower) = wanted_name.map(|n| n.to_string_lossy().to_lowercase()) {
        let ci_matches: Vec<&PathBuf> = known_files
            .iter()
            .filter(|f| {
                let s = f.to_string_lossy();
                RECOVERY_ROOTS.iter().any(|root| s.starts_with(root))
                    && f.file_name().map(|n| n.to_string_lossy().to_lowercase()) == Some(wanted_lower.clone())
            })
            .collect();
        if ci_matches.len() == 1 {
            return found(candidate, project_root, ci_matches[0], Confidence::Medium, true);
        }

        let wanted_stem = Path::new(&wanted_lower).file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
        let wanted_ext = Path::new(&wanted_lower).extension().map(|e| e.to_string_lossy().to_string());
        let fuzzy_matches: Vec<&PathBuf> = known_files
            .iter()
            .filter(|f| {
                let ext_matches = f.extension().map(|e| e.to_string_lossy().to_lowercase()) == wanted_ext;
                if !ext_matches {
                    return false;
                }
                let stem = f.file_stem().map(|s| s.to_string_lossy().to_lowercase()).unwrap_or_default();
                if stem.contains(&wanted_stem) || (!wanted_stem.is_empty() && wanted_stem.contains(&stem)) {
                    return true;
                }
                wanted_stem.chars().count() <= 10 && levenshtein(&stem, &wanted_stem) <= 2
            })
            .collect();
        if fuzzy_matches.len() == 1 {
            return found(candidate, project_root, fuzzy_matches[0], Confidence::Low, true);
        }
    }

    RecoveredPath { original: candidate.to_string(), resolved: None, confidence: Confidence::Low, recovered: false }
}

/// Recovering the same path twice against an unchanged file set yields the
/// same result (§8 idempotence property); a direct consequence of
/// `recover_path` being a pure function of its inputs.
pub fn recover_all(candidates: &[String], project_root: &Path, known_files: &[PathBuf]) -> Vec<RecoveredPath> {
    candidates.iter().map(|c| recover_path(c, project_root, known_files)).collect()
}

/// A recorded path correction: the original mention, what it was resolved
/// to, and how confident the recovery was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction {
    pub original: String,
    pub corrected: String,
    pub confidence: Confidence,
}

/// Aggregate counters for one semantic-validation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SemanticStats {
    pub tasks: usize,
    pub paths_checked: usize,
    pub paths_missing: usize,
    pub paths_recovered: usize,
    pub commands_validated: usize,
    pub commands_invalid: usize,
}

/// The full result of validating a plan's file/command references against
/// the real project tree.
#[derive(Debug, Clone, Default)]
pub struct SemanticReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub corrections: Vec<Correction>,
    pub stats: SemanticStats,
}

fn task_text_blob(task: &TaskSchema) -> String {
    let mut blob = task.description.clone();
    for criterion in &task.acceptance_criteria {
        blob.push('\n');
        blob.push_str(criterion);
    }
    for step in &task.validation_steps {
        blob.push('\n');
        blob.push_str(step);
    }
    blob
}

/// Validate every task's referenced file paths and validation-step commands
/// in `plan` against `project_root`. `known_files` is every file already
/// present under `project_root` (relative paths), gathered once by the
/// caller. Unresolvable paths are errors unless `allow_missing_files` is
/// set, in which case they are downgraded to warnings.
pub async fn validate_plan_semantics(
    plan: &PlanResponse,
    project_root: &Path,
    known_files: &[PathBuf],
    validator: &dyn ShellValidator,
    allow_missing_files: bool,
) -> SemanticReport {
    let mut report = SemanticReport { stats: SemanticStats { tasks: plan.tasks.len(), ..Default::default() }, ..Default::default() };

    for task in &plan.tasks {
        let blob = task_text_blob(task);
        for mention in extract_mentions(&blob) {
            report.stats.paths_checked += 1;
            if is_creation_context(&blob, mention.start) {
                continue;
            }
            let recovered = recover_path(&mention.text, project_root, known_files);
            match (recovered.resolved, recovered.recovered) {
                (Some(_), false) => {}
                (Some(resolved), true) => {
                    report.stats.paths_missing += 1;
                    report.stats.paths_recovered += 1;
                    let corrected = resolved.to_string_lossy().to_string();
                    report.warnings.push(format!(
                        "path '{}' not found, recovered as '{corrected}' ({:?} confidence)",
                        mention.text, recovered.confidence
                    ));
                    report.corrections.push(Correction {
                        original: mention.text.clone(),
                        corrected,
                        confidence: recovered.confidence,
                    });
                }
                (None, _) => {
                    report.stats.paths_missing += 1;
                    let message = format!(
                        "referenced path '{}' does not exist and could not be recovered",
                        mention.text
                    );
                    if allow_missing_files {
                        report.warnings.push(message);
                    } else {
                        report.errors.push(message);
                    }
                }
            }
        }

        for step in &task.validation_steps {
            if step.trim().is_empty() {
                continue;
            }
            report.stats.commands_validated += 1;
            match validator.check_syntax(step).await {
                Ok(()) => {}
                Err(SemanticError::ShellUnavailable) => {
                    report.warnings.push(format!("shell unavailable to validate a step in task '{}'", task.title));
                }
                Err(e) => {
                    report.stats.commands_invalid += 1;
                    report.errors.push(e.to_string());
                }
            }
        }
    }

    report.valid = report.errors.is_empty();
    report
}
