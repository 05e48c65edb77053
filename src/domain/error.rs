//! Per-component error types for the TaskWing engine.
//!
//! Each enum scopes the failures one component (C1-C14) can produce, using
//! `thiserror` for structured `Display` messages. Components whose failures
//! are sometimes worth retrying (`GenerationError`, `OrchestratorError`)
//! carry an `is_transient` classification method.

use thiserror::Error;

/// Errors from the JSON repair pipeline (C3).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// No JSON object or array could be located in the input at all.
    #[error("no JSON payload found in response")]
    NoJsonFound,

    /// A repair pass ran but the result still failed to parse.
    #[error("response remained unparseable after repair: {0}")]
    UnrepairableJson(String),

    /// The input was truncated mid-value and could not be balanced.
    #[error("response appears truncated and could not be closed")]
    TruncatedBeyondRepair,
}

/// A single field-level problem found by the schema validator (C4).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

/// An accumulating report of every validation issue found; validation never
/// short-circuits on the first failure.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("{} validation issue(s)", issues.len())]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue::new(field, message));
    }
}

/// Errors from the semantic middleware's file-path extraction and recovery
/// (C5).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SemanticError {
    /// A referenced file path does not exist and no recovery candidate was
    /// found.
    #[error("referenced path '{0}' does not exist and could not be recovered")]
    UnresolvablePath(String),

    /// A shell validation step failed `bash -n` syntax checking.
    #[error("validation step has invalid shell syntax: {0}")]
    InvalidShellSyntax(String),

    /// No shell interpreter was available to dry-run a validation step.
    #[error("shell unavailable for dry-run validation")]
    ShellUnavailable,
}

/// Errors from the structured generator's retry loop (C6).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The chat model call itself failed.
    #[error("model call failed: {0}")]
    ModelCallFailed(String),

    /// Every retry attempt was exhausted without producing valid output.
    #[error("exhausted {attempts} attempt(s), last error: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    /// The repaired, schema-valid output still failed semantic validation.
    #[error("semantic validation failed: {0}")]
    SemanticRejection(String),
}

impl GenerationError {
    /// Whether the underlying failure is worth retrying with backoff. A
    /// model-call failure is transient only when its message names a
    /// recognized transient substring (timeout, rate limit, 5xx, connection
    /// reset); retry exhaustion and semantic rejection are not retried
    /// further by definition.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ModelCallFailed(msg) => {
                let lower = msg.to_lowercase();
                [
                    "rate limit",
                    "429",
                    "too many requests",
                    "quota exceeded",
                    "timeout",
                    "connection",
                    "temporary",
                ]
                .iter()
                .any(|needle| lower.contains(needle))
            }
            Self::RetriesExhausted { .. } | Self::SemanticRejection(_) => false,
        }
    }
}

/// Errors from the parallel agent orchestrator (C7).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    /// A single agent failed; tolerated unless every agent fails.
    #[error("agent '{agent}' failed: {message}")]
    AgentFailed { agent: String, message: String },

    /// Every agent in the fan-out failed.
    #[error("all {count} agent(s) failed: {details}")]
    AllAgentsFailed { count: usize, details: String },
}

impl OrchestratorError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::AgentFailed { .. })
    }
}

/// Errors from the synthesis pass (C8). Synthesizer failures are always
/// non-fatal to the caller; this type exists for logging/diagnostics only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SynthesisError {
    #[error("synthesis model call failed: {0}")]
    ModelCallFailed(String),

    #[error("synthesized output failed validation: {0}")]
    InvalidOutput(String),
}

/// Errors from the integration evaluator (C9).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntegrationError {
    #[error("failed to probe '{path}': {message}")]
    ProbeFailed { path: String, message: String },
}

/// Errors from the repair planner (C10). This component is pure and I/O
/// free, so failures indicate malformed input rather than environment
/// problems.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepairPlanError {
    #[error("cannot plan a repair for an empty issue set")]
    NoIssues,
}

/// Errors from the bootstrap planner (C11).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BootstrapError {
    /// Mutually exclusive flags were both set (e.g. `--skip-index` with
    /// `--force`).
    #[error("conflicting flags: {0}")]
    ConflictingFlags(String),

    /// The project exceeds the large-project guard threshold without an
    /// explicit override.
    #[error("project has {count} source files, exceeding the guard threshold of {threshold}")]
    ProjectTooLarge { count: usize, threshold: usize },
}

/// Errors from knowledge ingestion (C12).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestionError {
    #[error("embedding call failed: {0}")]
    EmbeddingFailed(String),

    #[error("repository write failed: {0}")]
    RepositoryWriteFailed(String),
}
