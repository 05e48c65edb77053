//! Port traits: the external interfaces the engine consumes (§6). Concrete
//! adapters live under `infrastructure/`; services depend only on these
//! traits so they can be tested against in-process fakes.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::error::{GenerationError, IngestionError, OrchestratorError, SemanticError};
use super::models::{Finding, FindingKind, Node, Relationship};

/// A single turn in a chat-model conversation.
#[derive(Debug, Clone)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

/// Token accounting for a single chat-model call.
#[derive(Debug, Clone, Copy, Default)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// The result of a chat-model call.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub content: String,
    pub usage: Usage,
}

/// A chat-completion model, called at temperature 0 for deterministic
/// structured output (C6).
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn generate(&self, messages: &[Message]) -> Result<ChatResponse, GenerationError>;

    /// Release any held connections. A no-op for stateless adapters.
    async fn close(&self) -> Result<(), GenerationError> {
        Ok(())
    }
}

/// An embedding model producing fixed-dimension vectors for a batch of
/// texts.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f64>>, IngestionError>;

    /// The dimension every returned vector has; constant for a given
    /// adapter instance.
    fn dimension(&self) -> usize;
}

/// Storage for persisted findings ([`Node`]s) and their relationships.
#[async_trait]
pub trait KnowledgeRepository: Send + Sync {
    async fn create_node(&self, node: Node) -> Result<(), IngestionError>;

    /// Delete every node whose finding was produced by `agent`, used by the
    /// per-agent replace semantics of ingestion (C12).
    async fn delete_nodes_by_agent(&self, agent: &str) -> Result<(), IngestionError>;

    async fn list_nodes(&self, kind: Option<FindingKind>) -> Result<Vec<Node>, IngestionError>;

    async fn save_relationship(&self, relationship: Relationship) -> Result<(), IngestionError>;

    async fn get_project_overview(&self) -> Result<Option<String>, IngestionError>;

    async fn save_project_overview(&self, overview: &str) -> Result<(), IngestionError>;

    /// Cosine-similarity search over stored embeddings, highest similarity
    /// first.
    async fn search(&self, embedding: &[f64], top_k: usize) -> Result<Vec<Node>, IngestionError>;

    async fn close(&self) -> Result<(), IngestionError> {
        Ok(())
    }
}

/// Cooperative cancellation handle shared by every agent task in one
/// orchestrator run. Cloning shares the same underlying flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything an analyzer agent needs to examine a project. Owned rather
/// than borrowed so a context can be cloned into a spawned task by the
/// orchestrator (C7).
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    pub project_root: PathBuf,
    pub project_name: String,
    pub mode: String,
    pub verbosity: u8,
    /// Tags a multi-service run's sub-project; `"root"` for a single-project
    /// run. Findings and relationships get `[<workspace>]`-prefixed when
    /// this is not `"root"` (§4.5 post-processing).
    pub workspace: String,
    pub cancellation: CancellationToken,
}

impl AnalysisContext {
    pub fn new(project_root: PathBuf, project_name: impl Into<String>) -> Self {
        Self {
            project_root,
            project_name: project_name.into(),
            mode: "analyze".to_string(),
            verbosity: 0,
            workspace: "root".to_string(),
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_workspace(mut self, workspace: impl Into<String>) -> Self {
        self.workspace = workspace.into();
        self
    }
}

/// File-analysis coverage an agent reports alongside its findings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Coverage {
    pub files_analyzed: usize,
    pub files_skipped: usize,
}

/// What one agent run produced. `agent_name` and `duration` may be left at
/// their defaults by the agent itself; the orchestrator stamps both if so
/// (§4.5 post-processing: "default duration from measured wall time if
/// agent left it zero").
#[derive(Debug, Clone, Default)]
pub struct AgentOutput {
    pub agent_name: String,
    pub findings: Vec<Finding>,
    pub relationships: Vec<Relationship>,
    pub coverage: Coverage,
    pub usage: Usage,
    pub duration: Duration,
}

/// A single analyzer that inspects a project and emits findings. The
/// orchestrator (C7) fans out across a set of these.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Stable identifier stamped onto every finding this agent produces.
    fn name(&self) -> &str;

    /// Human-readable summary of what this agent looks for, surfaced in the
    /// bootstrap report.
    fn description(&self) -> &str {
        ""
    }

    async fn run(&self, ctx: &AnalysisContext) -> Result<AgentOutput, OrchestratorError>;
}

/// Dry-run syntax checking for shell commands embedded in a plan's
/// validation steps, without executing them (C5).
#[async_trait]
pub trait ShellValidator: Send + Sync {
    async fn check_syntax(&self, command: &str) -> Result<(), SemanticError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_constructors_set_expected_roles() {
        assert_eq!(Message::system("hi").role, "system");
        assert_eq!(Message::user("hi").role, "user");
    }

    #[test]
    fn usage_default_is_zero() {
        let usage = Usage::default();
        assert_eq!(usage.input_tokens, 0);
        assert_eq!(usage.output_tokens, 0);
    }
}
