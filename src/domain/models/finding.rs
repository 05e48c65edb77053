//! Finding and Relationship domain models.
//!
//! A Finding is a single discovered fact about a project, produced by an
//! analyzer agent and later persisted as a [`super::node::Node`]. Findings
//! are created by an agent, mutated only by the orchestrator (provenance
//! stamping) and the synthesizer (merge/dedup); once ingested they are owned
//! by the knowledge store.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The kind of fact a [`Finding`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    Decision,
    Feature,
    Pattern,
    Constraint,
    Note,
    Metadata,
    Documentation,
    Plan,
}

impl FindingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Decision => "decision",
            Self::Feature => "feature",
            Self::Pattern => "pattern",
            Self::Constraint => "constraint",
            Self::Note => "note",
            Self::Metadata => "metadata",
            Self::Documentation => "documentation",
            Self::Plan => "plan",
        }
    }
}

/// Confidence the producing agent has in a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// A single discovered fact about a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub why: Option<String>,
    #[serde(default)]
    pub tradeoffs: Option<String>,
    pub confidence: Confidence,
    /// Set by the producing agent; stamped by the orchestrator if absent.
    #[serde(default)]
    pub source_agent: String,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Finding {
    pub fn new(
        kind: FindingKind,
        title: impl Into<String>,
        description: impl Into<String>,
        confidence: Confidence,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            description: description.into(),
            why: None,
            tradeoffs: None,
            confidence,
            source_agent: String::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_why(mut self, why: impl Into<String>) -> Self {
        self.why = Some(why.into());
        self
    }

    pub fn with_tradeoffs(mut self, tradeoffs: impl Into<String>) -> Self {
        self.tradeoffs = Some(tradeoffs.into());
        self
    }

    pub fn with_source_agent(mut self, agent: impl Into<String>) -> Self {
        self.source_agent = agent.into();
        self
    }

    pub fn with_workspace(mut self, workspace: impl Into<String>) -> Self {
        self.metadata
            .insert("workspace".to_string(), serde_json::Value::String(workspace.into()));
        self
    }

    pub fn workspace(&self) -> &str {
        match self.metadata.get("workspace") {
            Some(serde_json::Value::String(s)) => s,
            _ => "root",
        }
    }

    /// Structural validation per §3: title non-empty after trim and ≤200
    /// chars, description ≥10 chars.
    pub fn validate(&self) -> Result<(), String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("finding title must not be empty".to_string());
        }
        if title.chars().count() > 200 {
            return Err("finding title must be at most 200 characters".to_string());
        }
        if self.description.chars().count() < 10 {
            return Err("finding description must be at least 10 characters".to_string());
        }
        Ok(())
    }

    /// Embedding text per §4.10: `title\ndescription[\nwhy][\ntradeoffs]`.
    pub fn embedding_text(&self) -> String {
        let mut text = format!("{}\n{}", self.title, self.description);
        if let Some(why) = &self.why {
            text.push('\n');
            text.push_str(why);
        }
        if let Some(tradeoffs) = &self.tradeoffs {
            text.push('\n');
            text.push_str(tradeoffs);
        }
        text
    }
}

/// A typed edge between two finding titles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub relationship_type: String,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Relationship {
    pub fn new(relationship_type: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            relationship_type: relationship_type.into(),
            from: from.into(),
            to: to.into(),
            description: None,
        }
    }

    /// Invariant: `from != to`.
    pub fn validate(&self) -> Result<(), String> {
        if self.from == self.to {
            return Err(format!(
                "relationship endpoints must differ, both were '{}'",
                self.from
            ));
        }
        Ok(())
    }

    /// Prefix both endpoints with `[<workspace>]` for multi-service runs.
    pub fn with_workspace_prefix(mut self, workspace: &str) -> Self {
        if workspace != "root" {
            self.from = format!("[{workspace}] {}", self.from);
            self.to = format!("[{workspace}] {}", self.to);
        }
        self
    }
}
