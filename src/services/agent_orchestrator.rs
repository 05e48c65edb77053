//! Agent orchestrator (C7): fans out a set of analyzer agents in parallel,
//! accumulates their findings and relationships under a mutex, and tolerates
//! individual agent failures as long as at least one agent succeeds.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::task::JoinSet;

use crate::domain::error::OrchestratorError;
use crate::domain::models::{Finding, Relationship};
use crate::domain::ports::{Agent, AgentOutput, AnalysisContext};

/// Aggregate result of one orchestrator run: every successful agent's
/// findings and relationships (already post-processed per §4.5), plus the
/// raw per-agent output for the bootstrap report's coverage/usage/duration
/// accounting.
#[derive(Debug, Clone, Default)]
pub struct OrchestratorRun {
    pub findings: Vec<Finding>,
    pub relationships: Vec<Relationship>,
    pub outputs: Vec<AgentOutput>,
}

fn post_process(mut output: AgentOutput, name: &str, workspace: &str, elapsed: Duration) -> AgentOutput {
    if output.agent_name.is_empty() {
        output.agent_name = name.to_string();
    }
    if output.duration.is_zero() {
        output.duration = elapsed;
    }
    for finding in &mut output.findings {
        if finding.source_agent.is_empty() {
            finding.source_agent = output.agent_name.clone();
        }
        if workspace != "root" {
            finding.title = format!("[{workspace}] {}", finding.title);
            finding
                .metadata
                .insert("workspace".to_string(), serde_json::Value::String(workspace.to_string()));
        }
    }
    output.relationships =
        std::mem::take(&mut output.relationships).into_iter().map(|r| r.with_workspace_prefix(workspace)).collect();
    output
}

/// Run every agent concurrently against `ctx`.
///
/// Checks `ctx.cancellation` before launching anything and returns
/// immediately (with an empty run) if already cancelled. Each spawned task
/// re-checks cancellation once more before invoking its agent. Returns
/// `Err(AllAgentsFailed)` only if every agent fails; otherwise returns every
/// success, silently dropping failures into a warning log (the caller can
/// still see which agents failed via a shorter `outputs` list than
/// `agents`).
pub async fn run_agents(agents: &[Arc<dyn Agent>], ctx: &AnalysisContext) -> Result<OrchestratorRun, OrchestratorError> {
    if ctx.cancellation.is_cancelled() {
        return Ok(OrchestratorRun::default());
    }

    let outputs = Arc::new(Mutex::new(Vec::new()));
    let mut failures: Vec<String> = Vec::new();
    let mut joins = JoinSet::new();

    for agent in agents {
        let agent = Arc::clone(agent);
        let ctx = ctx.clone();
        let outputs = Arc::clone(&outputs);
        joins.spawn(async move {
            if ctx.cancellation.is_cancelled() {
                return Err((agent.name().to_string(), "cancelled".to_string()));
            }
            let name = agent.name().to_string();
            let started = Instant::now();
            match agent.run(&ctx).await {
                Ok(output) => {
                    let output = post_process(output, &name, &ctx.workspace, started.elapsed());
                    outputs.lock().await.push(output);
                    Ok(())
                }
                Err(e) => Err((name, e.to_string())),
            }
        });
    }

    let agent_count = agents.len();
    while let Some(joined) = joins.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err((name, message))) => {
                tracing::warn!(agent = %name, error = %message, "agent failed during orchestration");
                failures.push(format!("{name}: {message}"));
            }
            Err(join_err) => failures.push(format!("<task panicked>: {join_err}")),
        }
    }

    if failures.len() == agent_count && agent_count > 0 {
        return Err(OrchestratorError::AllAgentsFailed { count: agent_count, details: failures.join("; ") });
    }

    let outputs = outputs.lock().await.clone();
    let mut run = OrchestratorRun::default();
    for output in outputs {
        run.findings.extend(output.findings.clone());
        run.relationships.extend(output.relationships.clone());
        run.outputs.push(output);
    }
    Ok(run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::PathBuf;

    use crate::domain::models::finding::{Confidence, FindingKind};
    use crate::domain::ports::CancellationToken;

    struct OkAgent(&'static str);

    #[async_trait]
    impl Agent for OkAgent {
        fn name(&self) -> &str {
            self.0
        }

        async fn run(&self, _ctx: &AnalysisContext) -> Result<AgentOutput, OrchestratorError> {
            Ok(AgentOutput {
                findings: vec![Finding::new(FindingKind::Note, "t", "a sufficiently long description", Confidence::Low)],
                ..Default::default()
            })
        }
    }

    struct FailingAgent(&'static str);

    #[async_trait]
    impl Agent for FailingAgent {
        fn name(&self) -> &str {
            self.0
        }

        async fn run(&self, _ctx: &AnalysisContext) -> Result<AgentOutput, OrchestratorError> {
            Err(OrchestratorError::AgentFailed { agent: self.0.to_string(), message: "boom".to_string() })
        }
    }

    fn ctx() -> AnalysisContext {
        AnalysisContext::new(PathBuf::from("/tmp/project"), "demo")
    }

    #[tokio::test]
    async fn all_agents_succeed() {
        let agents: Vec<Arc<dyn Agent>> = vec![Arc::new(OkAgent("a")), Arc::new(OkAgent("b"))];
        let run = run_agents(&agents, &ctx()).await.unwrap();
        assert_eq!(run.findings.len(), 2);
        assert_eq!(run.outputs.len(), 2);
    }

    #[tokio::test]
    async fn findings_are_stamped_with_source_agent() {
        let agents: Vec<Arc<dyn Agent>> = vec![Arc::new(OkAgent("architect"))];
        let run = run_agents(&agents, &ctx()).await.unwrap();
        assert_eq!(run.findings[0].source_agent, "architect");
    }

    #[tokio::test]
    async fn partial_failure_still_returns_successful_findings() {
        let agents: Vec<Arc<dyn Agent>> = vec![Arc::new(OkAgent("a")), Arc::new(FailingAgent("b"))];
        let run = run_agents(&agents, &ctx()).await.unwrap();
        assert_eq!(run.findings.len(), 1);
    }

    #[tokio::test]
    async fn all_agents_failing_is_an_error() {
        let agents: Vec<Arc<dyn Agent>> = vec![Arc::new(FailingAgent("a")), Arc::new(FailingAgent("b"))];
        let result = run_agents(&agents, &ctx()).await;
        match result {
            Err(OrchestratorError::AllAgentsFailed { count, details }) => {
                assert_eq!(count, 2);
                assert!(details.contains("a: boom"));
                assert!(details.contains("b: boom"));
            }
            other => panic!("expected AllAgentsFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_agent_set_returns_empty_run() {
        let agents: Vec<Arc<dyn Agent>> = vec![];
        let run = run_agents(&agents, &ctx()).await.unwrap();
        assert!(run.findings.is_empty());
    }

    #[tokio::test]
    async fn already_cancelled_context_short_circuits() {
        let mut context = ctx();
        context.cancellation = CancellationToken::new();
        context.cancellation.cancel();
        let agents: Vec<Arc<dyn Agent>> = vec![Arc::new(OkAgent("a"))];
        let run = run_agents(&agents, &context).await.unwrap();
        assert!(run.outputs.is_empty());
    }

    #[tokio::test]
    async fn multi_service_run_prefixes_findings_and_relationships() {
        struct RelAgent;
        #[async_trait]
        impl Agent for RelAgent {
            fn name(&self) -> &str {
                "rel"
            }
            async fn run(&self, _ctx: &AnalysisContext) -> Result<AgentOutput, OrchestratorError> {
                Ok(AgentOutput {
                    findings: vec![Finding::new(FindingKind::Note, "t", "a sufficiently long description", Confidence::Low)],
                    relationships: vec![Relationship::new("depends_on", "A", "B")],
                    ..Default::default()
                })
            }
        }
        let agents: Vec<Arc<dyn Agent>> = vec![Arc::new(RelAgent)];
        let context = ctx().with_workspace("billing");
        let run = run_agents(&agents, &context).await.unwrap();
        assert_eq!(run.findings[0].title, "[billing] t");
        assert_eq!(run.relationships[0].from, "[billing] A");
    }
}
