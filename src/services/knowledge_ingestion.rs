//! Knowledge ingestion (C12): turns findings into persisted [`Node`]s,
//! embedding each one best-effort and replacing any existing nodes from the
//! same set of source agents before writing the new set.

use std::collections::HashSet;

use crate::domain::models::{Finding, Node};
use crate::domain::ports::{Embedder, KnowledgeRepository};

/// Outcome of one ingestion pass, for the bootstrap report's aggregate
/// finding counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestionReport {
    pub ingested: usize,
    pub embedded: usize,
    pub failed: usize,
}

/// Embed and persist `findings`, first deleting every existing node whose
/// `source_agent` appears among them (agent-level replace). Both embedding
/// and repository-write failures are best-effort: a failed embed still
/// ingests the node without a vector, and a failed write is skipped and
/// logged rather than aborting the rest of the pass.
pub async fn ingest_findings(
    repo: &dyn KnowledgeRepository,
    embedder: &dyn Embedder,
    findings: Vec<Finding>,
) -> IngestionReport {
    let agents: HashSet<&str> =
        findings.iter().map(|f| f.source_agent.as_str()).filter(|a| !a.is_empty()).collect();
    for agent in &agents {
        if let Err(e) = repo.delete_nodes_by_agent(agent).await {
            tracing::warn!(agent = %agent, error = %e, "failed to clear existing nodes before ingest");
        }
    }

    let mut report = IngestionReport::default();
    for finding in findings {
        let text = finding.embedding_text();
        let embedding = match embedder.embed(&[text]).await {
            Ok(mut vectors) if !vectors.is_empty() => {
                report.embedded += 1;
                Some(vectors.remove(0))
            }
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "embedding call failed, ingesting node without a vector");
                None
            }
        };

        let node = match embedding {
            Some(vector) => Node::new(finding).with_embedding(vector),
            None => Node::new(finding),
        };

        match repo.create_node(node).await {
            Ok(()) => report.ingested += 1,
            Err(e) => {
                tracing::warn!(error = %e, "repository write failed, skipping finding");
                report.failed += 1;
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::IngestionError;
    use crate::domain::models::{Confidence, FindingKind, Relationship};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeRepo {
        created: Mutex<Vec<Node>>,
        deleted_agents: Mutex<Vec<String>>,
        fail_create_for: Mutex<Option<String>>,
    }

    #[async_trait]
    impl KnowledgeRepository for FakeRepo {
        async fn create_node(&self, node: Node) -> Result<(), IngestionError> {
            if self.fail_create_for.lock().unwrap().as_deref() == Some(node.finding.title.as_str()) {
                return Err(IngestionError::RepositoryWriteFailed("disk full".to_string()));
            }
            self.created.lock().unwrap().push(node);
            Ok(())
        }
        async fn delete_nodes_by_agent(&self, agent: &str) -> Result<(), IngestionError> {
            self.deleted_agents.lock().unwrap().push(agent.to_string());
            Ok(())
        }
        async fn list_nodes(&self, _kind: Option<FindingKind>) -> Result<Vec<Node>, IngestionError> {
            Ok(self.created.lock().unwrap().clone())
        }
        async fn save_relationship(&self, _relationship: Relationship) -> Result<(), IngestionError> {
            Ok(())
        }
        async fn get_project_overview(&self) -> Result<Option<String>, IngestionError> {
            Ok(None)
        }
        async fn save_project_overview(&self, _overview: &str) -> Result<(), IngestionError> {
            Ok(())
        }
        async fn search(&self, _embedding: &[f64], _top_k: usize) -> Result<Vec<Node>, IngestionError> {
            Ok(vec![])
        }
    }

    struct FakeEmbedder {
        fails: bool,
    }

    #[async_trait]
    impl Embedder for FakeEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f64>>, IngestionError> {
            if self.fails {
                return Err(IngestionError::EmbeddingFailed("unreachable".to_string()));
            }
            Ok(texts.iter().map(|_| vec![0.1, 0.2]).collect())
        }
        fn dimension(&self) -> usize {
            2
        }
    }

    fn finding(title: &str, agent: &str) -> Finding {
        Finding::new(FindingKind::Note, title, "a sufficiently long description", Confidence::Medium)
            .with_source_agent(agent)
    }

    #[tokio::test]
    async fn ingests_and_embeds_findings() {
        let repo = FakeRepo::default();
        let embedder = FakeEmbedder { fails: false };
        let report = ingest_findings(&repo, &embedder, vec![finding("A", "architect")]).await;
        assert_eq!(report, IngestionReport { ingested: 1, embedded: 1, failed: 0 });
        assert_eq!(repo.created.lock().unwrap().len(), 1);
        assert!(repo.created.lock().unwrap()[0].embedding.is_some());
    }

    #[tokio::test]
    async fn deletes_nodes_for_every_distinct_source_agent_first() {
        let repo = FakeRepo::default();
        let embedder = FakeEmbedder { fails: false };
        ingest_findings(&repo, &embedder, vec![finding("A", "architect"), finding("B", "security")]).await;
        let mut deleted = repo.deleted_agents.lock().unwrap().clone();
        deleted.sort();
        assert_eq!(deleted, vec!["architect".to_string(), "security".to_string()]);
    }

    #[tokio::test]
    async fn embedding_failure_still_ingests_without_a_vector() {
        let repo = FakeRepo::default();
        let embedder = FakeEmbedder { fails: true };
        let report = ingest_findings(&repo, &embedder, vec![finding("A", "architect")]).await;
        assert_eq!(report.ingested, 1);
        assert_eq!(report.embedded, 0);
        assert!(repo.created.lock().unwrap()[0].embedding.is_none());
    }

    #[tokio::test]
    async fn repository_write_failure_is_skipped_not_fatal() {
        let repo = FakeRepo::default();
        *repo.fail_create_for.lock().unwrap() = Some("A".to_string());
        let embedder = FakeEmbedder { fails: false };
        let report =
            ingest_findings(&repo, &embedder, vec![finding("A", "architect"), finding("B", "architect")]).await;
        assert_eq!(report.ingested, 1);
        assert_eq!(report.failed, 1);
    }
}
