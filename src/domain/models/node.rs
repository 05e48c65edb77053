//! Node domain model.
//!
//! A Node is a persisted [`Finding`], assigned an opaque id and, once
//! embedded, a dense vector used for similarity search. Embedding dimension
//! must stay constant across all nodes stored in a given repository.

use super::finding::Finding;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A finding as stored in the knowledge repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub finding: Finding,
    #[serde(default)]
    pub embedding: Option<Vec<f64>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Node {
    pub fn new(finding: Finding) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            finding,
            embedding: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_embedding(mut self, embedding: Vec<f64>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Cosine similarity against another embedding. Returns `None` if either
    /// side lacks an embedding or dimensions disagree.
    pub fn cosine_similarity(&self, other: &[f64]) -> Option<f64> {
        let mine = self.embedding.as_ref()?;
        if mine.len() != other.len() || mine.is_empty() {
            return None;
        }
        let dot: f64 = mine.iter().zip(other).map(|(a, b)| a * b).sum();
        let norm_a: f64 = mine.iter().map(|v| v * v).sum::<f64>().sqrt();
        let norm_b: f64 = other.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return None;
        }
        Some(dot / (norm_a * norm_b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::finding::{Confidence, FindingKind};

    fn sample_finding() -> Finding {
        Finding::new(FindingKind::Note, "title", "a sufficiently long description", Confidence::Low)
    }

    #[test]
    fn new_node_has_uuid_id_and_no_embedding() {
        let node = Node::new(sample_finding());
        assert!(Uuid::parse_str(&node.id).is_ok());
        assert!(node.embedding.is_none());
    }

    #[test]
    fn cosine_similarity_identical_vectors_is_one() {
        let node = Node::new(sample_finding()).with_embedding(vec![1.0, 0.0, 0.0]);
        let sim = node.cosine_similarity(&[1.0, 0.0, 0.0]).unwrap();
        assert!((sim - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cosine_similarity_orthogonal_vectors_is_zero() {
        let node = Node::new(sample_finding()).with_embedding(vec![1.0, 0.0]);
        let sim = node.cosine_similarity(&[0.0, 1.0]).unwrap();
        assert!(sim.abs() < 1e-9);
    }

    #[test]
    fn cosine_similarity_none_without_embedding() {
        let node = Node::new(sample_finding());
        assert!(node.cosine_similarity(&[1.0, 0.0]).is_none());
    }

    #[test]
    fn cosine_similarity_none_on_dimension_mismatch() {
        let node = Node::new(sample_finding()).with_embedding(vec![1.0, 0.0]);
        assert!(node.cosine_similarity(&[1.0, 0.0, 0.0]).is_none());
    }

    #[test]
    fn touch_advances_updated_at() {
        let mut node = Node::new(sample_finding());
        let created = node.created_at;
        node.updated_at = created - chrono::Duration::seconds(10);
        node.touch();
        assert!(node.updated_at > created - chrono::Duration::seconds(10));
    }
}
