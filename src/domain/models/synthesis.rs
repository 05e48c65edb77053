//! Synthesis report domain model, produced by the synthesizer (C8).

use serde::{Deserialize, Serialize};

use super::finding::Finding;

/// A point where two or more findings disagree, and how it was resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conflict {
    pub topic: String,
    pub sources: Vec<String>,
    pub resolution: String,
}

/// The synthesizer's merged view over a set of raw findings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisReport {
    pub summary: String,
    /// Deduplicated findings, keeping the strongest confidence when two
    /// describe the same thing.
    pub key_decisions: Vec<Finding>,
    #[serde(default)]
    pub conflicts: Vec<Conflict>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl SynthesisReport {
    /// The degraded fallback report used when synthesis fails: raw findings
    /// verbatim, no summary or conflict analysis.
    pub fn fallback(raw_findings: Vec<Finding>) -> Self {
        Self {
            summary: "synthesis unavailable; showing raw findings".to_string(),
            key_decisions: raw_findings,
            conflicts: Vec::new(),
            recommendations: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.summary.trim().is_empty() {
            return Err("synthesis summary must not be empty".to_string());
        }
        for decision in &self.key_decisions {
            decision.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::finding::{Confidence, FindingKind};

    #[test]
    fn fallback_report_carries_raw_findings_and_no_summary_claims() {
        let findings = vec![Finding::new(FindingKind::Note, "t", "a sufficiently long description", Confidence::Low)];
        let report = SynthesisReport::fallback(findings.clone());
        assert_eq!(report.key_decisions.len(), findings.len());
        assert!(report.conflicts.is_empty());
    }

    #[test]
    fn validate_rejects_empty_summary() {
        let report = SynthesisReport { summary: String::new(), key_decisions: vec![], conflicts: vec![], recommendations: vec![] };
        assert!(report.validate().is_err());
    }
}
