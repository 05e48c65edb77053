//! Schema validator (C4): declarative structural validation via JSON Schema
//! plus the domain model's own business-rule validation, accumulated into a
//! single non-short-circuiting report.

use jsonschema::JSONSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::error::ValidationError;
use crate::domain::models::{ClarificationResponse, PlanResponse};

fn plan_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "required": ["goal_summary", "rationale", "estimated_complexity", "tasks"],
        "properties": {
            "goal_summary": { "type": "string" },
            "rationale": { "type": "string" },
            "estimated_complexity": { "enum": ["low", "medium", "high"] },
            "tasks": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["title", "description", "priority", "complexity", "assigned_agent", "acceptance_criteria"],
                    "properties": {
                        "title": { "type": "string" },
                        "description": { "type": "string" },
                        "priority": { "type": "integer", "minimum": 0, "maximum": 100 },
                        "complexity": { "enum": ["low", "medium", "high"] },
                        "assigned_agent": { "enum": ["coder", "qa", "architect", "researcher"] },
                        "acceptance_criteria": { "type": "array", "items": { "type": "string" } }
                    }
                }
            }
        }
    })
}

fn clarification_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "required": ["is_ready_to_plan", "goal_summary"],
        "properties": {
            "is_ready_to_plan": { "type": "boolean" },
            "goal_summary": { "type": "string" },
            "enriched_goal": { "type": "string" },
            "questions": { "type": "array", "items": { "type": "string" } }
        }
    })
}

fn structural_issues(schema: &Value, instance: &Value) -> ValidationError {
    let mut report = ValidationError::default();
    match JSONSchema::compile(schema) {
        Ok(compiled) => {
            if let Err(errors) = compiled.validate(instance) {
                for error in errors {
                    report.push(error.instance_path.to_string(), error.to_string());
                }
            }
        }
        Err(e) => report.push("<schema>", e.to_string()),
    }
    report
}

fn decode<T: DeserializeOwned>(instance: &Value, report: &mut ValidationError) -> Option<T> {
    match serde_json::from_value(instance.clone()) {
        Ok(value) => Some(value),
        Err(e) => {
            report.push("<root>", format!("could not decode into target shape: {e}"));
            None
        }
    }
}

/// Validate a candidate plan response: structural schema first, then the
/// domain model's own invariants. Never short-circuits on the first issue.
pub fn validate_plan(instance: &Value) -> Result<PlanResponse, ValidationError> {
    let mut report = structural_issues(&plan_schema(), instance);
    let Some(plan): Option<PlanResponse> = decode(instance, &mut report) else {
        return Err(report);
    };
    for message in plan.validate() {
        report.push("<business-rule>", message);
    }
    if report.is_empty() {
        Ok(plan)
    } else {
        Err(report)
    }
}

/// Validate a candidate clarification response the same way.
pub fn validate_clarification(instance: &Value) -> Result<ClarificationResponse, ValidationError> {
    let mut report = structural_issues(&clarification_schema(), instance);
    let Some(clarification): Option<ClarificationResponse> = decode(instance, &mut report) else {
        return Err(report);
    };
    for message in clarification.validate() {
        report.push("<business-rule>", message);
    }
    if report.is_empty() {
        Ok(clarification)
    } else {
        Err(report)
    }
}
