//! Exercises the repair -> schema-validate -> semantic-validate chain a raw
//! LLM plan response goes through before it reaches a caller, against a real
//! temporary project tree and a real `bash -n` shell validator.

use std::fs;

use taskwing_core::infrastructure::shell::BashDryRunValidator;
use taskwing_core::services::json_repair::extract;
use taskwing_core::services::schema_validator::validate_plan;
use taskwing_core::services::semantic_middleware::validate_plan_semantics;

const FENCED_PLAN: &str = r#"
Here is the plan:
```json
{
  "goal_summary": "Add a health check endpoint",
  "rationale": "Operators need a cheap way to confirm the service is alive",
  "estimated_complexity": "low",
  "tasks": [
    {
      "title": "Add /healthz handler",
      "description": "Wire a handler that returns 200 OK in src/handlers/health.rs",
      "priority": 10,
      "complexity": "low",
      "assigned_agent": "coder",
      "acceptance_criteria": ["GET /healthz returns 200"],
      "validation_steps": ["echo checking healthz"]
    }
  ]
}
```
"#;

fn known_files(root: &std::path::Path) -> Vec<std::path::PathBuf> {
    walk(root, root)
}

fn walk(root: &std::path::Path, dir: &std::path::Path) -> Vec<std::path::PathBuf> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir).unwrap().flatten() {
        let path = entry.path();
        if path.is_dir() {
            out.extend(walk(root, &path));
        } else {
            out.push(path.strip_prefix(root).unwrap().to_path_buf());
        }
    }
    out
}

#[tokio::test]
async fn fenced_llm_output_survives_the_full_pipeline() {
    let project = tempfile::tempdir().unwrap();
    fs::create_dir_all(project.path().join("src/handlers")).unwrap();
    fs::write(project.path().join("src/handlers/health.rs"), "// placeholder\n").unwrap();

    let value: serde_json::Value = extract(FENCED_PLAN).expect("repair should recover the fenced JSON");
    let plan = validate_plan(&value).expect("plan should satisfy schema and business rules");

    let validator = BashDryRunValidator;
    let files = known_files(project.path());
    let report =
        validate_plan_semantics(&plan, project.path(), &files, &validator, false).await;

    assert!(report.valid, "unexpected semantic errors: {:?}", report.errors);
    assert_eq!(report.stats.paths_missing, 0);
    assert_eq!(report.stats.commands_invalid, 0);
}

#[tokio::test]
async fn missing_referenced_file_is_reported_unless_allowed() {
    let project = tempfile::tempdir().unwrap();

    let value: serde_json::Value = extract(FENCED_PLAN).unwrap();
    let plan = validate_plan(&value).unwrap();
    let validator = BashDryRunValidator;

    let strict = validate_plan_semantics(&plan, project.path(), &[], &validator, false).await;
    assert!(!strict.valid);
    assert!(strict.stats.paths_missing > 0);

    let lenient = validate_plan_semantics(&plan, project.path(), &[], &validator, true).await;
    assert!(lenient.errors.is_empty());
    assert!(!lenient.warnings.is_empty());
}

#[test]
fn malformed_plan_fails_schema_validation() {
    let instance = serde_json::json!({
        "goal_summary": "",
        "rationale": "short",
        "estimated_complexity": "low",
        "tasks": []
    });
    let result = validate_plan(&instance);
    assert!(result.is_err());
}
