//! Umbrella error type wrapping every component error into one enum for
//! callers that want a single `Result` type across the whole engine.

use thiserror::Error;

use super::error::{
    BootstrapError, ExtractionError, GenerationError, IngestionError, IntegrationError,
    OrchestratorError, RepairPlanError, SemanticError, SynthesisError, ValidationError,
};

/// Any failure the TaskWing engine can surface, tagged by originating
/// component.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskWingError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Semantic(#[from] SemanticError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error(transparent)]
    Integration(#[from] IntegrationError),

    #[error(transparent)]
    RepairPlan(#[from] RepairPlanError),

    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    #[error(transparent)]
    Ingestion(#[from] IngestionError),
}

pub type TaskWingResult<T> = Result<T, TaskWingError>;
