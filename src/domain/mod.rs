//! Domain layer for the TaskWing knowledge-extraction and plan-generation
//! engine.
//!
//! This module contains the pure data model (§3), the port traits consumed
//! interfaces are built against (§6), and the per-component error taxonomy
//! (§7). Nothing here performs I/O.

pub mod error;
pub mod errors;
pub mod models;
pub mod ports;

pub use error::{
    BootstrapError, ExtractionError, GenerationError, IngestionError, IntegrationError,
    OrchestratorError, RepairPlanError, SemanticError, SynthesisError, ValidationError,
    ValidationIssue,
};
pub use errors::{TaskWingError, TaskWingResult};
