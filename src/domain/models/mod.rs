//! Domain models
//!
//! Pure domain entities for the knowledge-extraction and plan-generation
//! engine. These models are framework-agnostic and contain no infrastructure
//! concerns.

pub mod bootstrap;
pub mod clarification;
pub mod finding;
pub mod git_stats;
pub mod integration;
pub mod model_catalog;
pub mod node;
pub mod plan;
pub mod repair;
pub mod synthesis;

pub use bootstrap::{BootstrapAction, BootstrapPlan, Mode};
pub use clarification::ClarificationResponse;
pub use finding::{Confidence, Finding, FindingKind, Relationship};
pub use git_stats::{Contributor, GitStats};
pub use integration::{
    ComponentKind, ComponentStatus, IntegrationIssue, IntegrationReport, Ownership, Snapshot,
    StatusKind,
};
pub use model_catalog::{ModelRole, ModelSpec, Provider};
pub use node::Node;
pub use plan::{AssignedAgent, Complexity, PlanResponse, TaskSchema};
pub use repair::{RepairAction, RepairPrimitive};
pub use synthesis::{Conflict, SynthesisReport};
