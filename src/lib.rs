//! TaskWing core - project-knowledge extraction and plan-generation engine.
//!
//! Three layers, hexagonal:
//! - [`domain`] - data model, port traits, error taxonomy. No I/O.
//! - [`services`] - the fourteen components (C1-C14), each built against
//!   `domain` ports only.
//! - [`infrastructure`] - concrete adapters: HTTP chat-model/embedder
//!   clients, a SQLite-backed knowledge repository, configuration loading,
//!   logging initialization, and subprocess wrappers for git/shell.

pub mod domain;
pub mod infrastructure;
pub mod services;

pub use domain::{TaskWingError, TaskWingResult};
pub use infrastructure::config::TaskWingConfig;
