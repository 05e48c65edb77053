//! SQLite-backed [`KnowledgeRepository`](crate::domain::ports::KnowledgeRepository)
//! adapter (§6).

mod sqlite_repository;

pub use sqlite_repository::{create_pool, SqliteKnowledgeRepository};
