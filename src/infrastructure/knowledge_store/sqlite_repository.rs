//! SQLite implementation of [`KnowledgeRepository`]. Grounded on
//! `adapters/sqlite/{connection,memory_repository}.rs`: WAL-mode pool
//! creation with `create_if_missing`, and plain `sqlx::query`/`query_as`
//! CRUD (no compile-time `query!` macros, since the schema is created at
//! runtime rather than tracked by `sqlx::migrate!`).

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::error::IngestionError;
use crate::domain::models::{Confidence, Finding, FindingKind, Node, Relationship};
use crate::domain::ports::KnowledgeRepository;

/// Open (creating if missing) a WAL-mode SQLite pool at `database_url` and
/// run the knowledge-store schema. Also ensures a `.gitignore` sits beside
/// the database file naming its WAL/journal/index sidecars (§6), written
/// once on first open rather than regenerated every call.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, IngestionError> {
    ensure_memory_dir_gitignore(database_url);

    let connect_options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| IngestionError::RepositoryWriteFailed(format!("invalid database url: {e}")))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(connect_options)
        .await
        .map_err(|e| IngestionError::RepositoryWriteFailed(format!("failed to open pool: {e}")))?;

    run_schema(&pool).await?;
    Ok(pool)
}

fn ensure_memory_dir_gitignore(database_url: &str) {
    let Some(path) = database_url.strip_prefix("sqlite:").or_else(|| database_url.strip_prefix("sqlite://"))
    else {
        return;
    };
    if path == ":memory:" {
        return;
    }
    let Some(dir) = Path::new(path).parent() else { return };
    if dir.as_os_str().is_empty() {
        return;
    }
    let _ = std::fs::create_dir_all(dir);
    let gitignore = dir.join(".gitignore");
    if !gitignore.exists() {
        let stem = Path::new(path).file_name().and_then(|n| n.to_str()).unwrap_or("knowledge.db");
        let contents = format!("{stem}\n{stem}-wal\n{stem}-shm\n{stem}-journal\n");
        let _ = std::fs::write(gitignore, contents);
    }
}

async fn run_schema(pool: &SqlitePool) -> Result<(), IngestionError> {
    sqlx::query(
        r"CREATE TABLE IF NOT EXISTS nodes (
            id TEXT PRIMARY KEY,
            kind TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            why TEXT,
            tradeoffs TEXT,
            confidence TEXT NOT NULL,
            source_agent TEXT NOT NULL,
            metadata TEXT NOT NULL,
            embedding TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(schema_err)?;

    sqlx::query(
        r"CREATE TABLE IF NOT EXISTS edges (
            relationship_type TEXT NOT NULL,
            from_title TEXT NOT NULL,
            to_title TEXT NOT NULL,
            description TEXT
        )",
    )
    .execute(pool)
    .await
    .map_err(schema_err)?;

    sqlx::query(
        r"CREATE TABLE IF NOT EXISTS project_overview (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            content TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(schema_err)?;

    Ok(())
}

fn schema_err(e: sqlx::Error) -> IngestionError {
    IngestionError::RepositoryWriteFailed(format!("schema migration failed: {e}"))
}

/// SQLite-backed [`KnowledgeRepository`]. Semantic search is a cosine-scan
/// over embedded nodes loaded in-process (§6: "the repository is free to
/// maintain an ANN index" — this one does not, trading query-time cost for
/// simplicity at the scale a single project's knowledge base reaches).
pub struct SqliteKnowledgeRepository {
    pool: SqlitePool,
}

impl SqliteKnowledgeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_node(row: &sqlx::sqlite::SqliteRow) -> Result<Node, IngestionError> {
        let kind_str: String = row.try_get("kind").map_err(row_err)?;
        let confidence_str: String = row.try_get("confidence").map_err(row_err)?;
        let metadata_json: String = row.try_get("metadata").map_err(row_err)?;
        let embedding_json: Option<String> = row.try_get("embedding").map_err(row_err)?;
        let created_at: String = row.try_get("created_at").map_err(row_err)?;
        let updated_at: String = row.try_get("updated_at").map_err(row_err)?;

        let finding = Finding {
            kind: parse_kind(&kind_str)?,
            title: row.try_get("title").map_err(row_err)?,
            description: row.try_get("description").map_err(row_err)?,
            why: row.try_get("why").map_err(row_err)?,
            tradeoffs: row.try_get("tradeoffs").map_err(row_err)?,
            confidence: parse_confidence(&confidence_str)?,
            source_agent: row.try_get("source_agent").map_err(row_err)?,
            metadata: serde_json::from_str(&metadata_json)
                .map_err(|e| IngestionError::RepositoryWriteFailed(format!("bad metadata json: {e}")))?,
        };

        let embedding = embedding_json
            .map(|j| {
                serde_json::from_str::<Vec<f64>>(&j)
                    .map_err(|e| IngestionError::RepositoryWriteFailed(format!("bad embedding json: {e}")))
            })
            .transpose()?;

        Ok(Node {
            id: row.try_get("id").map_err(row_err)?,
            finding,
            embedding,
            created_at: parse_datetime(&created_at)?,
            updated_at: parse_datetime(&updated_at)?,
        })
    }
}

fn row_err(e: sqlx::Error) -> IngestionError {
    IngestionError::RepositoryWriteFailed(format!("row decode failed: {e}"))
}

fn parse_datetime(s: &str) -> Result<chrono::DateTime<chrono::Utc>, IngestionError> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| IngestionError::RepositoryWriteFailed(format!("bad timestamp: {e}")))
}

fn parse_kind(s: &str) -> Result<FindingKind, IngestionError> {
    match s {
        "decision" => Ok(FindingKind::Decision),
        "feature" => Ok(FindingKind::Feature),
        "pattern" => Ok(FindingKind::Pattern),
        "constraint" => Ok(FindingKind::Constraint),
        "note" => Ok(FindingKind::Note),
        "metadata" => Ok(FindingKind::Metadata),
        "documentation" => Ok(FindingKind::Documentation),
        "plan" => Ok(FindingKind::Plan),
        other => Err(IngestionError::RepositoryWriteFailed(format!("unknown finding kind '{other}'"))),
    }
}

fn parse_confidence(s: &str) -> Result<Confidence, IngestionError> {
    match s {
        "low" => Ok(Confidence::Low),
        "medium" => Ok(Confidence::Medium),
        "high" => Ok(Confidence::High),
        other => Err(IngestionError::RepositoryWriteFailed(format!("unknown confidence '{other}'"))),
    }
}

#[async_trait]
impl KnowledgeRepository for SqliteKnowledgeRepository {
    async fn create_node(&self, node: Node) -> Result<(), IngestionError> {
        let metadata_json = serde_json::to_string(&node.finding.metadata)
            .map_err(|e| IngestionError::RepositoryWriteFailed(format!("metadata serialize failed: {e}")))?;
        let embedding_json = node
            .embedding
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| IngestionError::RepositoryWriteFailed(format!("embedding serialize failed: {e}")))?;

        sqlx::query(
            r"INSERT INTO nodes
                (id, kind, title, description, why, tradeoffs, confidence, source_agent,
                 metadata, embedding, created_at, updated_at)
              VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&node.id)
        .bind(node.finding.kind.as_str())
        .bind(&node.finding.title)
        .bind(&node.finding.description)
        .bind(&node.finding.why)
        .bind(&node.finding.tradeoffs)
        .bind(confidence_str(node.finding.confidence))
        .bind(&node.finding.source_agent)
        .bind(metadata_json)
        .bind(embedding_json)
        .bind(node.created_at.to_rfc3339())
        .bind(node.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| IngestionError::RepositoryWriteFailed(format!("insert failed: {e}")))?;

        Ok(())
    }

    async fn delete_nodes_by_agent(&self, agent: &str) -> Result<(), IngestionError> {
        sqlx::query("DELETE FROM nodes WHERE source_agent = ?")
            .bind(agent)
            .execute(&self.pool)
            .await
            .map_err(|e| IngestionError::RepositoryWriteFailed(format!("delete failed: {e}")))?;
        Ok(())
    }

    async fn list_nodes(&self, kind: Option<FindingKind>) -> Result<Vec<Node>, IngestionError> {
        let rows = match kind {
            Some(k) => {
                sqlx::query("SELECT * FROM nodes WHERE kind = ? ORDER BY created_at")
                    .bind(k.as_str())
                    .fetch_all(&self.pool)
                    .await
            }
            None => sqlx::query("SELECT * FROM nodes ORDER BY created_at").fetch_all(&self.pool).await,
        }
        .map_err(|e| IngestionError::RepositoryWriteFailed(format!("select failed: {e}")))?;

        rows.iter().map(Self::row_to_node).collect()
    }

    async fn save_relationship(&self, relationship: Relationship) -> Result<(), IngestionError> {
        sqlx::query(
            "INSERT INTO edges (relationship_type, from_title, to_title, description) VALUES (?, ?, ?, ?)",
        )
        .bind(&relationship.relationship_type)
        .bind(&relationship.from)
        .bind(&relationship.to)
        .bind(&relationship.description)
        .execute(&self.pool)
        .await
        .map_err(|e| IngestionError::RepositoryWriteFailed(format!("insert edge failed: {e}")))?;
        Ok(())
    }

    async fn get_project_overview(&self) -> Result<Option<String>, IngestionError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT content FROM project_overview WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| IngestionError::RepositoryWriteFailed(format!("select overview failed: {e}")))?;
        Ok(row.map(|(content,)| content))
    }

    async fn save_project_overview(&self, overview: &str) -> Result<(), IngestionError> {
        sqlx::query(
            "INSERT INTO project_overview (id, content) VALUES (1, ?)
             ON CONFLICT(id) DO UPDATE SET content = excluded.content",
        )
        .bind(overview)
        .execute(&self.pool)
        .await
        .map_err(|e| IngestionError::RepositoryWriteFailed(format!("upsert overview failed: {e}")))?;
        Ok(())
    }

    async fn search(&self, embedding: &[f64], top_k: usize) -> Result<Vec<Node>, IngestionError> {
        let rows = sqlx::query("SELECT * FROM nodes WHERE embedding IS NOT NULL")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| IngestionError::RepositoryWriteFailed(format!("select for search failed: {e}")))?;

        let mut scored: Vec<(f64, Node)> = rows
            .iter()
            .map(Self::row_to_node)
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .filter_map(|node| node.cosine_similarity(embedding).map(|score| (score, node)))
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored.into_iter().map(|(_, node)| node).collect())
    }

    async fn close(&self) -> Result<(), IngestionError> {
        self.pool.close().await;
        Ok(())
    }
}

fn confidence_str(c: Confidence) -> &'static str {
    match c {
        Confidence::Low => "low",
        Confidence::Medium => "medium",
        Confidence::High => "high",
    }
}
