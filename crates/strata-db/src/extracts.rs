//! Extract repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use strata_core::{Error, ExtractPriority, ExtractRepository, MemoryExtract, Result};

/// PostgreSQL implementation of ExtractRepository.
#[derive(Clone)]
pub struct PgExtractRepository {
    pool: Pool<Postgres>,
}

impl PgExtractRepository {
    /// Create a new PgExtractRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_row(row: sqlx::postgres::PgRow) -> Result<MemoryExtract> {
    let priority: String = row.get("priority");
    Ok(MemoryExtract {
        id: row.get("id"),
        agent_id: row.get("agent_id"),
        source_document_id: row.get("source_document_id"),
        extract_type: row.get("extract_type"),
        content: row.get("content"),
        summary: row.get("summary"),
        domains: row.get("domains"),
        channels: row.get("channels"),
        priority: ExtractPriority::parse(&priority)
            .ok_or_else(|| Error::Internal(format!("unknown priority: {priority}")))?,
        reusability: row.get("reusability"),
        action_required: row.get("action_required"),
        created_at_utc: row.get("created_at_utc"),
    })
}

#[async_trait]
impl ExtractRepository for PgExtractRepository {
    async fn insert(&self, extract: &MemoryExtract) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO memory_extract
                (id, agent_id, source_document_id, extract_type, content, summary,
                 domains, channels, priority, reusability, action_required, created_at_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(extract.id)
        .bind(extract.agent_id)
        .bind(extract.source_document_id)
        .bind(&extract.extract_type)
        .bind(&extract.content)
        .bind(&extract.summary)
        .bind(&extract.domains)
        .bind(&extract.channels)
        .bind(extract.priority.as_str())
        .bind(extract.reusability)
        .bind(extract.action_required)
        .bind(extract.created_at_utc)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    async fn list_for_agent(&self, agent_id: Uuid, limit: i64) -> Result<Vec<MemoryExtract>> {
        let rows = sqlx::query(
            r#"
            SELECT id, agent_id, source_document_id, extract_type, content, summary,
                   domains, channels, priority, reusability, action_required, created_at_utc
            FROM memory_extract
            WHERE agent_id = $1
            ORDER BY created_at_utc DESC
            LIMIT $2
            "#,
        )
        .bind(agent_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter().map(map_row).collect()
    }

    async fn count(&self, agent_id: Option<Uuid>) -> Result<i64> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS n
            FROM memory_extract
            WHERE ($1::uuid IS NULL OR agent_id = $1)
            "#,
        )
        .bind(agent_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(row.get("n"))
    }
}
