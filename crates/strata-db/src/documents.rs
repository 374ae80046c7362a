//! Document repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use strata_core::{
    DocumentRepository, Error, MemoryDocument, MemoryTier, Result, SourceKind, TierCounts,
    VisibilityLayer,
};

/// PostgreSQL implementation of DocumentRepository.
#[derive(Clone)]
pub struct PgDocumentRepository {
    pool: Pool<Postgres>,
}

impl PgDocumentRepository {
    /// Create a new PgDocumentRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_row(row: sqlx::postgres::PgRow) -> Result<MemoryDocument> {
    let tier: String = row.get("tier");
    let visibility: String = row.get("visibility");
    let source: String = row.get("source");
    Ok(MemoryDocument {
        id: row.get("id"),
        agent_id: row.get("agent_id"),
        source: SourceKind::parse(&source)
            .ok_or_else(|| Error::Internal(format!("unknown source kind: {source}")))?,
        path: row.get("path"),
        tier: MemoryTier::parse(&tier)
            .ok_or_else(|| Error::Internal(format!("unknown tier: {tier}")))?,
        visibility: VisibilityLayer::parse(&visibility)
            .ok_or_else(|| Error::Internal(format!("unknown visibility: {visibility}")))?,
        total_tokens: row.get("total_tokens"),
        content_hash: row.get("content_hash"),
        access_count: row.get("access_count"),
        last_accessed_at: row.get("last_accessed_at"),
        created_at_utc: row.get("created_at_utc"),
    })
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    async fn insert(&self, doc: &MemoryDocument) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO memory_document
                (id, agent_id, source, path, tier, visibility, total_tokens,
                 content_hash, access_count, last_accessed_at, created_at_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(doc.id)
        .bind(doc.agent_id)
        .bind(doc.source.as_str())
        .bind(&doc.path)
        .bind(doc.tier.as_str())
        .bind(doc.visibility.as_str())
        .bind(doc.total_tokens)
        .bind(&doc.content_hash)
        .bind(doc.access_count)
        .bind(doc.last_accessed_at)
        .bind(doc.created_at_utc)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<MemoryDocument>> {
        let row = sqlx::query(
            r#"
            SELECT id, agent_id, source, path, tier, visibility, total_tokens,
                   content_hash, access_count, last_accessed_at, created_at_utc
            FROM memory_document
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(map_row).transpose()
    }

    async fn touch_access(&self, id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE memory_document
            SET access_count = access_count + 1, last_accessed_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    async fn set_tier_if(&self, id: Uuid, from: MemoryTier, to: MemoryTier) -> Result<bool> {
        // Conditional update: the WHERE tier guard makes concurrent
        // compaction idempotent.
        let result = sqlx::query(
            r#"
            UPDATE memory_document
            SET tier = $2
            WHERE id = $1 AND tier = $3
            "#,
        )
        .bind(id)
        .bind(to.as_str())
        .bind(from.as_str())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(result.rows_affected() == 1)
    }

    async fn list_tier_older_than(
        &self,
        tier: MemoryTier,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<MemoryDocument>> {
        let rows = sqlx::query(
            r#"
            SELECT id, agent_id, source, path, tier, visibility, total_tokens,
                   content_hash, access_count, last_accessed_at, created_at_utc
            FROM memory_document
            WHERE tier = $1 AND created_at_utc < $2
            ORDER BY created_at_utc ASC
            "#,
        )
        .bind(tier.as_str())
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter().map(map_row).collect()
    }

    async fn count_by_tier(&self, agent_id: Option<Uuid>) -> Result<TierCounts> {
        let rows = sqlx::query(
            r#"
            SELECT tier, COUNT(*) AS n
            FROM memory_document
            WHERE ($1::uuid IS NULL OR agent_id = $1)
            GROUP BY tier
            "#,
        )
        .bind(agent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let mut counts = TierCounts::default();
        for row in rows {
            let tier: String = row.get("tier");
            let n: i64 = row.get("n");
            match MemoryTier::parse(&tier) {
                Some(MemoryTier::Hot) => counts.hot = n,
                Some(MemoryTier::Warm) => counts.warm = n,
                Some(MemoryTier::Cold) => counts.cold = n,
                None => return Err(Error::Internal(format!("unknown tier: {tier}"))),
            }
        }
        Ok(counts)
    }
}
