//! Chunk repository implementation.
//!
//! The search candidate query matches against summaries and keyword arrays
//! only; chunk content is never read on the search path, which keeps search
//! cheap regardless of tier.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use strata_core::{
    ChunkCandidate, ChunkRepository, ChunkTotals, Error, MemoryChunk, MemoryTier, Result,
    SearchFilter, SourceKind, VisibilityLayer,
};

/// PostgreSQL implementation of ChunkRepository.
#[derive(Clone)]
pub struct PgChunkRepository {
    pool: Pool<Postgres>,
}

impl PgChunkRepository {
    /// Create a new PgChunkRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_chunk(row: sqlx::postgres::PgRow) -> Result<MemoryChunk> {
    let visibility: String = row.get("visibility");
    Ok(MemoryChunk {
        id: row.get("id"),
        document_id: row.get("document_id"),
        visibility: VisibilityLayer::parse(&visibility)
            .ok_or_else(|| Error::Internal(format!("unknown visibility: {visibility}")))?,
        position: row.get("position"),
        content: row.get("content"),
        summary: row.get("summary"),
        tags: row.get("tags"),
        keywords: row.get("keywords"),
        content_tokens: row.get("content_tokens"),
        summary_tokens: row.get("summary_tokens"),
        created_at_utc: row.get("created_at_utc"),
    })
}

#[async_trait]
impl ChunkRepository for PgChunkRepository {
    async fn insert(&self, chunk: &MemoryChunk) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO memory_chunk
                (id, document_id, visibility, position, content, summary,
                 tags, keywords, content_tokens, summary_tokens, created_at_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(chunk.id)
        .bind(chunk.document_id)
        .bind(chunk.visibility.as_str())
        .bind(chunk.position)
        .bind(&chunk.content)
        .bind(&chunk.summary)
        .bind(&chunk.tags)
        .bind(&chunk.keywords)
        .bind(chunk.content_tokens)
        .bind(chunk.summary_tokens)
        .bind(chunk.created_at_utc)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    async fn list_for_document(&self, document_id: Uuid) -> Result<Vec<MemoryChunk>> {
        let rows = sqlx::query(
            r#"
            SELECT id, document_id, visibility, position, content, summary,
                   tags, keywords, content_tokens, summary_tokens, created_at_utc
            FROM memory_chunk
            WHERE document_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter().map(map_chunk).collect()
    }

    async fn set_summary(&self, id: Uuid, summary: &str, summary_tokens: i64) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE memory_chunk
            SET summary = $2, summary_tokens = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(summary)
        .bind(summary_tokens)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    async fn replace_content(&self, id: Uuid, content: &str, content_tokens: i64) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE memory_chunk
            SET content = $2, content_tokens = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(content)
        .bind(content_tokens)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    async fn search_candidates(
        &self,
        filter: &SearchFilter,
        terms: &[String],
        limit: i64,
    ) -> Result<Vec<ChunkCandidate>> {
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        // Lowercase keyword arrays allow exact overlap matching; summaries
        // need pattern matching.
        let patterns: Vec<String> = terms
            .iter()
            .map(|t| format!("%{}%", escape_like(t)))
            .collect();
        let lowered: Vec<String> = terms.iter().map(|t| t.to_lowercase()).collect();

        let mut query = String::from(
            "SELECT c.id AS chunk_id, c.document_id, c.summary, c.tags, c.keywords, \
                    d.tier, d.source, d.created_at_utc AS document_created_at \
             FROM memory_chunk c \
             JOIN memory_document d ON d.id = c.document_id \
             WHERE c.summary IS NOT NULL \
               AND (c.summary ILIKE ANY($1) OR c.keywords && $2) ",
        );
        let mut param_idx = 3;

        if filter.agent_id.is_some() {
            if filter.include_shared {
                query.push_str(&format!(
                    "AND (d.agent_id = ${param_idx} OR c.visibility = 'shared') "
                ));
            } else {
                query.push_str(&format!("AND d.agent_id = ${param_idx} "));
            }
            param_idx += 1;
        }
        if filter.visibility.is_some() {
            query.push_str(&format!("AND c.visibility = ${param_idx} "));
            param_idx += 1;
        }
        if filter.tier.is_some() {
            query.push_str(&format!("AND d.tier = ${param_idx} "));
            param_idx += 1;
        }
        query.push_str(&format!(
            "ORDER BY d.created_at_utc DESC LIMIT ${param_idx}"
        ));

        let mut q = sqlx::query(&query).bind(&patterns).bind(&lowered);
        if let Some(agent_id) = filter.agent_id {
            q = q.bind(agent_id);
        }
        if let Some(visibility) = filter.visibility {
            q = q.bind(visibility.as_str());
        }
        if let Some(tier) = filter.tier {
            q = q.bind(tier.as_str());
        }
        q = q.bind(limit);

        let rows = q.fetch_all(&self.pool).await.map_err(Error::Database)?;

        rows.into_iter()
            .map(|row| {
                let tier: String = row.get("tier");
                let source: String = row.get("source");
                Ok(ChunkCandidate {
                    chunk_id: row.get("chunk_id"),
                    document_id: row.get("document_id"),
                    summary: row.get::<Option<String>, _>("summary").unwrap_or_default(),
                    tags: row.get("tags"),
                    keywords: row.get("keywords"),
                    tier: MemoryTier::parse(&tier)
                        .ok_or_else(|| Error::Internal(format!("unknown tier: {tier}")))?,
                    source: SourceKind::parse(&source).ok_or_else(|| {
                        Error::Internal(format!("unknown source kind: {source}"))
                    })?,
                    document_created_at: row.get("document_created_at"),
                })
            })
            .collect()
    }

    async fn totals(&self, agent_id: Option<Uuid>) -> Result<ChunkTotals> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS chunks,
                   COALESCE(SUM(c.content_tokens), 0) AS content_tokens,
                   COALESCE(SUM(c.summary_tokens), 0) AS summary_tokens
            FROM memory_chunk c
            JOIN memory_document d ON d.id = c.document_id
            WHERE ($1::uuid IS NULL OR d.agent_id = $1)
            "#,
        )
        .bind(agent_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(ChunkTotals {
            chunks: row.get("chunks"),
            content_tokens: row.get("content_tokens"),
            summary_tokens: row.get("summary_tokens"),
        })
    }
}

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
