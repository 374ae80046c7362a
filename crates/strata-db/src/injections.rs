//! Context injection repository implementation.
//!
//! Superseded injections are deactivated, never deleted; the history stays
//! queryable for audit.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use strata_core::{ContextInjection, Error, InjectionRepository, Result};

/// PostgreSQL implementation of InjectionRepository.
#[derive(Clone)]
pub struct PgInjectionRepository {
    pool: Pool<Postgres>,
}

impl PgInjectionRepository {
    /// Create a new PgInjectionRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_row(row: sqlx::postgres::PgRow) -> ContextInjection {
    ContextInjection {
        id: row.get("id"),
        agent_id: row.get("agent_id"),
        context_type: row.get("context_type"),
        content: row.get("content"),
        active: row.get("active"),
        supersedes: row.get("supersedes"),
        source_extract_id: row.get("source_extract_id"),
        created_at_utc: row.get("created_at_utc"),
    }
}

#[async_trait]
impl InjectionRepository for PgInjectionRepository {
    async fn insert(&self, injection: &ContextInjection) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO context_injection
                (id, agent_id, context_type, content, active, supersedes,
                 source_extract_id, created_at_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(injection.id)
        .bind(injection.agent_id)
        .bind(&injection.context_type)
        .bind(&injection.content)
        .bind(injection.active)
        .bind(injection.supersedes)
        .bind(injection.source_extract_id)
        .bind(injection.created_at_utc)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    async fn deactivate(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE context_injection
            SET active = false
            WHERE id = $1 AND active = true
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(result.rows_affected() == 1)
    }

    async fn list_active(&self, agent_id: Uuid) -> Result<Vec<ContextInjection>> {
        let rows = sqlx::query(
            r#"
            SELECT id, agent_id, context_type, content, active, supersedes,
                   source_extract_id, created_at_utc
            FROM context_injection
            WHERE agent_id = $1 AND active = true
            ORDER BY created_at_utc DESC
            "#,
        )
        .bind(agent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(map_row).collect())
    }

    async fn count_active(&self, agent_id: Option<Uuid>) -> Result<i64> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS n
            FROM context_injection
            WHERE active = true AND ($1::uuid IS NULL OR agent_id = $1)
            "#,
        )
        .bind(agent_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(row.get("n"))
    }
}
