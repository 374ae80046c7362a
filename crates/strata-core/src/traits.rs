//! Repository traits for the strata storage boundary.
//!
//! The engine is written against these interfaces; `strata-db` provides the
//! PostgreSQL implementations and an in-memory store for hermetic tests.
//! Implementations must provide stable ordering by creation time and, for
//! chunks, by `position`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

/// Repository for document headers.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Insert a new document header.
    async fn insert(&self, doc: &MemoryDocument) -> Result<()>;

    /// Fetch a document by id. `Ok(None)` when absent.
    async fn get(&self, id: Uuid) -> Result<Option<MemoryDocument>>;

    /// Record an access: increment the access count and stamp
    /// `last_accessed_at`. The only read-path mutation in the engine.
    async fn touch_access(&self, id: Uuid) -> Result<()>;

    /// Compare-and-set the tier: move `id` from `from` to `to` only if the
    /// stored tier is still `from`. Returns whether the update applied.
    ///
    /// This guard is what makes concurrent compaction idempotent instead of
    /// double-counting reclaimed tokens.
    async fn set_tier_if(&self, id: Uuid, from: MemoryTier, to: MemoryTier) -> Result<bool>;

    /// List documents in `tier` created before `cutoff`, oldest first.
    async fn list_tier_older_than(
        &self,
        tier: MemoryTier,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<MemoryDocument>>;

    /// Count documents per tier, optionally scoped to one agent.
    async fn count_by_tier(&self, agent_id: Option<Uuid>) -> Result<TierCounts>;
}

/// Repository for document chunks.
#[async_trait]
pub trait ChunkRepository: Send + Sync {
    /// Insert a chunk. Chunks are only created in a batch at index time.
    async fn insert(&self, chunk: &MemoryChunk) -> Result<()>;

    /// All chunks of a document ordered by position.
    async fn list_for_document(&self, document_id: Uuid) -> Result<Vec<MemoryChunk>>;

    /// Backfill a chunk's summary (hot→warm pass).
    async fn set_summary(&self, id: Uuid, summary: &str, summary_tokens: i64) -> Result<()>;

    /// Overwrite a chunk's content and token count (warm→cold pass).
    /// Irreversible: the original content is gone after this.
    async fn replace_content(&self, id: Uuid, content: &str, content_tokens: i64) -> Result<()>;

    /// Chunks matching ANY of `terms` (case-insensitive) in their summary or
    /// keyword set, within `filter`'s scope, capped at `limit` candidates.
    /// Scoring happens in the engine; this is the cheap recall pass and must
    /// read only summaries/keywords, never content.
    async fn search_candidates(
        &self,
        filter: &SearchFilter,
        terms: &[String],
        limit: i64,
    ) -> Result<Vec<ChunkCandidate>>;

    /// Chunk count and token sums, optionally scoped to one agent.
    async fn totals(&self, agent_id: Option<Uuid>) -> Result<ChunkTotals>;
}

/// Repository for stored extracts.
#[async_trait]
pub trait ExtractRepository: Send + Sync {
    /// Insert an extract. Extracts are immutable once stored.
    async fn insert(&self, extract: &MemoryExtract) -> Result<()>;

    /// An agent's extracts, newest first.
    async fn list_for_agent(&self, agent_id: Uuid, limit: i64) -> Result<Vec<MemoryExtract>>;

    /// Count extracts, optionally scoped to one agent.
    async fn count(&self, agent_id: Option<Uuid>) -> Result<i64>;
}

/// Repository for context injections.
#[async_trait]
pub trait InjectionRepository: Send + Sync {
    /// Insert a new injection.
    async fn insert(&self, injection: &ContextInjection) -> Result<()>;

    /// Mark an injection inactive. Returns false when the id is unknown;
    /// superseding a vanished record is not an error.
    async fn deactivate(&self, id: Uuid) -> Result<bool>;

    /// All active injections for an agent, most recent first.
    async fn list_active(&self, agent_id: Uuid) -> Result<Vec<ContextInjection>>;

    /// Count active injections, optionally scoped to one agent.
    async fn count_active(&self, agent_id: Option<Uuid>) -> Result<i64>;
}
