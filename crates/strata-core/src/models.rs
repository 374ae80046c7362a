//! Core data models for the strata memory engine.
//!
//! These types are shared across all strata crates and represent the four
//! persisted entities (documents, chunks, extracts, context injections) plus
//! the request/response shapes of the engine operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

// =============================================================================
// TIER & VISIBILITY
// =============================================================================

/// Storage/retention tier of a document.
///
/// Transitions are monotonic and one-directional: hot → warm → cold.
/// A document never regresses and never skips from hot directly to cold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryTier {
    /// Full content, freshest; every document starts here.
    #[default]
    Hot,
    /// Full content with a guaranteed summary on every chunk.
    Warm,
    /// Content elided; summaries only.
    Cold,
}

impl MemoryTier {
    /// Ordinal rank used to verify monotonic transitions.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Hot => 0,
            Self::Warm => 1,
            Self::Cold => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hot => "hot",
            Self::Warm => "warm",
            Self::Cold => "cold",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "hot" => Some(Self::Hot),
            "warm" => Some(Self::Warm),
            "cold" => Some(Self::Cold),
            _ => None,
        }
    }
}

impl std::fmt::Display for MemoryTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visibility layer controlling whose context assembly may see a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityLayer {
    /// Visible to the owning agent only.
    #[default]
    Private,
    /// Visible to any agent assembling context with shared results enabled.
    Shared,
}

impl VisibilityLayer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Shared => "shared",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "private" => Some(Self::Private),
            "shared" => Some(Self::Shared),
            _ => None,
        }
    }
}

impl std::fmt::Display for VisibilityLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// SOURCE KIND
// =============================================================================

/// What kind of artifact a document was ingested from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Free-form diary entry written by an agent.
    DiaryEntry,
    /// Intermediate reasoning the agent chose to persist.
    Thought,
    /// Record emitted when an agent finishes a task.
    TaskComplete,
    /// Movement between simulation rooms/areas.
    RoomTransition,
    /// Hand-off note between agents.
    Handoff,
    /// Observed anomaly or unexpected state.
    Anomaly,
    /// Distillation produced by an external compression process.
    CompressionExtract,
    /// Synthesis across multiple earlier documents.
    Synthesis,
    /// Manually ingested content.
    Manual,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DiaryEntry => "diary_entry",
            Self::Thought => "thought",
            Self::TaskComplete => "task_complete",
            Self::RoomTransition => "room_transition",
            Self::Handoff => "handoff",
            Self::Anomaly => "anomaly",
            Self::CompressionExtract => "compression_extract",
            Self::Synthesis => "synthesis",
            Self::Manual => "manual",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "diary_entry" => Some(Self::DiaryEntry),
            "thought" => Some(Self::Thought),
            "task_complete" => Some(Self::TaskComplete),
            "room_transition" => Some(Self::RoomTransition),
            "handoff" => Some(Self::Handoff),
            "anomaly" => Some(Self::Anomaly),
            "compression_extract" => Some(Self::CompressionExtract),
            "synthesis" => Some(Self::Synthesis),
            "manual" => Some(Self::Manual),
            _ => None,
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// DOCUMENT & CHUNK
// =============================================================================

/// One ingested artifact with lifecycle tier hot/warm/cold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryDocument {
    pub id: Uuid,
    /// Owning actor.
    pub agent_id: Uuid,
    pub source: SourceKind,
    /// Optional path/label identifying where the artifact came from.
    pub path: Option<String>,
    pub tier: MemoryTier,
    pub visibility: VisibilityLayer,
    /// Estimated token cost of the full original content.
    pub total_tokens: i64,
    /// SHA-256 of the original content (`sha256:` prefixed), for external
    /// dedup/verification jobs.
    pub content_hash: String,
    pub access_count: i64,
    pub last_accessed_at: Option<DateTime<Utc>>,
    pub created_at_utc: DateTime<Utc>,
}

/// One bounded-size, ordered slice of a document's content.
///
/// `position` values within a document form a contiguous 0..N-1 sequence.
/// For hot/warm documents `content` is the original text; after cold
/// compaction `content` equals the summary and `content_tokens` equals
/// `summary_tokens`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryChunk {
    pub id: Uuid,
    pub document_id: Uuid,
    /// Denormalized from the document for query locality.
    pub visibility: VisibilityLayer,
    pub position: i32,
    pub content: String,
    pub summary: Option<String>,
    pub tags: Vec<String>,
    pub keywords: Vec<String>,
    pub content_tokens: i64,
    pub summary_tokens: Option<i64>,
    pub created_at_utc: DateTime<Utc>,
}

// =============================================================================
// EXTRACT
// =============================================================================

/// Priority attached to a stored extract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractPriority {
    Low,
    #[default]
    Normal,
    High,
    Critical,
}

impl ExtractPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "normal" => Some(Self::Normal),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for ExtractPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured distillation produced by an external compression process,
/// stored for reuse. Immutable once stored.
///
/// `source_document_id` is a weak reference: the source document may later
/// be deleted without invalidating the extract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryExtract {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub source_document_id: Option<Uuid>,
    /// Free-form type tag, e.g. "lesson", "pattern".
    pub extract_type: String,
    pub content: JsonValue,
    pub summary: String,
    pub domains: Vec<String>,
    pub channels: Vec<String>,
    pub priority: ExtractPriority,
    pub reusability: f32,
    pub action_required: bool,
    pub created_at_utc: DateTime<Utc>,
}

// =============================================================================
// CONTEXT INJECTION
// =============================================================================

/// A standing instruction/fact actively applied to an agent's reasoning.
///
/// Superseding deactivates the prior entry but never deletes it; the
/// history stays queryable for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextInjection {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub context_type: String,
    pub content: String,
    pub active: bool,
    /// Weak back-reference to the injection this one replaced.
    pub supersedes: Option<Uuid>,
    /// Weak reference to the extract this injection was derived from.
    pub source_extract_id: Option<Uuid>,
    pub created_at_utc: DateTime<Utc>,
}

// =============================================================================
// SEARCH TYPES
// =============================================================================

/// Scope filter applied before term matching.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    pub agent_id: Option<Uuid>,
    pub visibility: Option<VisibilityLayer>,
    pub tier: Option<MemoryTier>,
    /// Widens an agent scope to also admit shared-layer chunks owned by
    /// other agents. Ignored when `agent_id` is `None`.
    pub include_shared: bool,
}

/// A candidate chunk returned by the store's term match, before scoring.
#[derive(Debug, Clone)]
pub struct ChunkCandidate {
    pub chunk_id: Uuid,
    pub document_id: Uuid,
    pub summary: String,
    pub tags: Vec<String>,
    pub keywords: Vec<String>,
    pub tier: MemoryTier,
    pub source: SourceKind,
    pub document_created_at: DateTime<Utc>,
}

/// A scored search result hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub document_id: Uuid,
    pub chunk_id: Uuid,
    pub summary: String,
    pub tags: Vec<String>,
    /// Count of distinct query terms found in the summary.
    pub score: u32,
    pub tier: MemoryTier,
    pub source: SourceKind,
}

// =============================================================================
// RETRIEVAL TYPES
// =============================================================================

/// A fully loaded document with its ordered chunk sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub document: MemoryDocument,
    /// Ordered by position.
    pub chunks: Vec<MemoryChunk>,
    /// Chunk contents joined with blank-line separators.
    pub full_content: String,
    /// Sum of the chunks' content token counts.
    pub token_count: i64,
}

// =============================================================================
// CONTEXT ASSEMBLY TYPES
// =============================================================================

/// Diagnostic label reflecting how far context-assembly escalation went.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextStrategy {
    /// Injections and summaries only; no hot-tier escalation attempted.
    #[default]
    SummariesOnly,
    /// Escalation was attempted for hot-tier hits.
    SummariesPlusHot,
    /// At least one full document was appended within budget.
    FullRetrieval,
}

impl std::fmt::Display for ContextStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SummariesOnly => write!(f, "summaries_only"),
            Self::SummariesPlusHot => write!(f, "summaries_plus_hot"),
            Self::FullRetrieval => write!(f, "full_retrieval"),
        }
    }
}

/// Result of the budgeted context-assembly protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssembledContext {
    pub context: String,
    /// Always ≤ the caller-supplied budget.
    pub tokens_used: usize,
    /// Number of summaries accepted from search results.
    pub docs_accessed: usize,
    pub strategy: ContextStrategy,
}

// =============================================================================
// COMPACTION & STATS TYPES
// =============================================================================

/// Outcome of a compaction run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CompressionReport {
    pub hot_to_warm: usize,
    pub warm_to_cold: usize,
    /// Sum of per-chunk (content tokens - summary tokens) reclaimed by the
    /// warm→cold pass.
    pub tokens_reclaimed: i64,
}

/// Document counts per tier.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TierCounts {
    pub hot: i64,
    pub warm: i64,
    pub cold: i64,
}

impl TierCounts {
    pub fn total(&self) -> i64 {
        self.hot + self.warm + self.cold
    }
}

/// Chunk count and token sums for stats aggregation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChunkTotals {
    pub chunks: i64,
    pub content_tokens: i64,
    pub summary_tokens: i64,
}

/// Read-only aggregation over the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryStats {
    pub total_docs: i64,
    pub by_tier: TierCounts,
    pub total_chunks: i64,
    pub total_extracts: i64,
    pub total_tokens_stored: i64,
    pub total_summary_tokens: i64,
    /// `total_summary_tokens / total_tokens_stored`, 0 when nothing stored.
    pub compression_ratio: f64,
    pub active_context_entries: i64,
}
