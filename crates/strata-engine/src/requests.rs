//! Request and outcome shapes for the engine operations.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use strata_core::{ExtractPriority, MemoryTier, SourceKind, VisibilityLayer};

/// Request to ingest one artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexRequest {
    pub agent_id: Uuid,
    pub source: SourceKind,
    pub content: String,
    /// Optional path/label identifying where the artifact came from.
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub visibility: VisibilityLayer,
    /// Override the configured chunk size in estimated tokens.
    #[serde(default)]
    pub chunk_size_tokens: Option<usize>,
}

impl IndexRequest {
    pub fn new(agent_id: Uuid, source: SourceKind, content: impl Into<String>) -> Self {
        Self {
            agent_id,
            source,
            content: content.into(),
            path: None,
            visibility: VisibilityLayer::Private,
            chunk_size_tokens: None,
        }
    }
}

/// Aggregate counts returned by `index`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IndexOutcome {
    pub document_id: Uuid,
    pub chunk_count: usize,
    /// Estimated token cost of the full original content.
    pub total_tokens: i64,
    /// Sum of the per-chunk summary token estimates.
    pub summary_tokens: i64,
}

/// Keyword search request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub agent_id: Option<Uuid>,
    #[serde(default)]
    pub visibility: Option<VisibilityLayer>,
    #[serde(default)]
    pub tier: Option<MemoryTier>,
    /// Result cap; the configured default applies when `None`.
    #[serde(default)]
    pub limit: Option<i64>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }
}

/// Budgeted context-assembly request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextRequest {
    pub agent_id: Uuid,
    pub query: String,
    /// Ceiling on the total estimated token cost of the assembled context.
    pub token_budget: usize,
    /// Also admit shared-layer results owned by other agents.
    pub include_shared: bool,
}

impl ContextRequest {
    /// Shared results are included by default.
    pub fn new(agent_id: Uuid, query: impl Into<String>, token_budget: usize) -> Self {
        Self {
            agent_id,
            query: query.into(),
            token_budget,
            include_shared: true,
        }
    }
}

/// Request to register a standing context injection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InjectContextRequest {
    pub agent_id: Uuid,
    pub context_type: String,
    pub content: String,
    /// Prior injection to deactivate before inserting this one.
    #[serde(default)]
    pub supersedes: Option<Uuid>,
    #[serde(default)]
    pub source_extract_id: Option<Uuid>,
}

/// Request to store an externally produced extract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreExtractRequest {
    pub agent_id: Uuid,
    #[serde(default)]
    pub source_document_id: Option<Uuid>,
    pub extract_type: String,
    pub content: JsonValue,
    pub summary: String,
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub priority: ExtractPriority,
    #[serde(default)]
    pub reusability: f32,
    #[serde(default)]
    pub action_required: bool,
}
